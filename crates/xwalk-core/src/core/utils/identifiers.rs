use phf::{Set, phf_set};

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "H", "HN", "CA", "HA", "C", "O", "OXT", "H1", "H2", "H3",
    "HT1", "HT2", "HT3", "OT1", "OT2", "HA1", "HA2", "1HA", "2HA",
};

pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_heavy_atom(atom_name: &str) -> bool {
    let first_char = atom_name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase());
    !matches!(first_char, Some('H') | Some('D'))
}

/// One-letter code for the twenty standard amino acids.
pub fn one_letter_code(res_name: &str) -> Option<char> {
    let code = match res_name.trim().to_uppercase().as_str() {
        "ALA" => 'A',
        "ARG" => 'R',
        "ASN" => 'N',
        "ASP" => 'D',
        "CYS" => 'C',
        "GLN" => 'Q',
        "GLU" => 'E',
        "GLY" => 'G',
        "HIS" => 'H',
        "ILE" => 'I',
        "LEU" => 'L',
        "LYS" => 'K',
        "MET" => 'M',
        "PHE" => 'F',
        "PRO" => 'P',
        "SER" => 'S',
        "THR" => 'T',
        "TRP" => 'W',
        "TYR" => 'Y',
        "VAL" => 'V',
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_backbone_atom_recognizes_standard_backbone_atoms() {
        assert!(is_backbone_atom("N"));
        assert!(is_backbone_atom("CA"));
        assert!(is_backbone_atom("C"));
        assert!(is_backbone_atom("O"));
        assert!(is_backbone_atom(" CA "));
    }

    #[test]
    fn is_backbone_atom_rejects_sidechain_atoms() {
        assert!(!is_backbone_atom("CB"));
        assert!(!is_backbone_atom("NZ"));
        assert!(!is_backbone_atom("SG"));
    }

    #[test]
    fn is_heavy_atom_filters_hydrogen_and_deuterium() {
        assert!(is_heavy_atom("CA"));
        assert!(is_heavy_atom("NZ"));
        assert!(!is_heavy_atom("HA"));
        assert!(!is_heavy_atom("DG1"));
    }

    #[test]
    fn one_letter_code_maps_standard_residues() {
        assert_eq!(one_letter_code("LYS"), Some('K'));
        assert_eq!(one_letter_code("arg"), Some('R'));
        assert_eq!(one_letter_code(" GLY "), Some('G'));
        assert_eq!(one_letter_code("HOH"), None);
    }
}
