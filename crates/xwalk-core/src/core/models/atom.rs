use crate::core::utils::geometry::points_coincide;
use bitflags::bitflags;
use nalgebra::Point3;
use std::fmt;

/// Chemical elements found in experimental macromolecular structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    // --- Core Bio-organic ---
    H, // Hydrogen
    C, // Carbon
    N, // Nitrogen
    O, // Oxygen
    P, // Phosphorus
    S, // Sulfur

    // --- Halogens ---
    F,  // Fluorine
    Cl, // Chlorine
    Br, // Bromine
    I,  // Iodine

    // --- Common Metal Ions & Metalloids ---
    Na, // Sodium
    K,  // Potassium
    Mg, // Magnesium
    Ca, // Calcium
    Mn, // Manganese
    Fe, // Iron
    Co, // Cobalt
    Ni, // Nickel
    Cu, // Copper
    Zn, // Zinc

    // --- Other ---
    Se,      // Selenium
    Unknown, // Represents a failure to parse or an unrecognized element
}

impl Element {
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol.trim().to_uppercase().as_str() {
            "H" | "1H" | "D" | "2H" | "T" | "3H" => Self::H,
            "C" => Self::C,
            "N" => Self::N,
            "O" => Self::O,
            "P" => Self::P,
            "S" => Self::S,

            "F" => Self::F,
            "CL" => Self::Cl,
            "BR" => Self::Br,
            "I" => Self::I,

            "NA" => Self::Na,
            "K" => Self::K,
            "MG" => Self::Mg,
            "CA" => Self::Ca,
            "MN" => Self::Mn,
            "FE" => Self::Fe,
            "CO" => Self::Co,
            "NI" => Self::Ni,
            "CU" => Self::Cu,
            "ZN" => Self::Zn,

            "SE" => Self::Se,

            _ => Self::Unknown,
        }
    }

    /// Guesses the element from a PDB atom name when the element column is
    /// absent. The first non-digit character of the name is decisive for
    /// protein atoms.
    pub fn from_atom_name(name: &str) -> Self {
        let trimmed = name.trim().trim_start_matches(|c: char| c.is_ascii_digit());
        match trimmed.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('H') | Some('D') => Self::H,
            Some('C') => Self::C,
            Some('N') => Self::N,
            Some('O') => Self::O,
            Some('P') => Self::P,
            Some('S') => Self::S,
            _ => Self::Unknown,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::H => "H",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::P => "P",
            Self::S => "S",
            Self::F => "F",
            Self::Cl => "Cl",
            Self::Br => "Br",
            Self::I => "I",
            Self::Na => "Na",
            Self::K => "K",
            Self::Mg => "Mg",
            Self::Ca => "Ca",
            Self::Mn => "Mn",
            Self::Fe => "Fe",
            Self::Co => "Co",
            Self::Ni => "Ni",
            Self::Cu => "Cu",
            Self::Zn => "Zn",
            Self::Se => "Se",
            Self::Unknown => "X",
        }
    }

    pub fn is_metal(&self) -> bool {
        matches!(
            self,
            Self::Na
                | Self::K
                | Self::Mg
                | Self::Ca
                | Self::Mn
                | Self::Fe
                | Self::Co
                | Self::Ni
                | Self::Cu
                | Self::Zn
        )
    }
}

bitflags! {
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct AtomFlags: u8 {
        const AROMATIC = 0b0000_0001; // The atom belongs to an aromatic ring system
        const METALLIC = 0b0000_0010; // The atom is a metal ion
    }
}

/// A single atom record as read from a coordinate file.
///
/// Atoms are immutable once populated; only the van der Waals radius is
/// assigned afterwards, exactly once, from a selected parameter set.
#[derive(Debug, Clone)]
pub struct Atom {
    // --- Identity ---
    pub serial: usize,         // Atom serial number from source file
    pub name: String,          // Atom name (e.g., "CA", "NZ")
    pub alt_loc: char,         // Alternative location indicator (' ' if none)
    pub res_name: String,      // Residue name (e.g., "LYS")
    pub res_seq: isize,        // Residue sequence number from source file
    pub i_code: char,          // Insertion code (' ' if none)
    pub chain_id: char,        // Chain identifier (e.g., 'A')

    // --- Physicochemical Properties ---
    pub position: Point3<f64>, // 3D coordinates in Ångström
    pub element: Element,      // Chemical element of the atom
    pub vdw_radius: f64,       // van der Waals radius in Ångström
    pub charge: Option<f64>,   // Formal charge, when the source file carries one
    pub flags: AtomFlags,      // Aromatic/metallic markers
}

impl Atom {
    /// Human-readable site descriptor used in distance output:
    /// `resName-resSeq-chain-atomName`.
    pub fn descriptor(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.res_name, self.res_seq, self.chain_id, self.name
        )
    }

    /// Euclidean distance to another atom in Ångström.
    pub fn distance_to(&self, other: &Atom) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }
}

impl PartialEq for Atom {
    /// Two atoms are equal iff all identifying fields match and their
    /// coordinates agree within the coincidence tolerance.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.chain_id == other.chain_id
            && self.alt_loc == other.alt_loc
            && self.res_name == other.res_name
            && self.res_seq == other.res_seq
            && points_coincide(&self.position, &other.position)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lysine_nz(serial: usize, chain_id: char, res_seq: isize) -> Atom {
        Atom {
            serial,
            name: "NZ".to_string(),
            alt_loc: ' ',
            res_name: "LYS".to_string(),
            res_seq,
            i_code: ' ',
            chain_id,
            position: Point3::new(1.0, 2.0, 3.0),
            element: Element::N,
            vdw_radius: 1.55,
            charge: None,
            flags: AtomFlags::default(),
        }
    }

    #[test]
    fn element_parsing_handles_case_and_isotopes() {
        assert_eq!(Element::from_symbol("fe"), Element::Fe);
        assert_eq!(Element::from_symbol(" ZN"), Element::Zn);
        assert_eq!(Element::from_symbol("D"), Element::H);
        assert_eq!(Element::from_symbol("Xx"), Element::Unknown);
    }

    #[test]
    fn element_from_atom_name_skips_leading_digits() {
        assert_eq!(Element::from_atom_name("1HB"), Element::H);
        assert_eq!(Element::from_atom_name("NZ"), Element::N);
        assert_eq!(Element::from_atom_name("CA"), Element::C);
    }

    #[test]
    fn descriptor_has_four_dash_separated_fields() {
        let atom = lysine_nz(1, 'A', 42);
        assert_eq!(atom.descriptor(), "LYS-42-A-NZ");
    }

    #[test]
    fn equality_tolerates_tiny_coordinate_noise() {
        let a = lysine_nz(1, 'A', 42);
        let mut b = lysine_nz(99, 'A', 42); // serial is not identifying
        b.position = Point3::new(1.0 + 5.0e-5, 2.0, 3.0);
        assert_eq!(a, b);

        let mut c = lysine_nz(1, 'A', 42);
        c.position = Point3::new(1.01, 2.0, 3.0);
        assert_ne!(a, c);

        let mut d = lysine_nz(1, 'B', 42);
        d.position = a.position;
        assert_ne!(a, d);
    }

    #[test]
    fn metals_are_recognized() {
        assert!(Element::Zn.is_metal());
        assert!(!Element::C.is_metal());
    }
}
