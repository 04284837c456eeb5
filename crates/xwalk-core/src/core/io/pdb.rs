use crate::core::models::atom::{Atom, AtomFlags, Element};
use crate::core::models::collection::AtomList;
use nalgebra::Point3;
use std::collections::HashSet;
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;

/// Largest coordinate magnitude the engine accepts (Ångström).
pub const MAX_COORDINATE: f64 = 9999.0;

/// Water residue names; waters are not part of the protein volume.
const WATER_RES_NAMES: [&str; 3] = ["HOH", "WAT", "H2O"];

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("No ATOM or HETATM records found")]
    NoAtoms,
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer in columns {columns}: '{value}'")]
    InvalidInt { columns: &'static str, value: String },
    #[error("Invalid float in columns {columns}: '{value}'")]
    InvalidFloat { columns: &'static str, value: String },
    #[error("ATOM/HETATM line is too short ({length} columns, at least 54 required)")]
    ShortLine { length: usize },
    #[error("Coordinate magnitude exceeds {MAX_COORDINATE} Å")]
    CoordinateOutOfBounds,
}

/// Reads all `ATOM`/`HETATM` records of the first model into an [`AtomList`].
///
/// Water residues are skipped: they are not part of the protein volume the
/// distance engine grids. All alternative locations are kept; selector specs
/// decide which ones participate in a calculation.
pub fn read_atoms(reader: &mut impl BufRead) -> Result<AtomList, PdbError> {
    let mut atoms = AtomList::new();
    let mut seen_serials = HashSet::new();

    for (line_idx, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = line_idx + 1;

        let record = field(&line, 0, 6);
        match record {
            "ATOM" | "HETATM" => {
                let atom = parse_atom_line(&line, line_num)?;
                if WATER_RES_NAMES.contains(&atom.res_name.as_str()) {
                    continue;
                }
                if !seen_serials.insert(atom.serial) {
                    return Err(PdbError::Inconsistency(format!(
                        "Duplicate atom serial: {}",
                        atom.serial
                    )));
                }
                atoms.push(atom);
            }
            // Only the first model participates in the calculation.
            "ENDMDL" => break,
            _ => {}
        }
    }

    if atoms.is_empty() {
        return Err(PdbError::NoAtoms);
    }
    Ok(atoms)
}

pub fn read_atoms_from_path(path: &Path) -> Result<AtomList, PdbError> {
    let file = std::fs::File::open(path)?;
    read_atoms(&mut io::BufReader::new(file))
}

/// Trimmed slice of a fixed-column field; empty if the line is too short.
fn field(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_atom_line(line: &str, line_num: usize) -> Result<Atom, PdbError> {
    if line.len() < 54 {
        return Err(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::ShortLine { length: line.len() },
        });
    }

    let serial: usize = field(line, 6, 11).parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns: "7-11",
            value: field(line, 6, 11).to_string(),
        },
    })?;

    let name = field(line, 12, 16).to_string();
    let alt_loc = line.chars().nth(16).filter(|c| !c.is_whitespace()).unwrap_or(' ');
    let res_name = field(line, 17, 20).to_string();
    let chain_id = line.chars().nth(21).filter(|c| !c.is_whitespace()).unwrap_or(' ');

    let res_seq: isize = field(line, 22, 26).parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns: "23-26",
            value: field(line, 22, 26).to_string(),
        },
    })?;

    let i_code = line.chars().nth(26).filter(|c| !c.is_whitespace()).unwrap_or(' ');

    let coord = |start, end, columns: &'static str| -> Result<f64, PdbError> {
        let value: f64 = field(line, start, end).parse().map_err(|_| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::InvalidFloat {
                columns,
                value: field(line, start, end).to_string(),
            },
        })?;
        if value.abs() > MAX_COORDINATE {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::CoordinateOutOfBounds,
            });
        }
        Ok(value)
    };
    let x = coord(30, 38, "31-38")?;
    let y = coord(38, 46, "39-46")?;
    let z = coord(46, 54, "47-54")?;

    let element_field = field(line, 76, 78);
    let element = if element_field.is_empty() {
        Element::from_atom_name(&name)
    } else {
        Element::from_symbol(element_field)
    };

    let charge = parse_charge(field(line, 78, 80));

    let mut flags = AtomFlags::default();
    if element.is_metal() {
        flags |= AtomFlags::METALLIC;
    }

    Ok(Atom {
        serial,
        name,
        alt_loc,
        res_name,
        res_seq,
        i_code,
        chain_id,
        position: Point3::new(x, y, z),
        element,
        vdw_radius: 0.0,
        charge,
        flags,
    })
}

/// PDB charges are written as magnitude-then-sign, e.g. "2+" or "1-".
fn parse_charge(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    let (magnitude, sign) = text.split_at(text.len().checked_sub(1)?);
    let value: f64 = magnitude.parse().ok()?;
    match sign {
        "+" => Some(value),
        "-" => Some(-value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
HEADER    TRANSFERASE                             01-JAN-00   1ABC
ATOM      1  N   LYS A  42      32.433  16.336  57.540  1.00 11.92           N
ATOM      2  CA  LYS A  42      31.132  16.439  58.160  1.00 11.85           C
ATOM      3  NZ  LYS A  42      28.870  17.401  57.336  1.00 12.64           N
HETATM    4 ZN    ZN B 101      30.000  15.000  56.000  1.00 10.00          ZN2+
HETATM    5  O   HOH A 201      29.000  14.000  55.000  1.00 30.00           O
END
";

    #[test]
    fn reads_atoms_and_skips_water() {
        let mut reader = Cursor::new(SAMPLE);
        let atoms = read_atoms(&mut reader).unwrap();
        assert_eq!(atoms.len(), 4);
        let nz = atoms.get(2).unwrap();
        assert_eq!(nz.name, "NZ");
        assert_eq!(nz.res_name, "LYS");
        assert_eq!(nz.res_seq, 42);
        assert_eq!(nz.chain_id, 'A');
        assert_eq!(nz.element, Element::N);
        assert!((nz.position.x - 28.870).abs() < 1e-9);
    }

    #[test]
    fn hetatm_metal_gets_flag_and_charge() {
        let mut reader = Cursor::new(SAMPLE);
        let atoms = read_atoms(&mut reader).unwrap();
        let zn = atoms.get(3).unwrap();
        assert_eq!(zn.element, Element::Zn);
        assert!(zn.flags.contains(AtomFlags::METALLIC));
        assert_eq!(zn.charge, Some(2.0));
    }

    #[test]
    fn duplicate_serial_is_an_inconsistency() {
        let doubled = "\
ATOM      1  N   LYS A  42      32.433  16.336  57.540  1.00 11.92           N
ATOM      1  CA  LYS A  42      31.132  16.439  58.160  1.00 11.85           C
";
        let mut reader = Cursor::new(doubled);
        assert!(matches!(
            read_atoms(&mut reader),
            Err(PdbError::Inconsistency(_))
        ));
    }

    #[test]
    fn records_after_endmdl_are_ignored() {
        let multi_model = "\
ATOM      1  N   LYS A  42      32.433  16.336  57.540  1.00 11.92           N
ENDMDL
ATOM      2  N   LYS A  42      12.433  26.336  47.540  1.00 11.92           N
";
        let mut reader = Cursor::new(multi_model);
        let atoms = read_atoms(&mut reader).unwrap();
        assert_eq!(atoms.len(), 1);
    }

    #[test]
    fn short_line_is_rejected_with_line_number() {
        let truncated = "ATOM      1  N   LYS A  42      32.433\n";
        let mut reader = Cursor::new(truncated);
        match read_atoms(&mut reader) {
            Err(PdbError::Parse { line, kind }) => {
                assert_eq!(line, 1);
                assert!(matches!(kind, PdbParseErrorKind::ShortLine { .. }));
            }
            other => panic!("Expected parse error, got {:?}", other.map(|a| a.len())),
        }
    }

    #[test]
    fn empty_input_reports_no_atoms() {
        let mut reader = Cursor::new("HEADER    EMPTY\nEND\n");
        assert!(matches!(read_atoms(&mut reader), Err(PdbError::NoAtoms)));
    }

    #[test]
    fn charge_parsing_handles_both_signs() {
        assert_eq!(parse_charge("2+"), Some(2.0));
        assert_eq!(parse_charge("1-"), Some(-1.0));
        assert_eq!(parse_charge(""), None);
        assert_eq!(parse_charge("++"), None);
    }
}
