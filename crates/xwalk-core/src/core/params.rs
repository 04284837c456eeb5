use crate::core::models::atom::Element;
use crate::core::models::collection::AtomList;
use phf::{Map, phf_map};

/// Fallback radius for elements a parameter set does not cover (Ångström).
pub const DEFAULT_VDW_RADIUS: f64 = 1.5;

/// SURFNET van der Waals radii, the set used for solvent-accessibility work.
static SURFNET_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 1.20,
    "C" => 1.87,
    "N" => 1.65,
    "O" => 1.40,
    "P" => 1.90,
    "S" => 1.85,
    "Se" => 1.90,
    "F" => 1.47,
    "Cl" => 1.75,
    "Br" => 1.85,
    "I" => 1.98,
    "Na" => 2.27,
    "K" => 2.75,
    "Mg" => 1.73,
    "Ca" => 2.31,
    "Mn" => 2.05,
    "Fe" => 2.04,
    "Co" => 2.00,
    "Ni" => 1.97,
    "Cu" => 1.96,
    "Zn" => 2.01,
};

/// RasMol display radii, kept for compatibility with older distance tables.
static RASMOL_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 1.10,
    "C" => 1.55,
    "N" => 1.40,
    "O" => 1.35,
    "P" => 1.88,
    "S" => 1.81,
    "Se" => 1.90,
    "F" => 1.30,
    "Cl" => 1.77,
    "Br" => 1.95,
    "I" => 2.10,
    "Na" => 2.27,
    "K" => 2.75,
    "Mg" => 1.73,
    "Ca" => 2.31,
    "Mn" => 2.05,
    "Fe" => 2.04,
    "Co" => 2.00,
    "Ni" => 1.97,
    "Cu" => 1.96,
    "Zn" => 2.01,
};

/// The van der Waals radius parameter sets understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadiusSet {
    #[default]
    Surfnet,
    Rasmol,
}

impl RadiusSet {
    fn table(&self) -> &'static Map<&'static str, f64> {
        match self {
            RadiusSet::Surfnet => &SURFNET_RADII,
            RadiusSet::Rasmol => &RASMOL_RADII,
        }
    }

    /// Radius for an element, falling back to [`DEFAULT_VDW_RADIUS`] when the
    /// element is unknown or not covered by the set.
    pub fn radius(&self, element: Element) -> f64 {
        self.table()
            .get(element.symbol())
            .copied()
            .unwrap_or(DEFAULT_VDW_RADIUS)
    }
}

/// Assigns every atom its van der Waals radius from the selected set.
///
/// This is the single point where radii are written; atoms are otherwise
/// immutable once read from file.
pub fn assign_radii(atoms: &mut AtomList, set: RadiusSet) {
    for atom in atoms.iter_mut() {
        atom.vdw_radius = set.radius(atom.element);
    }
}
