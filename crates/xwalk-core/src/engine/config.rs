use crate::core::models::atom::Atom;
use crate::core::params::RadiusSet;
use std::collections::HashSet;
use thiserror::Error;

/// Largest protein dimension (Å) gridded in one piece; beyond this the
/// engine switches to a per-source local grid.
pub const MAX_PROTEIN_DIMENSION: f64 = 150.0;
/// Default cross-linker length (Å), the reach of BS3/DSS-class reagents.
pub const DEFAULT_CROSS_LINKER_LENGTH: f64 = 34.0;
/// Hard ceiling on any SASD calculation (Å), irrespective of user request.
pub const MAX_SASD_DISTANCE: f64 = 80.0;
/// Minimum distance (Å) a path cell keeps from occupied cells. The linker
/// moiety of a cross-linker is about one and a half carbon atoms thick.
/// Independent of the solvent radius: the solvent radius inflates atom
/// occupancy, the clearance constrains the path through what remains.
pub const PATH_CLEARANCE_RADIUS: f64 = 3.0;
/// Default edge length (Å) of a cubic grid cell.
pub const DEFAULT_GRID_CELL_SIZE: f64 = 1.0;
/// Default solvent probe radius (Å).
pub const DEFAULT_SOLVENT_RADIUS: f64 = 1.4;
/// Solvent probe radius (Å) when only backbone coordinates are gridded.
pub const BACKBONE_SOLVENT_RADIUS: f64 = 2.0;

pub const RES_SEQ_RANGE: std::ops::RangeInclusive<isize> = -999..=9999;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Maximum distance must be positive, got {0}")]
    NonPositiveMaxDistance(f64),

    #[error("Grid cell size must be positive, got {0}")]
    NonPositiveCellSize(f64),

    #[error("Solvent radius must not be negative, got {0}")]
    NegativeSolventRadius(f64),

    #[error("Intra- and intermolecular restrictions are mutually exclusive")]
    ConflictingChainPredicates,

    #[error("Malformed selector: {0}")]
    MalformedSelector(String),
}

/// One side of a pair specification. Every field is a set of admitted
/// values; an empty set means *any*.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomSelector {
    pub residue_names: HashSet<String>,
    pub residue_numbers: HashSet<isize>,
    pub chain_ids: HashSet<char>,
    pub atom_names: HashSet<String>,
    pub alt_locs: HashSet<char>,
}

impl AtomSelector {
    /// A selector that admits every atom.
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether `atom` satisfies this selector. Atoms without an alternative
    /// location indicator pass any alt-loc restriction.
    pub fn matches(&self, atom: &Atom) -> bool {
        (self.residue_names.is_empty() || self.residue_names.contains(&atom.res_name))
            && (self.residue_numbers.is_empty() || self.residue_numbers.contains(&atom.res_seq))
            && (self.chain_ids.is_empty() || self.chain_ids.contains(&atom.chain_id))
            && (self.atom_names.is_empty() || self.atom_names.contains(&atom.name))
            && (self.alt_locs.is_empty()
                || atom.alt_loc == ' '
                || self.alt_locs.contains(&atom.alt_loc))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(n) = self
            .residue_numbers
            .iter()
            .find(|n| !RES_SEQ_RANGE.contains(*n))
        {
            return Err(ConfigError::MalformedSelector(format!(
                "residue number {} outside [-999, 9999]",
                n
            )));
        }
        if self.residue_names.iter().any(|s| s.is_empty())
            || self.atom_names.iter().any(|s| s.is_empty())
        {
            return Err(ConfigError::MalformedSelector(
                "empty residue or atom name".to_string(),
            ));
        }
        Ok(())
    }
}

/// The two selectors defining candidate sources and targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairSpec {
    pub first: AtomSelector,
    pub second: AtomSelector,
}

/// Immutable configuration of one distance calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceConfig {
    /// Maximum SASD searched for, in Å. Clamped to [`MAX_SASD_DISTANCE`].
    pub max_distance: f64,
    /// Edge length of a cubic grid cell in Å.
    pub grid_cell_size: f64,
    /// Solvent probe radius in Å, added to every atom's van der Waals radius
    /// when marking grid occupancy.
    pub solvent_radius: f64,
    /// Restrict pairs to atoms on the same chain.
    pub intra_only: bool,
    /// Restrict pairs to atoms on different chains.
    pub inter_only: bool,
    /// Deduplicate symmetry-equivalent pairs across homomeric chains.
    pub homomeric: bool,
    /// Force per-source local grids even for small structures.
    pub local_grid: bool,
    /// Grid only backbone atoms; use with [`BACKBONE_SOLVENT_RADIUS`].
    pub backbone_only: bool,
    /// Admit only candidate atoms inside cross-linkable tryptic peptides.
    pub digest: bool,
    /// The van der Waals radius parameter set applied to the atom list.
    pub radius_set: RadiusSet,
    /// Candidate selectors.
    pub pair: PairSpec,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_CROSS_LINKER_LENGTH,
            grid_cell_size: DEFAULT_GRID_CELL_SIZE,
            solvent_radius: DEFAULT_SOLVENT_RADIUS,
            intra_only: false,
            inter_only: false,
            homomeric: false,
            local_grid: false,
            backbone_only: false,
            digest: false,
            radius_set: RadiusSet::default(),
            pair: PairSpec::default(),
        }
    }
}

impl DistanceConfig {
    /// The search bound actually applied: the user's request capped by the
    /// engine-wide ceiling.
    pub fn effective_max_distance(&self) -> f64 {
        self.max_distance.min(MAX_SASD_DISTANCE)
    }

    /// The solvent radius appropriate for a gridding mode.
    pub fn default_solvent_radius(backbone_only: bool) -> f64 {
        if backbone_only {
            BACKBONE_SOLVENT_RADIUS
        } else {
            DEFAULT_SOLVENT_RADIUS
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_distance <= 0.0 {
            return Err(ConfigError::NonPositiveMaxDistance(self.max_distance));
        }
        if self.grid_cell_size <= 0.0 {
            return Err(ConfigError::NonPositiveCellSize(self.grid_cell_size));
        }
        if self.solvent_radius < 0.0 {
            return Err(ConfigError::NegativeSolventRadius(self.solvent_radius));
        }
        if self.intra_only && self.inter_only {
            return Err(ConfigError::ConflictingChainPredicates);
        }
        self.pair.first.validate()?;
        self.pair.second.validate()?;
        Ok(())
    }
}
