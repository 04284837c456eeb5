use crate::cli::{Cli, RadiusSetArg};
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use xwalk::core::params::RadiusSet;
use xwalk::engine::config::{AtomSelector, DistanceConfig, PairSpec};

/// Job configuration as read from a TOML file. Every field is optional;
/// command-line arguments override file values, and engine defaults fill
/// whatever remains.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialJobConfig {
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub pairs: PairsSection,
    #[serde(default)]
    pub selector1: SelectorSection,
    #[serde(default)]
    pub selector2: SelectorSection,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct SearchSection {
    pub max_distance: Option<f64>,
    pub grid_cell_size: Option<f64>,
    pub solvent_radius: Option<f64>,
    pub local_grid: Option<bool>,
    pub backbone_only: Option<bool>,
    pub radius_set: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PairsSection {
    pub intra: Option<bool>,
    pub inter: Option<bool>,
    pub homomeric: Option<bool>,
    pub trypsin: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct SelectorSection {
    pub residue_names: Option<Vec<String>>,
    pub residue_numbers: Option<Vec<isize>>,
    pub chains: Option<Vec<String>>,
    pub atom_names: Option<Vec<String>>,
    pub alt_locs: Option<Vec<String>>,
}

impl PartialJobConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(CliError::Io)?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Builds the final engine configuration: CLI arguments first, file
    /// values second, engine defaults last. A side whose selector ends up
    /// entirely unrestricted defaults to lysine side-chain nitrogens, the
    /// canonical cross-linking site.
    pub fn merge_with_cli(&self, cli: &Cli) -> Result<DistanceConfig> {
        let backbone_only = cli.backbone_only || self.search.backbone_only.unwrap_or(false);
        let solvent_radius = cli
            .solvent_radius
            .or(self.search.solvent_radius)
            .unwrap_or_else(|| DistanceConfig::default_solvent_radius(backbone_only));

        let radius_set = match cli.radius_set {
            Some(RadiusSetArg::Surfnet) => RadiusSet::Surfnet,
            Some(RadiusSetArg::Rasmol) => RadiusSet::Rasmol,
            None => match self.search.radius_set.as_deref() {
                None => RadiusSet::default(),
                Some("surfnet") => RadiusSet::Surfnet,
                Some("rasmol") => RadiusSet::Rasmol,
                Some(other) => {
                    return Err(CliError::Config(format!("unknown radius set '{}'", other)));
                }
            },
        };

        let first = build_selector(
            cli.residue_names1.as_deref(),
            cli.residue_numbers1.as_deref(),
            cli.chains1.as_deref(),
            cli.atom_names1.as_deref(),
            cli.alt_locs1.as_deref(),
            &self.selector1,
        )?;
        let second = build_selector(
            cli.residue_names2.as_deref(),
            cli.residue_numbers2.as_deref(),
            cli.chains2.as_deref(),
            cli.atom_names2.as_deref(),
            cli.alt_locs2.as_deref(),
            &self.selector2,
        )?;

        let defaults = DistanceConfig::default();
        Ok(DistanceConfig {
            max_distance: cli
                .max_distance
                .or(self.search.max_distance)
                .unwrap_or(defaults.max_distance),
            grid_cell_size: cli
                .grid_cell_size
                .or(self.search.grid_cell_size)
                .unwrap_or(defaults.grid_cell_size),
            solvent_radius,
            intra_only: cli.intra || self.pairs.intra.unwrap_or(false),
            inter_only: cli.inter || self.pairs.inter.unwrap_or(false),
            homomeric: cli.homomeric || self.pairs.homomeric.unwrap_or(false),
            local_grid: cli.local_grid || self.search.local_grid.unwrap_or(false),
            backbone_only,
            digest: cli.digest || self.pairs.trypsin.unwrap_or(false),
            radius_set,
            pair: PairSpec {
                first: defaulted(first),
                second: defaulted(second),
            },
        })
    }
}

/// A fully unrestricted side would pair every atom against every atom;
/// restrict it to the canonical lysine cross-linking site instead.
fn defaulted(selector: AtomSelector) -> AtomSelector {
    if selector == AtomSelector::any() {
        AtomSelector {
            residue_names: ["LYS".to_string()].into(),
            atom_names: ["NZ".to_string()].into(),
            ..Default::default()
        }
    } else {
        selector
    }
}

fn build_selector(
    residue_names: Option<&str>,
    residue_numbers: Option<&str>,
    chains: Option<&str>,
    atom_names: Option<&str>,
    alt_locs: Option<&str>,
    file: &SelectorSection,
) -> Result<AtomSelector> {
    let residue_names = match residue_names {
        Some(text) => split_names(text),
        None => collect_names(file.residue_names.as_deref()),
    };
    let atom_names = match atom_names {
        Some(text) => split_names(text),
        None => collect_names(file.atom_names.as_deref()),
    };
    let residue_numbers: HashSet<isize> = match residue_numbers {
        Some(text) => text
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse()
                    .map_err(|_| CliError::Argument(format!("invalid residue number '{}'", t)))
            })
            .collect::<Result<_>>()?,
        None => file
            .residue_numbers
            .as_deref()
            .unwrap_or_default()
            .iter()
            .copied()
            .collect(),
    };
    let chain_ids = match chains {
        Some(text) => parse_chars_from_list(text.split(',').map(str::trim))?,
        None => parse_chars_from_list(
            file.chains
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(String::as_str),
        )?,
    };
    let alt_locs = match alt_locs {
        Some(text) => parse_chars_from_list(text.split(',').map(str::trim))?,
        None => parse_chars_from_list(
            file.alt_locs
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(String::as_str),
        )?,
    };

    Ok(AtomSelector {
        residue_names,
        residue_numbers,
        chain_ids,
        atom_names,
        alt_locs,
    })
}

fn split_names(text: &str) -> HashSet<String> {
    text.split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn collect_names(values: Option<&[String]>) -> HashSet<String> {
    values
        .unwrap_or_default()
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_chars_from_list<'a>(values: impl Iterator<Item = &'a str>) -> Result<HashSet<char>> {
    let mut chars = HashSet::new();
    for value in values {
        if value.is_empty() {
            continue;
        }
        let mut iter = value.chars();
        let first = iter.next().expect("non-empty string");
        if iter.next().is_some() {
            return Err(CliError::Argument(format!(
                "'{}' is not a single-character identifier",
                value
            )));
        }
        chars.insert(first);
    }
    Ok(chars)
}
