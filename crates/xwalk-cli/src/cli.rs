use clap::{Parser, ValueEnum};
use std::path::PathBuf;

const ABOUT: &str = "Xwalk CLI - Computes solvent-accessible surface distances (SASD) between candidate cross-linking sites on protein structures.";
const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RadiusSetArg {
    Surfnet,
    Rasmol,
}

#[derive(Parser, Debug)]
#[command(
    author = "Xwalk-rs Developers",
    version,
    about = ABOUT,
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Path to the input structure in PDB format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the tab-separated distance table. Writes to stdout if omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a job configuration file in TOML format. Command-line
    /// arguments override values from the file.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- First selector ---
    /// Residue names admitted on the first side, comma separated (e.g. "LYS").
    #[arg(long = "aa1", value_name = "NAMES")]
    pub residue_names1: Option<String>,

    /// Residue numbers admitted on the first side, comma separated.
    #[arg(long = "r1", value_name = "NUMBERS")]
    pub residue_numbers1: Option<String>,

    /// Chain identifiers admitted on the first side, comma separated.
    #[arg(long = "c1", value_name = "CHAINS")]
    pub chains1: Option<String>,

    /// Atom names admitted on the first side, comma separated (e.g. "NZ,CB").
    #[arg(long = "a1", value_name = "NAMES")]
    pub atom_names1: Option<String>,

    /// Alternative location codes admitted on the first side.
    #[arg(long = "l1", value_name = "CODES")]
    pub alt_locs1: Option<String>,

    // --- Second selector ---
    /// Residue names admitted on the second side, comma separated.
    #[arg(long = "aa2", value_name = "NAMES")]
    pub residue_names2: Option<String>,

    /// Residue numbers admitted on the second side, comma separated.
    #[arg(long = "r2", value_name = "NUMBERS")]
    pub residue_numbers2: Option<String>,

    /// Chain identifiers admitted on the second side, comma separated.
    #[arg(long = "c2", value_name = "CHAINS")]
    pub chains2: Option<String>,

    /// Atom names admitted on the second side, comma separated.
    #[arg(long = "a2", value_name = "NAMES")]
    pub atom_names2: Option<String>,

    /// Alternative location codes admitted on the second side.
    #[arg(long = "l2", value_name = "CODES")]
    pub alt_locs2: Option<String>,

    // --- Search parameters ---
    /// Maximum cross-linker length in Ångström.
    #[arg(short = 'm', long = "max-dist", value_name = "ANGSTROM")]
    pub max_distance: Option<f64>,

    /// Edge length of a cubic grid cell in Ångström.
    #[arg(long = "cell-size", value_name = "ANGSTROM")]
    pub grid_cell_size: Option<f64>,

    /// Solvent probe radius in Ångström.
    #[arg(long = "solvent-radius", value_name = "ANGSTROM")]
    pub solvent_radius: Option<f64>,

    /// Report only intramolecular pairs (same chain).
    #[arg(long)]
    pub intra: bool,

    /// Report only intermolecular pairs (different chains).
    #[arg(long, conflicts_with = "intra")]
    pub inter: bool,

    /// Emit symmetry-equivalent pairs of a homomeric complex once.
    #[arg(long = "homo")]
    pub homomeric: bool,

    /// Rebuild the grid locally around each source atom.
    #[arg(long = "local")]
    pub local_grid: bool,

    /// Grid only backbone atoms, with a widened solvent probe.
    #[arg(long = "bb")]
    pub backbone_only: bool,

    /// Admit only sites within cross-linkable tryptic peptides.
    #[arg(long = "trypsin")]
    pub digest: bool,

    /// Van der Waals radius parameter set.
    #[arg(long = "radii", value_enum, value_name = "SET")]
    pub radius_set: Option<RadiusSetArg>,

    // --- Diagnostics ---
    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_parsing() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn selector_and_search_arguments_parse() {
        let args = [
            "xwalk",
            "-i",
            "structure.pdb",
            "-o",
            "distances.tsv",
            "--aa1",
            "LYS",
            "--a1",
            "NZ",
            "--aa2",
            "LYS",
            "--a2",
            "NZ",
            "--c2",
            "A,B",
            "--max-dist",
            "30",
            "--homo",
            "--trypsin",
            "--radii",
            "rasmol",
        ];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.input, PathBuf::from("structure.pdb"));
        assert_eq!(cli.output, Some(PathBuf::from("distances.tsv")));
        assert_eq!(cli.residue_names1.as_deref(), Some("LYS"));
        assert_eq!(cli.atom_names2.as_deref(), Some("NZ"));
        assert_eq!(cli.chains2.as_deref(), Some("A,B"));
        assert_eq!(cli.max_distance, Some(30.0));
        assert!(cli.homomeric);
        assert!(cli.digest);
        assert_eq!(cli.radius_set, Some(RadiusSetArg::Rasmol));
    }

    #[test]
    fn intra_and_inter_are_mutually_exclusive() {
        let args = ["xwalk", "-i", "a.pdb", "--intra", "--inter"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let args = ["xwalk", "-i", "a.pdb", "-v", "-q"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
