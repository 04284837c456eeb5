mod cli;
mod config;
mod error;
mod logging;
mod output;
mod progress;

use clap::Parser;
use cli::Cli;
use config::PartialJobConfig;
use error::{CliError, Result};
use std::io;
use tracing::info;
use xwalk::core::io::pdb;
use xwalk::engine::progress::{CancelToken, ProgressReporter};
use xwalk::workflows::distance;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let partial = match &cli.config {
        Some(path) => PartialJobConfig::from_file(path)?,
        None => PartialJobConfig::default(),
    };
    let config = partial.merge_with_cli(&cli)?;

    info!("Loading structure from {:?}", cli.input);
    let mut atoms = pdb::read_atoms_from_path(&cli.input).map_err(|e| CliError::FileParsing {
        path: cli.input.clone(),
        source: e.into(),
    })?;
    info!(atoms = atoms.len(), "Structure loaded.");

    let progress_handler = progress::CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let cancel = CancelToken::new();

    let records = distance::run(&mut atoms, &config, &reporter, &cancel)?;

    let filename = cli
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.input.display().to_string());

    match &cli.output {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            output::write_records(&mut file, &filename, &atoms, &records)?;
            println!("{} distances written to {}", records.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            output::write_records(&mut stdout.lock(), &filename, &atoms, &records)?;
        }
    }

    Ok(())
}
