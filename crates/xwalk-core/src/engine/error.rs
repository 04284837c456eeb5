use thiserror::Error;

use super::config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid atom input: {0}")]
    Input(String),

    #[error("Structure contains no atoms")]
    EmptyStructure,

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

/// Per-pair failures. These do not abort the run; the offending pair is
/// emitted with a sentinel distance and the driver continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairFailure {
    /// Source or target atom falls outside the (local) grid.
    OutsideGrid,
    /// The endpoint cell is still occupied after its own atom's shell was
    /// cleared, i.e. another atom overlaps the endpoint.
    ShellConflict,
}

impl std::fmt::Display for PairFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairFailure::OutsideGrid => write!(f, "atom outside search grid"),
            PairFailure::ShellConflict => write!(f, "endpoint overlaps another atom"),
        }
    }
}
