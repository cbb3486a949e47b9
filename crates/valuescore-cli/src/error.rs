use std::path::PathBuf;

use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] valuescore_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error("cannot load metrics document '{}': {source}", .path.display())]
    Input {
        path: PathBuf,
        source: valuescore_core::CoreError,
    },

    #[error(transparent)]
    Fetch(#[from] valuescore_core::FetchError),

    #[error("strict mode failed: warnings={warning_count}")]
    StrictModeViolation { warning_count: usize },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Input { .. } => 2,
            Self::Fetch(_) => 3,
            Self::StrictModeViolation { .. } => 5,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
