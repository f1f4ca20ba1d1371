//! Error types for options persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing persisted options.
///
/// The in-memory store never fails; only the file layer does.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Reading, writing or backing up a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// The file extension maps to no known format.
    #[error("Unsupported options file extension: {0:?}")]
    UnsupportedFormat(String),
}

impl OptionsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OptionsError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for options persistence.
pub type Result<T> = std::result::Result<T, OptionsError>;
