//! Error types for dependency manifests.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a dependency manifest.
///
/// The registry itself never fails; these come from the manifest loader and
/// parsers only.
#[derive(Debug, Error)]
pub enum DepsError {
    /// The manifest path does not exist.
    #[error("Manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The manifest exists but could not be read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest content is malformed.
    #[error("Manifest parse error: {0}")]
    Parse(String),
}

impl DepsError {
    /// Creates a parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        DepsError::Parse(msg.into())
    }
}

impl From<serde_json::Error> for DepsError {
    fn from(e: serde_json::Error) -> Self {
        DepsError::Parse(e.to_string())
    }
}

/// Result alias for dependency operations.
pub type Result<T> = std::result::Result<T, DepsError>;
