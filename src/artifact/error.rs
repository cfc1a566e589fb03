use std::path::PathBuf;
use thiserror::Error;

/// Why an artifact bundle could not be produced.
///
/// `NotFound` is the expected "nothing trained yet" case and is checked by the
/// caller; every other variant means the file exists but cannot be trusted.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read artifact at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact at {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported artifact version: {0}")]
    UnsupportedVersion(u32),

    #[error("invalid artifact: {0}")]
    Invalid(String),
}

impl ArtifactError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArtifactError::NotFound(_))
    }
}
