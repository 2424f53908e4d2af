use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or querying the snippet registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("duplicate snippet id: {0}")]
    DuplicateId(String),

    #[error("snippet not found: {0}")]
    NotFound(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("invalid snippet '{id}': {reason}")]
    InvalidEntry { id: String, reason: &'static str },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },
}

impl RegistryError {
    /// Lookup failures caused by what the user asked for, as opposed to a broken catalog.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::UnknownCategory(_))
    }
}
