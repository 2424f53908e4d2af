use thiserror::Error;

use super::{AggregateError, RegistryError, RenderError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Registry(#[from] RegistryError),
    #[error("internal error: {0}")]
    Aggregate(#[from] AggregateError),
    #[error("{0}")]
    Render(#[from] RenderError),
    #[error("usage error: {0}")]
    Usage(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit code for a fatal error.
    ///
    /// 0 and 1 are reserved for run outcomes (all succeeded / something failed).
    pub fn exit_code(&self) -> i32 {
        // 2: usage error (unknown id/category, unsupported format)
        // 3: config or catalog load error
        // 4: internal/uncategorized
        match self {
            Self::Registry(e) if e.is_usage() => 2,
            Self::Registry(_) => 3,
            Self::Render(_) => 2,
            Self::Usage(_) => 2,
            Self::Config(_) => 3,
            Self::Aggregate(_) => 4,
            Self::Io(_) => 4,
            Self::Anyhow(_) => 4,
        }
    }
}
