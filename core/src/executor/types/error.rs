use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed classification of snippet failures. Used for reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    TypeLike,
    ReferenceLike,
    RangeLike,
    Other,
    /// Snippet exceeded its time budget.
    Timeout,
    /// Run was cancelled before or while the snippet ran.
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeLike => "typeLike",
            Self::ReferenceLike => "referenceLike",
            Self::RangeLike => "rangeLike",
            Self::Other => "other",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by (or on behalf of) a snippet while it ran.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct SnippetFailure {
    pub message: String,
    pub kind: ErrorKind,
}

impl SnippetFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Other, message)
    }

    /// Build a failure from an error name such as `TypeError` and its message.
    pub fn named(name: &str, message: &str) -> Self {
        let kind = crate::executor::classify(name);
        let message = message.trim();
        let message = if kind == ErrorKind::Other && name != "Error" {
            if message.is_empty() {
                name.to_string()
            } else {
                format!("{name}: {message}")
            }
        } else if message.is_empty() {
            name.to_string()
        } else {
            message.to_string()
        };
        Self { message, kind }
    }
}
