use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One self-contained demonstration unit.
///
/// The `source` is an opaque payload handed to a sandbox; nothing in the core inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetEntry {
    pub id: String,
    pub title: String,
    pub category: String,
    pub source: String,

    /// File the snippet was loaded from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<PathBuf>,
}

impl SnippetEntry {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: category.into(),
            source: source.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}
