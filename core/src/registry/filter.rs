use super::SnippetEntry;

/// Predicate applied by [`SnippetRegistry::list`](super::SnippetRegistry::list).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SnippetFilter {
    #[default]
    All,
    /// ASCII case-insensitive category match.
    Category(String),
    Id(String),
}

impl SnippetFilter {
    pub fn matches(&self, entry: &SnippetEntry) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => entry.category.eq_ignore_ascii_case(category.trim()),
            Self::Id(id) => entry.id == *id,
        }
    }
}

/// What the user asked to run, resolved by [`SnippetRegistry::select`](super::SnippetRegistry::select).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Category(String),
    /// Explicit ids, run in the order given. Repeats run once.
    Ids(Vec<String>),
}
