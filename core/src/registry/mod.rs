//! Snippet catalog: entries, lookup/filtering, and loading from disk.

mod filter;
mod loader;
mod store;
mod types;

pub use filter::{Selection, SnippetFilter};
pub use loader::{load, load_dir, load_manifest, LoaderOptions, MANIFEST_FILE};
pub use store::SnippetRegistry;
pub use types::SnippetEntry;
