use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::config::RegistryConfig;
use crate::error::RegistryError;

use super::{SnippetEntry, SnippetRegistry};

/// Manifest file name looked up at the root of a snippet tree.
pub const MANIFEST_FILE: &str = "snipbox.toml";

/// How many leading lines are searched for a title comment.
const TITLE_SCAN_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// File extensions (without the dot) treated as snippets.
    pub extensions: Vec<String>,
    /// Category for files sitting directly under the root.
    pub default_category: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["js".into(), "mjs".into(), "cjs".into()],
            default_category: "General".into(),
        }
    }
}

impl LoaderOptions {
    pub fn from_config(cfg: &RegistryConfig) -> Self {
        let defaults = Self::default();
        let extensions: Vec<String> = cfg
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            extensions: if extensions.is_empty() {
                defaults.extensions
            } else {
                extensions
            },
            default_category: if cfg.default_category.trim().is_empty() {
                defaults.default_category
            } else {
                cfg.default_category.clone()
            },
        }
    }
}

/// Load a registry from `root`, preferring `root/snipbox.toml` when it exists.
pub fn load(root: &Path, opts: &LoaderOptions) -> Result<SnippetRegistry, RegistryError> {
    let manifest = root.join(MANIFEST_FILE);
    if manifest.is_file() {
        tracing::debug!(path = %manifest.display(), "loading snippet manifest");
        load_manifest(&manifest, opts)
    } else {
        load_dir(root, opts)
    }
}

/// Scan a directory tree: one snippet per file, one category per top-level directory.
pub fn load_dir(root: &Path, opts: &LoaderOptions) -> Result<SnippetRegistry, RegistryError> {
    if !root.is_dir() {
        return Err(RegistryError::Io {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    let base = glob::Pattern::escape(&root.to_string_lossy());
    for ext in &opts.extensions {
        let pattern = format!("{}/**/*.{}", base, ext.trim_start_matches('.'));
        let matches = glob::glob(&pattern).map_err(|e| RegistryError::Manifest {
            path: root.to_path_buf(),
            reason: format!("bad glob pattern {pattern}: {e}"),
        })?;
        // Unreadable directory entries are skipped rather than failing the whole scan.
        paths.extend(matches.flatten().filter(|p| p.is_file()));
    }
    paths.sort();
    paths.dedup();

    let mut registry = SnippetRegistry::new();
    for path in paths {
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        let source = std::fs::read_to_string(&path).map_err(|e| RegistryError::Io {
            path: path.clone(),
            source: e,
        })?;

        let category = category_for(rel, &opts.default_category);
        let id = unique_id(&registry, slug_for(rel), rel);
        let title = extract_title(&source).unwrap_or_else(|| file_stem(rel));

        registry.register(SnippetEntry::new(id, title, category, source).with_origin(path))?;
    }

    tracing::debug!(
        root = %root.display(),
        snippets = registry.len(),
        "snippet tree loaded"
    );
    Ok(registry)
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default, rename = "snippet")]
    snippets: Vec<ManifestSnippet>,
}

#[derive(Debug, Deserialize)]
struct ManifestSnippet {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

/// Load an explicit catalog from a TOML manifest (`[[snippet]]` tables).
pub fn load_manifest(
    manifest_path: &Path,
    opts: &LoaderOptions,
) -> Result<SnippetRegistry, RegistryError> {
    let text = std::fs::read_to_string(manifest_path).map_err(|e| RegistryError::Io {
        path: manifest_path.to_path_buf(),
        source: e,
    })?;
    let manifest: Manifest = toml::from_str(&text).map_err(|e| RegistryError::Manifest {
        path: manifest_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let mut registry = SnippetRegistry::new();

    for item in manifest.snippets {
        let (source, origin) = match (item.source, item.path) {
            (Some(source), _) => (source, None),
            (None, Some(rel)) => {
                let path = base.join(rel);
                let source = std::fs::read_to_string(&path).map_err(|e| RegistryError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                (source, Some(path))
            }
            (None, None) => {
                return Err(RegistryError::Manifest {
                    path: manifest_path.to_path_buf(),
                    reason: format!("snippet '{}' has neither source nor path", item.id),
                })
            }
        };

        let title = item
            .title
            .or_else(|| extract_title(&source))
            .unwrap_or_else(|| item.id.clone());
        let category = item
            .category
            .unwrap_or_else(|| opts.default_category.clone());

        let mut entry = SnippetEntry::new(item.id, title, category, source);
        entry.origin = origin;
        registry.register(entry)?;
    }

    Ok(registry)
}

fn category_for(rel: &Path, default_category: &str) -> String {
    let mut comps = rel.components().filter_map(|c| match c {
        Component::Normal(s) => Some(s.to_string_lossy().to_string()),
        _ => None,
    });
    let first = comps.next();
    match (first, comps.next()) {
        // At least one directory above the file.
        (Some(dir), Some(_)) => dir,
        _ => default_category.to_string(),
    }
}

fn slug_for(rel: &Path) -> String {
    let without_ext = rel.with_extension("");
    without_ext
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(slugify(&s.to_string_lossy())),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Files whose names differ only in punctuation or case share a slug; later ones in
/// path order get `-2`, `-3`, ... appended.
fn unique_id(registry: &SnippetRegistry, slug: String, rel: &Path) -> String {
    if registry.get(&slug).is_err() {
        return slug;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{slug}-{n}");
        if registry.get(&candidate).is_err() {
            tracing::warn!(
                path = %rel.display(),
                slug = %slug,
                id = %candidate,
                "snippet id already taken; using a numbered id"
            );
            return candidate;
        }
        n += 1;
    }
}

fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

fn file_stem(rel: &Path) -> String {
    rel.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?://+|/\*+|\*+)(.*?)(?:\*+/)?\s*$").expect("valid comment regex")
    })
}

/// First comment line that carries words, with comment markers and `===` rulers removed.
fn extract_title(source: &str) -> Option<String> {
    for line in source.lines().take(TITLE_SCAN_LINES) {
        let Some(caps) = comment_re().captures(line) else {
            if line.trim().is_empty() {
                continue;
            }
            // Code before any title comment.
            return None;
        };
        let text = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let text = text.trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '/' | '*' | '=' | '-' | '#')
        });
        if text.chars().any(char::is_alphabetic) {
            return Some(text.to_string());
        }
    }
    None
}
