//! `snipbox list`: the catalog as text or json.
use serde_json::json;
use snipbox_core::api::{ReportFormat, SnippetEntry};

pub fn render_catalog(entries: &[&SnippetEntry], format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => {
            let width = entries.iter().map(|e| e.id.len()).max().unwrap_or(0);
            let mut out = String::new();
            for entry in entries {
                out.push_str(&format!(
                    "{:<width$}  {} [{}]\n",
                    entry.id, entry.title, entry.category
                ));
            }
            out.push_str(&format!("{} snippets\n", entries.len()));
            out
        }
        ReportFormat::Structured => {
            let items: Vec<_> = entries
                .iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "title": e.title,
                        "category": e.category,
                    })
                })
                .collect();
            format!("{}\n", json!({ "snippets": items }))
        }
    }
}
