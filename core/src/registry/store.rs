use std::collections::{HashMap, HashSet};

use crate::error::RegistryError;

use super::{Selection, SnippetEntry, SnippetFilter};

/// In-memory catalog of snippets, kept in registration order.
///
/// The registry is only mutated while it is being built; runs borrow it immutably.
#[derive(Debug, Clone, Default)]
pub struct SnippetRegistry {
    entries: Vec<SnippetEntry>,
    index: HashMap<String, usize>,
}

impl SnippetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: SnippetEntry) -> Result<(), RegistryError> {
        if entry.id.trim().is_empty() {
            return Err(RegistryError::InvalidEntry {
                id: entry.id,
                reason: "id is empty",
            });
        }
        if entry.category.trim().is_empty() {
            return Err(RegistryError::InvalidEntry {
                id: entry.id,
                reason: "category is empty",
            });
        }
        if self.index.contains_key(&entry.id) {
            return Err(RegistryError::DuplicateId(entry.id));
        }

        self.index.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Entries matching `filter`, in registration order. Each call starts a fresh iteration.
    pub fn list<'a>(
        &'a self,
        filter: &'a SnippetFilter,
    ) -> impl Iterator<Item = &'a SnippetEntry> + 'a {
        self.entries.iter().filter(move |e| filter.matches(e))
    }

    pub fn get(&self, id: &str) -> Result<&SnippetEntry, RegistryError> {
        self.index
            .get(id)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Distinct categories in first-registration order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !out.iter().any(|c| c.eq_ignore_ascii_case(&entry.category)) {
                out.push(&entry.category);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a user selection into the owned, ordered list of entries to run.
    pub fn select(&self, selection: &Selection) -> Result<Vec<SnippetEntry>, RegistryError> {
        match selection {
            Selection::All => Ok(self.entries.clone()),
            Selection::Category(category) => {
                let filter = SnippetFilter::Category(category.clone());
                let picked: Vec<SnippetEntry> = self.list(&filter).cloned().collect();
                if picked.is_empty() {
                    return Err(RegistryError::UnknownCategory(category.clone()));
                }
                Ok(picked)
            }
            Selection::Ids(ids) => {
                // A repeated id runs once, at its first position.
                let mut seen = HashSet::new();
                ids.iter()
                    .filter(|id| seen.insert(id.as_str()))
                    .map(|id| self.get(id).cloned())
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> SnippetRegistry {
        let mut reg = SnippetRegistry::new();
        reg.register(SnippetEntry::new("map-1", "Map basics", "Maps", "a"))
            .unwrap();
        reg.register(SnippetEntry::new("set-1", "Set basics", "Sets", "b"))
            .unwrap();
        reg.register(SnippetEntry::new("map-2", "Map iteration", "Maps", "c"))
            .unwrap();
        reg
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut reg = sample();
        let err = reg
            .register(SnippetEntry::new("map-1", "again", "Maps", ""))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId(id) if id == "map-1"));
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn rejects_empty_category() {
        let mut reg = SnippetRegistry::new();
        let err = reg
            .register(SnippetEntry::new("x", "x", "  ", ""))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidEntry { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn get_missing_is_not_found() {
        let reg = sample();
        assert!(matches!(reg.get("nope"), Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn list_then_get_round_trips() {
        let reg = sample();
        for entry in reg.list(&SnippetFilter::All) {
            assert_eq!(reg.get(&entry.id).unwrap(), entry);
        }
    }

    #[test]
    fn list_is_ordered_and_restartable() {
        let reg = sample();
        let filter = SnippetFilter::Category("maps".into());
        let first: Vec<&str> = reg.list(&filter).map(|e| e.id.as_str()).collect();
        let second: Vec<&str> = reg.list(&filter).map(|e| e.id.as_str()).collect();
        assert_eq!(first, vec!["map-1", "map-2"]);
        assert_eq!(first, second);
    }

    #[test]
    fn categories_keep_first_seen_order() {
        assert_eq!(sample().categories(), vec!["Maps", "Sets"]);
    }

    #[test]
    fn select_resolves_ids_in_requested_order() {
        let reg = sample();
        let picked = reg
            .select(&Selection::Ids(vec!["map-2".into(), "set-1".into()]))
            .unwrap();
        let ids: Vec<&str> = picked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["map-2", "set-1"]);
    }

    #[test]
    fn select_drops_repeated_ids() {
        let reg = sample();
        let picked = reg
            .select(&Selection::Ids(vec![
                "set-1".into(),
                "map-1".into(),
                "set-1".into(),
            ]))
            .unwrap();
        let ids: Vec<&str> = picked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["set-1", "map-1"]);
    }

    #[test]
    fn select_unknown_category_is_usage_error() {
        let err = sample()
            .select(&Selection::Category("Proxies".into()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownCategory(_)));
        assert!(err.is_usage());
    }
}
