use std::collections::BTreeMap;
use url::Url;

/// Deduplicating name→link map built by the list phase
///
/// The catalog keys items by display name, and the site reuses names: the
/// same garment can be listed twice under slightly different spellings, or
/// twice under the same name on different pages. A later insert with an
/// existing name overwrites the earlier link (last-writer-wins) and bumps the
/// duplicate counter, so:
///
/// `store.len() + store.duplicates() == total items seen`
///
/// The map is ordered so serialization is deterministic.
#[derive(Debug, Default, Clone)]
pub struct LinkStore {
    links: BTreeMap<String, Url>,
    duplicates: u64,
}

impl LinkStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a name→link pair
    ///
    /// Returns `true` if the name was already present (the old link is
    /// overwritten and counted as a duplicate).
    pub fn insert(&mut self, name: String, link: Url) -> bool {
        let duplicate = self.links.insert(name, link).is_some();
        if duplicate {
            self.duplicates += 1;
        }
        duplicate
    }

    /// Number of distinct names collected
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if no links have been collected
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Number of overwrites caused by repeated names
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// Looks up the link for a name
    pub fn get(&self, name: &str) -> Option<&Url> {
        self.links.get(name)
    }

    /// Owned snapshot of all entries, in name order
    ///
    /// The detail phase queues this snapshot; the store is not mutated once
    /// the snapshot is taken.
    pub fn snapshot(&self) -> Vec<(String, Url)> {
        self.links
            .iter()
            .map(|(name, link)| (name.clone(), link.clone()))
            .collect()
    }

    /// Borrow of the underlying map, for serialization
    pub fn as_map(&self) -> &BTreeMap<String, Url> {
        &self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = LinkStore::new();
        assert!(!store.insert("白玫瑰".to_string(), url("http://example.com/1.html")));

        assert_eq!(store.len(), 1);
        assert_eq!(store.duplicates(), 0);
        assert_eq!(
            store.get("白玫瑰").map(|u| u.as_str()),
            Some("http://example.com/1.html")
        );
    }

    #[test]
    fn test_duplicate_name_overwrites_and_counts() {
        let mut store = LinkStore::new();
        store.insert("绅士".to_string(), url("http://example.com/old.html"));
        assert!(store.insert("绅士".to_string(), url("http://example.com/new.html")));

        // Last writer wins, size unchanged, duplicate counted
        assert_eq!(store.len(), 1);
        assert_eq!(store.duplicates(), 1);
        assert_eq!(
            store.get("绅士").map(|u| u.as_str()),
            Some("http://example.com/new.html")
        );
    }

    #[test]
    fn test_size_plus_duplicates_equals_items_seen() {
        let mut store = LinkStore::new();
        let items = ["a", "b", "a", "c", "b", "a"];
        for (i, name) in items.iter().enumerate() {
            store.insert(
                name.to_string(),
                url(&format!("http://example.com/{}.html", i)),
            );
        }

        assert_eq!(store.len() as u64 + store.duplicates(), items.len() as u64);
        assert_eq!(store.len(), 3);
        assert_eq!(store.duplicates(), 3);
    }

    #[test]
    fn test_snapshot_is_name_ordered() {
        let mut store = LinkStore::new();
        store.insert("b".to_string(), url("http://example.com/b.html"));
        store.insert("a".to_string(), url("http://example.com/a.html"));

        let names: Vec<String> = store.snapshot().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
