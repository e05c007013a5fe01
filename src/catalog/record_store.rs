use crate::catalog::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One extracted catalog item
///
/// Field names match the persisted `data.json` format. `col` is the
/// color-variant token from the image filename (`"all"` when the filename
/// carries none), `require` is the usage-requirement text shown on the
/// detail page, and `pic` is the normalized image filename the image is
/// saved under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub name: String,
    pub code: String,
    pub col: String,
    #[serde(rename = "class")]
    pub category: Category,
    pub require: String,
    pub pic: String,
    pub piclink: String,
    pub link: String,
}

/// Key→record map built by the detail phase
///
/// Keyed by the identifier derived from the image filename. The key is NOT
/// unique per list entry: distinct display names can normalize to the same
/// key (the site lists the same garment under several names), in which case
/// the later record silently replaces the earlier one. That collapse is an
/// observed property of the source data, surfaced by the `check` command
/// rather than treated as an error here.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: BTreeMap<String, DetailRecord>,
}

impl RecordStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record under its derived key, overwriting unconditionally
    pub fn insert(&mut self, key: String, record: DetailRecord) {
        self.records.insert(key, record);
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records have been stored
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by derived key
    pub fn get(&self, key: &str) -> Option<&DetailRecord> {
        self.records.get(key)
    }

    /// Borrow of the underlying map, key-sorted, for serialization
    pub fn as_map(&self) -> &BTreeMap<String, DetailRecord> {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> DetailRecord {
        DetailRecord {
            name: name.to_string(),
            code: "60055".to_string(),
            col: "col2".to_string(),
            category: Category::Body,
            require: "全种族通用".to_string(),
            pic: "costume_60055_JinM_col2.png".to_string(),
            piclink: "http://cdn.example.com/Costume_60055_JinM_col2.png".to_string(),
            link: "http://example.com/90099.html".to_string(),
        }
    }

    #[test]
    fn test_key_collision_overwrites_silently() {
        // Two distinct display names deriving the same key: the second
        // record replaces the first, with no error and no counter.
        let mut store = RecordStore::new();
        store.insert("60055_JinM_col2".to_string(), record("白色玫瑰"));
        store.insert("60055_JinM_col2".to_string(), record("白玫瑰"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("60055_JinM_col2").unwrap().name, "白玫瑰");
    }

    #[test]
    fn test_serialized_field_names_match_artifact_format() {
        let json = serde_json::to_value(record("红宝石")).unwrap();
        let obj = json.as_object().unwrap();

        for field in ["name", "code", "col", "class", "require", "pic", "piclink", "link"] {
            assert!(obj.contains_key(field), "missing field {}", field);
        }
        assert_eq!(obj["class"], "body");
    }
}
