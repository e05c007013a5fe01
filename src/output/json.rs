//! Persisted artifact locations and JSON read/write
//!
//! Each category run produces two JSON documents plus an image directory:
//!
//! ```text
//! <database-dir>/<category>/list.json   name → detail-page URL
//! <database-dir>/<category>/data.json   derived key → record
//! <database-dir>/pics/<category>/<pic>  one image file per record
//! ```
//!
//! Both documents are pretty-printed and key-sorted, so consecutive runs
//! produce byte-comparable artifacts.

use crate::catalog::{Category, DetailRecord, LinkStore, RecordStore};
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem layout of one category's artifacts
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub category_dir: PathBuf,
    pub list_json: PathBuf,
    pub data_json: PathBuf,
    pub pics_dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(database_dir: &str, category: Category) -> Self {
        let root = PathBuf::from(database_dir);
        let category_dir = root.join(category.as_str());
        Self {
            list_json: category_dir.join("list.json"),
            data_json: category_dir.join("data.json"),
            pics_dir: root.join("pics").join(category.as_str()),
            category_dir,
        }
    }
}

/// Writes the list-phase artifact
pub fn write_links(path: &Path, links: &LinkStore) -> Result<()> {
    write_pretty(path, links.as_map())
}

/// Writes the detail-phase artifact
pub fn write_records(path: &Path, records: &RecordStore) -> Result<()> {
    write_pretty(path, records.as_map())
}

/// Loads a `list.json` document
pub fn load_links(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Loads a `data.json` document
pub fn load_records(path: &Path) -> Result<BTreeMap<String, DetailRecord>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
