//! Catalog domain types
//!
//! This module defines the catalog partitions and the two stores a crawl run
//! produces:
//!
//! - `LinkStore`: name→link map built by the list phase, with duplicate
//!   tracking (the site reuses display names)
//! - `RecordStore`: derived-key→record map built by the detail phase

mod link_store;
mod record_store;

pub use link_store::LinkStore;
pub use record_store::{DetailRecord, RecordStore};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three catalog partitions, crawled independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Body,
    Face,
    Hair,
}

impl Category {
    /// Returns the lowercase name used in URLs, paths, and artifacts
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Body => "body",
            Category::Face => "face",
            Category::Hair => "hair",
        }
    }

    /// All categories, in crawl order
    pub fn all() -> [Category; 3] {
        [Category::Body, Category::Face, Category::Hair]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "body" => Ok(Category::Body),
            "face" => Ok(Category::Face),
            "hair" => Ok(Category::Hair),
            other => Err(format!(
                "invalid category '{}' (expected body, face or hair)",
                other
            )),
        }
    }
}
