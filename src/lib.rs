//! Costume Atlas: a two-phase catalog crawler
//!
//! This crate crawls a paginated fashion-item catalog in two phases: a list
//! phase that discovers name→link pairs across an initially unknown number of
//! index pages, and a detail phase that fetches every item page, extracts a
//! structured record, and downloads its image. Each category run persists a
//! `list.json` and a `data.json` plus the downloaded images.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Costume Atlas operations
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Fatal page-structure errors
///
/// Any of these aborts the whole run: a page whose expected DOM structure is
/// absent means the site layout changed, and continuing would only collect
/// garbage. Transport failures are NOT in this class; those are logged and
/// absorbed into the phase counters.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("List page {page} has no pagination footer")]
    ListPagerMissing { page: u32 },

    #[error("List page {page} has no item table")]
    ListItemsMissing { page: u32 },

    #[error("List page {page} item {index} is missing its name/link cell")]
    ListItemMalformed { page: u32, index: usize },

    #[error("Detail page of \"{name}\" has no info panel")]
    DetailPanelMissing { name: String },

    #[error("Detail page of \"{name}\" has no image element")]
    DetailImageMissing { name: String },

    #[error("No numeric code in image filename \"{pic}\" of \"{name}\"")]
    CodeMissing { name: String, pic: String },
}

/// Result type alias for Costume Atlas operations
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{Category, DetailRecord, LinkStore, RecordStore};
pub use config::Config;
pub use crawler::run_crawl;
