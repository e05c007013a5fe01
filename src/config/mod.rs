//! Configuration module for Costume Atlas
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use costume_atlas::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Detail concurrency: {}", config.crawler.max_concurrent_detail_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CategoryUrls, Config, CrawlerConfig, HttpConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
