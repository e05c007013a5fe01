//! Output module for persisted artifacts, reports, and consistency checks
//!
//! This module handles:
//! - Writing and reading the per-category JSON artifacts
//! - Summarizing a completed crawl run
//! - Checking artifact consistency (images on disk, list-name coverage)

mod json;
mod report;

pub use json::{load_links, load_records, write_links, write_records, ArtifactPaths};
pub use report::{
    check_images, check_names, print_image_check, print_name_check, print_report,
    CrawlReport, ImageCheckReport, NameCheckReport,
};
