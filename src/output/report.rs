//! Crawl reports and consistency checks
//!
//! The crawl report summarizes one category run. The consistency checks are
//! the operator's window into the known data-quality properties of the
//! catalog: images that failed to transfer, and list names that are absent
//! from `data.json` because distinct display names collapsed to the same
//! derived key.

use crate::catalog::{Category, DetailRecord};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;

/// Summary of one category's completed crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub category: Category,
    pub pages_crawled: u32,
    pub items_seen: u64,
    pub duplicate_items: u64,
    pub links_collected: usize,
    pub list_fetch_failures: u64,
    pub detail_total: usize,
    pub detail_finished: usize,
    pub detail_fetch_failures: u64,
    pub image_failures: u64,
    pub soft_issues: u64,
    pub records_collected: usize,
    pub finished_at: DateTime<Utc>,
}

/// Prints a crawl report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl of category '{}' ===", report.category);
    println!("List pages crawled:    {}", report.pages_crawled);
    println!("Items seen on pages:   {}", report.items_seen);
    println!("Duplicated items:      {}", report.duplicate_items);
    println!("Links collected:       {}", report.links_collected);
    println!("List fetch failures:   {}", report.list_fetch_failures);
    println!(
        "Detail pages fetched:  {} / {}",
        report.detail_finished, report.detail_total
    );
    println!("Detail fetch failures: {}", report.detail_fetch_failures);
    println!("Image failures:        {}", report.image_failures);
    println!("Soft data issues:      {}", report.soft_issues);
    println!("Records collected:     {}", report.records_collected);
    println!("Finished at:           {}", report.finished_at.to_rfc3339());
}

/// Result of checking records against the downloaded images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCheckReport {
    pub total: usize,
    pub exists: usize,
    pub not_exist: usize,
    /// (record name, image URL) of each missing file
    pub missing: Vec<(String, String)>,
}

/// Checks that every record's image file exists in the pics directory
pub fn check_images(
    records: &BTreeMap<String, DetailRecord>,
    pics_dir: &Path,
) -> ImageCheckReport {
    let mut exists = 0;
    let mut not_exist = 0;
    let mut missing = Vec::new();

    for record in records.values() {
        if pics_dir.join(&record.pic).exists() {
            exists += 1;
        } else {
            not_exist += 1;
            missing.push((record.name.clone(), record.piclink.clone()));
        }
    }

    ImageCheckReport {
        total: records.len(),
        exists,
        not_exist,
        missing,
    }
}

/// Result of checking list names against collected records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCheckReport {
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    pub missing_names: Vec<String>,
}

/// Reports how many list names are absent from the records, by exact match
///
/// A non-zero result is expected: when two display names derive the same
/// record key, only the later one survives in `data.json`, so the earlier
/// name has no record carrying it.
pub fn check_names(
    links: &BTreeMap<String, String>,
    records: &BTreeMap<String, DetailRecord>,
) -> NameCheckReport {
    let mut found = 0;
    let mut missing_names = Vec::new();

    for name in links.keys() {
        if records.values().any(|record| record.name == *name) {
            found += 1;
        } else {
            missing_names.push(name.clone());
        }
    }

    NameCheckReport {
        total: links.len(),
        found,
        not_found: missing_names.len(),
        missing_names,
    }
}

/// Prints an image-check report to stdout
pub fn print_image_check(report: &ImageCheckReport) {
    println!("Check images count equals to data.json or not:");
    for (name, piclink) in &report.missing {
        println!("Image of \"{}\" does not exist! url: {}", name, piclink);
    }
    println!(
        "Total: {} , exists: {} , not exists: {}",
        report.total, report.exists, report.not_exist
    );
}

/// Prints a name-check report to stdout
pub fn print_name_check(report: &NameCheckReport) {
    println!("Check data.json count equals to list.json or not:");
    for name in &report.missing_names {
        println!("Link \"{}\" not found in data.json", name);
    }
    println!(
        "Total: {} , found: {} , not found: {}",
        report.total, report.found, report.not_found
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, pic: &str) -> DetailRecord {
        DetailRecord {
            name: name.to_string(),
            code: "60055".to_string(),
            col: "col2".to_string(),
            category: Category::Body,
            require: "全种族通用".to_string(),
            pic: pic.to_string(),
            piclink: format!("http://cdn.example.com/{}", pic),
            link: "http://cha.17173.com/bns/fashion/90099.html".to_string(),
        }
    }

    #[test]
    fn test_image_check_counts_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let mut records = BTreeMap::new();
        for i in 0..3 {
            let pic = format!("costume_{}_JinM_col1.png", 60000 + i);
            records.insert(format!("{}_JinM_col1", 60000 + i), record("x", &pic));
        }

        // Write all but one image
        std::fs::write(dir.path().join("costume_60000_JinM_col1.png"), b"png").unwrap();
        std::fs::write(dir.path().join("costume_60001_JinM_col1.png"), b"png").unwrap();

        let report = check_images(&records, dir.path());
        assert_eq!(report.total, 3);
        assert_eq!(report.exists, 2);
        assert_eq!(report.not_exist, 1);
        assert_eq!(report.missing.len(), 1);
    }

    #[test]
    fn test_name_check_reports_collapsed_names() {
        // Two list names whose records derived the same key: only the
        // survivor's name appears in data.json.
        let mut links = BTreeMap::new();
        links.insert("白色玫瑰".to_string(), "http://a/1.html".to_string());
        links.insert("白玫瑰".to_string(), "http://a/2.html".to_string());

        let mut records = BTreeMap::new();
        records.insert(
            "60055_JinM_col2".to_string(),
            record("白玫瑰", "costume_60055_JinM_col2.png"),
        );

        let report = check_names(&links, &records);
        assert_eq!(report.total, 2);
        assert_eq!(report.found, 1);
        assert_eq!(report.not_found, 1);
        assert_eq!(report.missing_names, vec!["白色玫瑰".to_string()]);
    }
}
