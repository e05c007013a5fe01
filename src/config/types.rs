use crate::catalog::Category;
use serde::Deserialize;

/// Main configuration structure for Costume Atlas
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
    pub categories: CategoryUrls,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of detail pages fetched concurrently
    #[serde(rename = "max-concurrent-detail-fetches")]
    pub max_concurrent_detail_fetches: u32,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User agent string sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Referer header sent when downloading images from the CDN
    #[serde(rename = "image-referer")]
    pub image_referer: String,

    /// Request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory under which per-category artifacts and images are written
    #[serde(rename = "database-dir")]
    pub database_dir: String,
}

/// Index-page URL for each catalog category
///
/// Each URL is the first list page of that category; further pages are the
/// same URL with a `&page=N` suffix.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryUrls {
    pub body: String,
    pub face: String,
    pub hair: String,
}

impl CategoryUrls {
    /// Returns the index URL for a category
    pub fn for_category(&self, category: Category) -> &str {
        match category {
            Category::Body => &self.body,
            Category::Face => &self.face,
            Category::Hair => &self.hair,
        }
    }
}
