use crate::config::types::{CategoryUrls, Config, CrawlerConfig, HttpConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_category_urls(&config.categories)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_detail_fetches < 1 || config.max_concurrent_detail_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_detail_fetches must be between 1 and 100, got {}",
            config.max_concurrent_detail_fetches
        )));
    }

    Ok(())
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.image_referer)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid image_referer: {}", e)))?;

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_dir.is_empty() {
        return Err(ConfigError::Validation(
            "database_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the per-category index URLs
fn validate_category_urls(categories: &CategoryUrls) -> Result<(), ConfigError> {
    for (name, url) in [
        ("body", &categories.body),
        ("face", &categories.face),
        ("hair", &categories.hair),
    ] {
        let parsed = Url::parse(url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} index URL: {}", name, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "{} index URL must be http(s), got '{}'",
                name, url
            )));
        }

        // Further list pages are addressed by appending "&page=N", so the
        // index URL must already carry a query string.
        if parsed.query().is_none() {
            return Err(ConfigError::Validation(format!(
                "{} index URL must contain a query string (page numbers are appended to it)",
                name
            )));
        }
    }

    Ok(())
}
