use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use reqwest::header::HeaderValue;
use url::Url;

/// Longest pause allowed between comment page fetches (milliseconds)
const MAX_PAGE_DELAY_LIMIT: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site layout
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if config.listing_path.is_empty() {
        return Err(ConfigError::Validation(
            "listing_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates traversal configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_start < 1 {
        return Err(ConfigError::Validation(format!(
            "page_start must be >= 1, got {}",
            config.page_start
        )));
    }

    if config.page_end < config.page_start {
        return Err(ConfigError::Validation(format!(
            "page_end ({}) must be >= page_start ({})",
            config.page_end, config.page_start
        )));
    }

    if config.min_page_delay > config.max_page_delay {
        return Err(ConfigError::Validation(format!(
            "min_page_delay ({}ms) must not exceed max_page_delay ({}ms)",
            config.min_page_delay, config.max_page_delay
        )));
    }

    if config.max_page_delay > MAX_PAGE_DELAY_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_page_delay must be <= {}ms, got {}ms",
            MAX_PAGE_DELAY_LIMIT, config.max_page_delay
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout == 0 {
        return Err(ConfigError::Validation(
            "timeout must be at least 1 second".to_string(),
        ));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one entry".to_string(),
        ));
    }

    if config.user_agents.iter().any(|agent| agent.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain empty entries".to_string(),
        ));
    }

    if HeaderValue::from_str(&config.accept_language).is_err() {
        return Err(ConfigError::Validation(format!(
            "accept_language is not a valid header value: {:?}",
            config.accept_language
        )));
    }

    if let Some(proxy) = &config.proxy_url {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("progress_path", &config.progress_path),
        ("article_index_path", &config.article_index_path),
        ("comments_path", &config.comments_path),
    ] {
        if path.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.article_index_path == config.comments_path {
        return Err(ConfigError::Validation(
            "article_index_path and comments_path must differ".to_string(),
        ));
    }

    Ok(())
}
