use serde::Deserialize;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site layout
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL that article and listing paths are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Listing path; the page number is appended to it
    #[serde(rename = "listing-path", default = "default_listing_path")]
    pub listing_path: String,
}

/// Traversal behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First listing page to visit when no later checkpoint exists
    #[serde(rename = "page-start", default = "default_page_start")]
    pub page_start: u32,

    /// Last listing page to visit (inclusive)
    #[serde(rename = "page-end", default = "default_page_end")]
    pub page_end: u32,

    /// Articles need strictly more comments than this to be indexed
    #[serde(rename = "comment-threshold", default = "default_comment_threshold")]
    pub comment_threshold: u32,

    /// Lower bound of the pause before each comment page fetch (milliseconds)
    #[serde(rename = "min-page-delay", default)]
    pub min_page_delay: u64,

    /// Upper bound of the pause before each comment page fetch (milliseconds)
    #[serde(rename = "max-page-delay", default = "default_max_page_delay")]
    pub max_page_delay: u64,

    /// Extra attempts for timeouts, transport errors and 5xx/429 responses
    #[serde(rename = "max-retries", default)]
    pub max_retries: u32,

    /// Delay between retry attempts (milliseconds)
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: u64,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// User agents to pick from, one per run
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Accept-Language header value
    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    /// Route requests through a proxy
    #[serde(rename = "use-proxy", default)]
    pub use_proxy: bool,

    /// Proxy endpoint; falls back to the proxy environment variables when unset
    #[serde(rename = "proxy-url", default)]
    pub proxy_url: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON checkpoint file
    #[serde(rename = "progress-path", default = "default_progress_path")]
    pub progress_path: String,

    /// Path to the article index CSV
    #[serde(rename = "article-index-path", default = "default_article_index_path")]
    pub article_index_path: String,

    /// Path to the comments CSV
    #[serde(rename = "comments-path", default = "default_comments_path")]
    pub comments_path: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_start: default_page_start(),
            page_end: default_page_end(),
            comment_threshold: default_comment_threshold(),
            min_page_delay: 0,
            max_page_delay: default_max_page_delay(),
            max_retries: 0,
            retry_delay: default_retry_delay(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agents: default_user_agents(),
            accept_language: default_accept_language(),
            use_proxy: false,
            proxy_url: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            progress_path: default_progress_path(),
            article_index_path: default_article_index_path(),
            comments_path: default_comments_path(),
        }
    }
}

fn default_listing_path() -> String {
    "/news.php?last&cat=1&page=".to_string()
}

fn default_page_start() -> u32 {
    1
}

fn default_page_end() -> u32 {
    5
}

fn default_comment_threshold() -> u32 {
    5
}

fn default_max_page_delay() -> u64 {
    2000
}

fn default_retry_delay() -> u64 {
    5000
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0".to_string(),
    ]
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9,bg;q=0.8,de;q=0.7".to_string()
}

fn default_progress_path() -> String {
    "progress.json".to_string()
}

fn default_article_index_path() -> String {
    "output/article_list.csv".to_string()
}

fn default_comments_path() -> String {
    "output/comment_list.csv".to_string()
}
