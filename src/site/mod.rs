//! URL layout of the harvested site
//!
//! Listing pages live at `<base><listing-path><page>`. Articles are linked
//! from listings as `<path>.<id>#comments`; the article itself is the path
//! without the fragment, and comment page `n` is `<path>,<n>`.

use crate::config::SiteConfig;
use url::Url;

/// Fragment marking a comment link on a listing page
pub const COMMENTS_FRAGMENT: &str = "#comments";

/// Resolves listing and article URLs against the site root
#[derive(Debug, Clone)]
pub struct SiteLayout {
    base: Url,
    listing_path: String,
}

impl SiteLayout {
    /// Builds the layout from configuration
    pub fn new(config: &SiteConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(&config.base_url)?,
            listing_path: config.listing_path.clone(),
        })
    }

    /// URL of a numbered listing page
    pub fn listing_url(&self, page: u32) -> Result<Url, url::ParseError> {
        self.base.join(&format!("{}{}", self.listing_path, page))
    }

    /// URL of an article's first page, from its index URL
    pub fn article_url(&self, index_url: &str) -> Result<Url, url::ParseError> {
        self.base.join(&article_path(index_url))
    }

    /// URL of one numbered comment page of an article
    pub fn comment_page_url(&self, index_url: &str, page: u32) -> Result<Url, url::ParseError> {
        self.base
            .join(&format!("{},{}", article_path(index_url), page))
    }
}

/// Strips surrounding whitespace and the `#comments` fragment
fn article_path(index_url: &str) -> String {
    index_url.trim().replace(COMMENTS_FRAGMENT, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SiteLayout {
        SiteLayout::new(&SiteConfig {
            base_url: "https://www.example.bg".to_string(),
            listing_path: "/news.php?last&cat=1&page=".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_listing_url() {
        assert_eq!(
            layout().listing_url(3).unwrap().as_str(),
            "https://www.example.bg/news.php?last&cat=1&page=3"
        );
    }

    #[test]
    fn test_article_url_drops_fragment() {
        assert_eq!(
            layout()
                .article_url("/world/2024/05/06/title.612345#comments\n")
                .unwrap()
                .as_str(),
            "https://www.example.bg/world/2024/05/06/title.612345"
        );
    }

    #[test]
    fn test_comment_page_url() {
        assert_eq!(
            layout()
                .comment_page_url("/world/title.612345#comments", 2)
                .unwrap()
                .as_str(),
            "https://www.example.bg/world/title.612345,2"
        );
    }

    #[test]
    fn test_base_with_path_uses_absolute_article_paths() {
        let layout = SiteLayout::new(&SiteConfig {
            base_url: "http://127.0.0.1:8080/mirror/".to_string(),
            listing_path: "/news.php?page=".to_string(),
        })
        .unwrap();

        assert_eq!(
            layout.article_url("/a/b.1#comments").unwrap().as_str(),
            "http://127.0.0.1:8080/a/b.1"
        );
    }
}
