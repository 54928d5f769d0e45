/// Page metadata fetching for bookmark enrichment
///
/// When a bookmark is created without a title, the server fetches the page
/// and extracts title/description/image from its HTML. The fetch is
/// best-effort by contract: any failure (non-2xx, timeout, network error,
/// unparseable HTML, even an unparseable URL) degrades to a fallback object
/// built from the URL's hostname. Nothing here ever errors outward.
///
/// The creation flow uses this twice: once synchronously to populate the
/// initial row, then again from a detached task that overwrites
/// title/description/cover once the page has been re-fetched.
///
/// The trait seam exists so tests can inject a canned fetcher instead of
/// touching the network.
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// User agent sent with metadata fetches
const USER_AGENT: &str = "Mozilla/5.0 (compatible; LinkstashBot/1.0)";

/// Fetch timeout; a slow page shouldn't hold a creation request hostage
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Metadata extracted from a page, or the hostname fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Page title; falls back to the URL's hostname
    pub title: String,

    /// Page description, if the page declares one
    pub description: Option<String>,

    /// Preview image URL (og:image), if the page declares one
    pub image: Option<String>,

    /// Hostname of the fetched URL
    pub domain: Option<String>,

    /// The URL that was fetched
    pub url: String,
}

/// The metadata-fetching capability
///
/// Implemented by the real HTTP fetcher and by test stubs.
#[async_trait]
pub trait FetchMetadata: Send + Sync {
    /// Fetches metadata for a URL; never fails, always returns a best-effort
    /// object
    async fn fetch(&self, url: &str) -> PageMetadata;
}

/// Production fetcher: HTTP GET with timeout, then HTML extraction
pub struct HttpMetadataFetcher {
    client: reqwest::Client,
}

impl HttpMetadataFetcher {
    /// Creates a fetcher with the standard timeout and user agent
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { client }
    }
}

impl Default for HttpMetadataFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchMetadata for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> PageMetadata {
        match self.try_fetch(url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!(url, error = %e, "Metadata fetch failed, using fallback");
                fallback_metadata(url)
            }
        }
    }
}

impl HttpMetadataFetcher {
    async fn try_fetch(&self, url: &str) -> Result<PageMetadata, anyhow::Error> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("http {}", response.status());
        }

        let html = response.text().await?;
        Ok(extract_metadata(&html, url))
    }
}

/// Derives the hostname from a URL string
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

/// Builds the fallback object used whenever fetching or parsing fails
pub fn fallback_metadata(url: &str) -> PageMetadata {
    let host = hostname(url);

    PageMetadata {
        title: host.clone().unwrap_or_else(|| url.to_string()),
        description: None,
        image: None,
        domain: host,
        url: url.to_string(),
    }
}

/// Extracts title/description/image from page HTML
///
/// Preference order: og: properties over plain tags, hostname when neither
/// yields anything. Kept synchronous so the parsed DOM never crosses an
/// await point.
pub fn extract_metadata(html: &str, url: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let title = select_meta(&document, "meta[property=\"og:title\"]")
        .or_else(|| select_text(&document, "title"))
        .filter(|t| !t.is_empty());

    let description = select_meta(&document, "meta[property=\"og:description\"]")
        .or_else(|| select_meta(&document, "meta[name=\"description\"]"))
        .filter(|d| !d.is_empty());

    let image = select_meta(&document, "meta[property=\"og:image\"]").filter(|i| !i.is_empty());

    let host = hostname(url);

    PageMetadata {
        title: title.or_else(|| host.clone()).unwrap_or_else(|| url.to_string()),
        description,
        image,
        domain: host,
        url: url.to_string(),
    }
}

fn select_meta(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_full_page() {
        let html = r#"
            <html><head>
                <title>Plain Title</title>
                <meta property="og:title" content="OG Title">
                <meta name="description" content="A plain description">
                <meta property="og:image" content="https://example.com/img.png">
            </head><body></body></html>
        "#;

        let meta = extract_metadata(html, "https://example.com/post");
        assert_eq!(meta.title, "OG Title");
        assert_eq!(meta.description.as_deref(), Some("A plain description"));
        assert_eq!(meta.image.as_deref(), Some("https://example.com/img.png"));
        assert_eq!(meta.domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_extract_prefers_og_description() {
        let html = r#"
            <html><head>
                <meta property="og:description" content="og desc">
                <meta name="description" content="plain desc">
            </head></html>
        "#;

        let meta = extract_metadata(html, "https://example.com");
        assert_eq!(meta.description.as_deref(), Some("og desc"));
    }

    #[test]
    fn test_extract_falls_back_to_title_tag() {
        let html = "<html><head><title>  Only Title  </title></head></html>";

        let meta = extract_metadata(html, "https://example.com");
        assert_eq!(meta.title, "Only Title");
        assert!(meta.description.is_none());
        assert!(meta.image.is_none());
    }

    #[test]
    fn test_extract_empty_page_uses_hostname() {
        let meta = extract_metadata("<html></html>", "https://blog.example.com/x");
        assert_eq!(meta.title, "blog.example.com");
        assert_eq!(meta.domain.as_deref(), Some("blog.example.com"));
    }

    #[test]
    fn test_fallback_metadata() {
        let meta = fallback_metadata("https://unreachable.example.com/page");
        assert_eq!(meta.title, "unreachable.example.com");
        assert_eq!(meta.domain.as_deref(), Some("unreachable.example.com"));
        assert!(meta.description.is_none());
        assert!(meta.image.is_none());
        assert_eq!(meta.url, "https://unreachable.example.com/page");
    }

    #[test]
    fn test_fallback_metadata_unparseable_url() {
        let meta = fallback_metadata("not a url");
        assert_eq!(meta.title, "not a url");
        assert!(meta.domain.is_none());
    }

    #[test]
    fn test_hostname() {
        assert_eq!(hostname("https://example.com/a/b"), Some("example.com".into()));
        assert_eq!(hostname("nonsense"), None);
    }

    #[tokio::test]
    async fn test_fetcher_unreachable_host_returns_fallback() {
        // Reserved TLD, guaranteed unresolvable.
        let fetcher = HttpMetadataFetcher::new();
        let meta = fetcher.fetch("https://linkstash-test.invalid/page").await;

        assert_eq!(meta.title, "linkstash-test.invalid");
        assert_eq!(meta.domain.as_deref(), Some("linkstash-test.invalid"));
        assert!(meta.description.is_none());
        assert!(meta.image.is_none());
    }
}
