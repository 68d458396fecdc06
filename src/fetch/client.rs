// src/fetch/client.rs
// =============================================================================
// This module performs the actual HTTP GET requests.
//
// Key functionality:
// - One GET per address, redirects followed automatically
// - Reports the *final* URL after redirects (links on the page must be
//   resolved against where we ended up, not where we asked to go)
// - Configurable timeout, optional upstream proxy, optional TLS bypass
// - Custom User-Agent plus Connection: close (one connection per request)
//
// Rust concepts:
// - async/await: For network I/O
// - Result<T, E>: For error handling
// - Builder pattern: reqwest's ClientBuilder
// =============================================================================

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONNECTION};
use reqwest::Client;
use std::time::Duration;

// The User-Agent we announce ourselves with
const USER_AGENT: &str = "Mozilla/5.0 (linkhound)";

// A fetched page, reduced to what the traversal engine needs
#[derive(Debug, Clone)]
pub struct Page {
    /// HTTP status code (200, 404, ...)
    pub status: u16,
    /// The effective URL after any redirects were followed
    pub final_url: String,
    /// Value of the Content-Type response header, if any
    pub content_type: Option<String>,
    /// Response body decoded as text
    pub body: String,
}

// The transport seam: anything that can turn an address into a Page.
//
// The traversal engine is generic over this trait, so tests can swap in a
// fake that serves pages from a HashMap.
#[async_trait]
pub trait Fetcher {
    async fn get(&self, url: &str) -> Result<Page>;
}

// Settings for building the real HTTP client
#[derive(Debug, Clone, Default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Optional upstream proxy URL (e.g. a Burp listener)
    pub proxy: Option<String>,
    /// Disable TLS certificate verification (useful behind an
    /// intercepting proxy)
    pub insecure: bool,
}

// The production Fetcher, backed by reqwest
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the HTTP client from the given settings
    //
    // Redirect following is reqwest's default policy (up to 10 hops),
    // which is exactly what we want: the maze may redirect us around.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        // One connection per request; we crawl slowly and sequentially
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs));

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .with_context(|| format!("Invalid proxy URL '{}'", proxy_url))?;
            builder = builder.proxy(proxy);
        }

        if config.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Page> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to fetch {}: {}", url, e))?;

        let status = response.status().as_u16();
        // Capture the post-redirect URL before the response is consumed
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read body of {}: {}", url, e))?;

        Ok(Page {
            status,
            final_url,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default_client() {
        let config = FetchConfig {
            timeout_secs: 10,
            ..Default::default()
        };
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[test]
    fn test_build_with_proxy() {
        let config = FetchConfig {
            timeout_secs: 10,
            proxy: Some("http://127.0.0.1:8080".to_string()),
            insecure: true,
        };
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[test]
    fn test_reject_bad_proxy_url() {
        let config = FetchConfig {
            timeout_secs: 10,
            proxy: Some("not a url".to_string()),
            insecure: false,
        };
        assert!(HttpFetcher::new(&config).is_err());
    }
}
