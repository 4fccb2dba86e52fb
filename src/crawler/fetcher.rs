//! HTTP fetcher
//!
//! A single shared client performs one GET per claimed URL. The fetcher
//! never fails its caller: transport errors (DNS, connect, TLS, read,
//! cancellation mid-request) are embedded in the returned record with a
//! zero status, and non-2xx responses are ordinary records.

use crate::config::{CrawlConfig, DEFAULT_USER_AGENT};
use crate::crawler::parser::{extract_links, extract_title};
use crate::crawler::record::FetchRecord;
use crate::url::partition_links;
use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Performs single GET requests over a shared connection pool
pub struct Fetcher {
    client: Client,
    user_agent: String,
}

impl Fetcher {
    /// Creates a fetcher with a shared HTTP client
    ///
    /// The pool keeps up to 10 idle connections per host and drops idle
    /// connections after 30 seconds; a default cookie store is enabled and
    /// the transport handles decompression. The per-request deadline comes
    /// from the configured timeout literal, and an empty configured user
    /// agent falls back to the default.
    ///
    /// # Returns
    ///
    /// * `Ok(Fetcher)` - Ready to fetch
    /// * `Err(reqwest::Error)` - The client could not be constructed
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .build()?;

        let user_agent = if config.user_agent.is_empty() {
            DEFAULT_USER_AGENT.to_string()
        } else {
            config.user_agent.clone()
        };

        Ok(Fetcher { client, user_agent })
    }

    /// Fetches a single page and returns a fully populated record
    ///
    /// Cancellation mid-request yields a transport-failure record, the same
    /// shape a DNS or connect error produces. The caller never sees an
    /// `Err` from this method.
    pub async fn fetch_page(&self, cancel: &CancellationToken, url: &str) -> FetchRecord {
        tokio::select! {
            _ = cancel.cancelled() => {
                FetchRecord::failure(url, "Request failed: crawl cancelled".to_string())
            }
            record = self.fetch_inner(url) => record,
        }
    }

    async fn fetch_inner(&self, url: &str) -> FetchRecord {
        let request = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Connection", "keep-alive")
            .header("User-Agent", &self.user_agent);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return FetchRecord::failure(url, format!("Request failed: {}", e)),
        };

        let status = response.status().as_u16();
        let headers = flatten_headers(response.headers());

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let mut record =
                    FetchRecord::failure(url, format!("Failed to read response: {}", e));
                record.status = status;
                record.headers = headers;
                return record;
            }
        };

        let title = extract_title(&body);
        let links = extract_links(&body, url);
        let (internal_links, external_links) = partition_links(&links, url);

        FetchRecord {
            url: url.to_string(),
            status,
            title,
            depth: 0,
            discovered_at: Utc::now(),
            headers,
            links,
            internal_links,
            external_links,
            error: String::new(),
        }
    }
}

/// Flattens a header map into lowercased names with ", "-joined values
fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut flattened = HashMap::new();

    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ");
        flattened.insert(name.as_str().to_string(), joined);
    }

    flattened
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn test_config(timeout: &str, user_agent: &str) -> CrawlConfig {
        CrawlConfig {
            target_url: "http://example.com/".to_string(),
            max_depth: 3,
            max_pages: 100,
            timeout: timeout.to_string(),
            workers: 10,
            user_agent: user_agent.to_string(),
            respect_robots: false,
        }
    }

    #[test]
    fn test_new_fetcher() {
        let fetcher = Fetcher::new(&test_config("30s", "TestCrawler/1.0"));
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_empty_user_agent_falls_back_to_default() {
        let fetcher = Fetcher::new(&test_config("30s", "")).unwrap();
        assert_eq!(fetcher.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_configured_user_agent_kept() {
        let fetcher = Fetcher::new(&test_config("30s", "TestCrawler/1.0")).unwrap();
        assert_eq!(fetcher.user_agent, "TestCrawler/1.0");
    }

    #[test]
    fn test_unparsable_timeout_still_builds() {
        assert!(Fetcher::new(&test_config("whenever", "TestCrawler/1.0")).is_ok());
    }

    #[test]
    fn test_flatten_single_valued_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("text/html"),
        );

        let flattened = flatten_headers(&headers);
        assert_eq!(flattened.get("content-type").map(String::as_str), Some("text/html"));
    }

    #[test]
    fn test_flatten_joins_multi_valued_headers() {
        let mut headers = HeaderMap::new();
        headers.append(
            HeaderName::from_static("set-cookie"),
            HeaderValue::from_static("a=1"),
        );
        headers.append(
            HeaderName::from_static("set-cookie"),
            HeaderValue::from_static("b=2"),
        );

        let flattened = flatten_headers(&headers);
        assert_eq!(flattened.get("set-cookie").map(String::as_str), Some("a=1, b=2"));
    }

    #[tokio::test]
    async fn test_pre_cancelled_fetch_is_transport_failure() {
        let fetcher = Fetcher::new(&test_config("30s", "TestCrawler/1.0")).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let record = fetcher.fetch_page(&cancel, "http://example.com/").await;

        assert_eq!(record.status, 0);
        assert!(!record.error.is_empty());
        assert!(record.links.is_empty());
    }
}
