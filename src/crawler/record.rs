use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header name carrying the URL of the page that led to a record
pub const PARENT_URL_HEADER: &str = "Parent-URL";

/// A unit of work in the crawl queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    /// URL to fetch
    pub url: String,

    /// Hop count from the seed along the chain that discovered this URL
    pub depth: usize,

    /// URL of the page this item was discovered on; empty only for the seed
    pub parent: String,
}

/// One record per completed fetch attempt
///
/// Transport failures are data, not errors: `status` is 0 and `error`
/// carries the message. Link lists are always present and empty when
/// nothing was discovered. The parent URL travels in the
/// [`PARENT_URL_HEADER`] header entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRecord {
    /// The fetched URL as it was claimed from the queue
    pub url: String,

    /// HTTP status code; 0 on transport failure
    pub status: u16,

    /// Page title, or the `"No Title"` placeholder
    pub title: String,

    /// Crawl depth at which this page was fetched
    pub depth: usize,

    /// When this record was constructed
    pub discovered_at: DateTime<Utc>,

    /// Response headers, lowercased names with multi-values ", "-joined
    pub headers: HashMap<String, String>,

    /// All links discovered on the page, first-seen order, deduplicated
    pub links: Vec<String>,

    /// Links sharing the page's site host
    pub internal_links: Vec<String>,

    /// Links pointing off-site
    pub external_links: Vec<String>,

    /// Transport error message; empty on success
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl FetchRecord {
    /// Builds a transport-failure record for `url`
    pub fn failure(url: &str, message: String) -> Self {
        FetchRecord {
            url: url.to_string(),
            status: 0,
            title: String::new(),
            depth: 0,
            discovered_at: Utc::now(),
            headers: HashMap::new(),
            links: Vec::new(),
            internal_links: Vec::new(),
            external_links: Vec::new(),
            error: message,
        }
    }

    /// Returns the parent URL carried in the headers, if set
    pub fn parent_url(&self) -> Option<&str> {
        self.headers.get(PARENT_URL_HEADER).map(String::as_str)
    }
}
