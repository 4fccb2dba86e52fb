use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User agent sent when the configured one is empty
pub const DEFAULT_USER_AGENT: &str = "ThreatCrawler/3.0";

/// Request timeout literal applied when none is configured
pub const DEFAULT_TIMEOUT: &str = "30s";

/// Crawl configuration
///
/// Immutable once the crawl starts. The serde field names match the JSON
/// configuration mode, so a config object can be read from a file or stdin
/// and echoed back verbatim in the batch envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Starting URL to crawl
    pub target_url: String,

    /// Maximum crawl depth; depth 0 fetches the seed only
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of records to emit
    #[serde(rename = "max_links", default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-request timeout as a duration literal (e.g. "30s")
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Number of concurrent workers
    #[serde(rename = "max_concurrency", default = "default_workers")]
    pub workers: usize,

    /// User agent string sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accepted for interface compatibility; currently not enforced
    #[serde(default)]
    pub respect_robots: bool,
}

fn default_max_depth() -> usize {
    3
}

fn default_max_pages() -> usize {
    100
}

fn default_timeout() -> String {
    DEFAULT_TIMEOUT.to_string()
}

fn default_workers() -> usize {
    10
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl CrawlConfig {
    /// Returns the per-request timeout
    ///
    /// An unparsable timeout literal falls back to 30 seconds rather than
    /// failing the crawl.
    pub fn request_timeout(&self) -> Duration {
        parse_duration(&self.timeout).unwrap_or(Duration::from_secs(30))
    }
}

/// Parses a duration literal of the form `<value><unit>`
///
/// Accepted units are `ms`, `s`, `m`, and `h`; the value may be an integer
/// or a decimal (e.g. `"250ms"`, `"30s"`, `"1.5m"`).
///
/// # Arguments
///
/// * `input` - The literal to parse
///
/// # Returns
///
/// * `Some(Duration)` - Successfully parsed duration
/// * `None` - The literal is malformed
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    let unit_start = input.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    let (value, unit) = input.split_at(unit_start);
    let value: f64 = value.parse().ok()?;

    let seconds = match unit {
        "ms" => value / 1000.0,
        "s" => value,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => return None,
    };

    Duration::try_from_secs_f64(seconds).ok()
}
