use crate::config::CrawlConfig;
use crate::crawler::FetchRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Aggregate statistics over a finished crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    /// Number of records emitted
    pub total_pages: usize,

    /// Records with HTTP status 200
    pub successful: usize,

    /// Records with any other status, including transport failures
    pub failed: usize,

    /// Total same-site links discovered across all records
    pub internal_links: usize,

    /// Total cross-site links discovered across all records
    pub external_links: usize,

    /// Deepest depth at which a record was emitted
    pub max_depth_reached: usize,

    /// Wall-clock crawl duration in nanoseconds
    #[serde(rename = "duration")]
    pub duration_ns: u64,
}

impl CrawlSummary {
    /// Computes summary statistics over the emitted records
    pub fn from_records(records: &[FetchRecord], duration: Duration) -> Self {
        let mut successful = 0;
        let mut failed = 0;
        let mut internal_links = 0;
        let mut external_links = 0;
        let mut max_depth_reached = 0;

        for record in records {
            if record.status == 200 {
                successful += 1;
            } else {
                failed += 1;
            }
            internal_links += record.internal_links.len();
            external_links += record.external_links.len();
            max_depth_reached = max_depth_reached.max(record.depth);
        }

        CrawlSummary {
            total_pages: records.len(),
            successful,
            failed,
            internal_links,
            external_links,
            max_depth_reached,
            duration_ns: duration.as_nanos().min(u128::from(u64::MAX)) as u64,
        }
    }
}

/// Batch-mode envelope wrapping a whole crawl
///
/// The streaming mode emits records one per line instead; the two modes are
/// never active on the same invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlOutput {
    /// The configuration the crawl ran with
    pub config: CrawlConfig,

    /// Every emitted record, in emission order
    pub results: Vec<FetchRecord>,

    /// Aggregate statistics over `results`
    pub summary: CrawlSummary,

    /// When the crawl completed
    pub timestamp: DateTime<Utc>,
}

impl CrawlOutput {
    /// Wraps collected records into the batch envelope
    pub fn new(config: CrawlConfig, results: Vec<FetchRecord>, duration: Duration) -> Self {
        let summary = CrawlSummary::from_records(&results, duration);

        CrawlOutput {
            config,
            results,
            summary,
            timestamp: Utc::now(),
        }
    }
}
