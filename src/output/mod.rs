//! Output module for the record stream and the batch envelope
//!
//! Streaming mode writes one compact JSON object per record as pages
//! complete; batch mode collects everything and wraps it with the config,
//! aggregate statistics, and a completion timestamp. Exactly one of the two
//! is active on a given invocation.

mod stream;
mod summary;

pub use stream::{write_output, write_record};
pub use summary::{CrawlOutput, CrawlSummary};
