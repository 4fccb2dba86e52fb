//! Configuration module
//!
//! Handles the JSON configuration mode, shared defaults, and validation.
//! The command-line flags in the binary map onto the same [`CrawlConfig`]
//! structure, so both front-ends feed the engine identically.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use threat_crawler::config::load_config;
//!
//! let config = load_config(Path::new("crawl.json")).unwrap();
//! println!("Crawler will use {} workers", config.workers);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{load_config, parse_config, read_config};
pub use types::{parse_duration, CrawlConfig, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use validation::validate;
