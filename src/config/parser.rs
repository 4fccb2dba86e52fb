use crate::config::types::CrawlConfig;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::io::Read;
use std::path::Path;

/// Loads and parses a JSON configuration file from the given path
///
/// Missing fields receive the same defaults as the command-line flags.
///
/// # Arguments
///
/// * `path` - Path to the JSON configuration file
///
/// # Returns
///
/// * `Ok(CrawlConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use threat_crawler::config::load_config;
///
/// let config = load_config(Path::new("crawl.json")).unwrap();
/// println!("Crawling {} to depth {}", config.target_url, config.max_depth);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<CrawlConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Reads a JSON configuration object from any reader (e.g. standard input)
pub fn read_config<R: Read>(mut reader: R) -> ConfigResult<CrawlConfig> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse_config(&content)
}

/// Parses and validates a JSON configuration string
pub fn parse_config(content: &str) -> ConfigResult<CrawlConfig> {
    let config: CrawlConfig = serde_json::from_str(content)?;
    validate(&config)?;
    Ok(config)
}
