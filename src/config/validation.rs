use crate::config::types::CrawlConfig;
use crate::{ConfigError, ConfigResult};

/// Validates a crawl configuration
///
/// # Validation Rules
///
/// - `target_url` must not be empty
/// - `max_links` must be greater than zero
/// - `max_concurrency` must be greater than zero
/// - `timeout` must not be empty (an unparsable literal is tolerated and
///   falls back to the default at request time)
///
/// `max_depth` needs no check: the type rules out negative values, and a
/// depth of zero is a valid seed-only crawl.
///
/// # Arguments
///
/// * `config` - The configuration to validate
///
/// # Returns
///
/// * `Ok(())` - The configuration is valid
/// * `Err(ConfigError::Validation)` - A rule was violated
pub fn validate(config: &CrawlConfig) -> ConfigResult<()> {
    if config.target_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "target_url must not be empty".to_string(),
        ));
    }

    if config.max_pages == 0 {
        return Err(ConfigError::Validation(
            "max_links must be greater than zero".to_string(),
        ));
    }

    if config.workers == 0 {
        return Err(ConfigError::Validation(
            "max_concurrency must be greater than zero".to_string(),
        ));
    }

    if config.timeout.trim().is_empty() {
        return Err(ConfigError::Validation(
            "timeout must not be empty".to_string(),
        ));
    }

    Ok(())
}
