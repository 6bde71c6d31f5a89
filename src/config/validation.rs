use crate::config::types::{Config, CrawlerConfig, OutputConfig, WireConfig};
use crate::{ConfigError, SpiderError};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static BASE_ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^http://[^'" ]+/$"#).expect("Invalid base address pattern"));

const MAX_CONCURRENCY_LIMIT: usize = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_wire_config(&config.wire)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrency > MAX_CONCURRENCY_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 0 (auto) and {}, got {}",
            MAX_CONCURRENCY_LIMIT, config.max_concurrency
        )));
    }

    Ok(())
}

/// Validates wire configuration
fn validate_wire_config(config: &WireConfig) -> Result<(), ConfigError> {
    if config.port == 0 {
        return Err(ConfigError::Validation("port cannot be 0".to_string()));
    }

    if config.connect_timeout < 100 || config.connect_timeout > 120_000 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout must be between 100ms and 120000ms, got {}ms",
            config.connect_timeout
        )));
    }

    // A zero timeout would block forever on connections that never signal EOF
    if config.eof_read_timeout < 1 || config.eof_read_timeout > 60_000 {
        return Err(ConfigError::Validation(format!(
            "eof_read_timeout must be between 1ms and 60000ms, got {}ms",
            config.eof_read_timeout
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.summary_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the address a crawl starts from
///
/// The address must be an `http://` URL ending in `/`, free of quotes and
/// spaces, with a host. Surrounding whitespace is ignored.
///
/// # Returns
///
/// * `Ok(String)` - The trimmed base address
/// * `Err(SpiderError::InvalidBaseAddress)` - The address is unusable
///
/// # Examples
///
/// ```
/// use linkspider::config::validate_base_address;
///
/// assert!(validate_base_address("http://example.com/").is_ok());
/// assert!(validate_base_address("http://example.com").is_err());
/// assert!(validate_base_address("https://example.com/").is_err());
/// ```
pub fn validate_base_address(address: &str) -> Result<String, SpiderError> {
    let address = address.trim();

    if !BASE_ADDRESS_PATTERN.is_match(address) {
        return Err(SpiderError::InvalidBaseAddress(address.to_string()));
    }

    match Url::parse(address) {
        Ok(url) if url.host_str().is_some() => Ok(address.to_string()),
        _ => Err(SpiderError::InvalidBaseAddress(address.to_string())),
    }
}
