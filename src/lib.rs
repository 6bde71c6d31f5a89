//! Linkspider: a site-local broken-link crawler
//!
//! This crate crawls every page under a base `http://` address, extracts the
//! hyperlinks each page carries, and reports every link that fails to resolve
//! together with the page and line it was found on. It speaks HTTP/1.x
//! directly over TCP rather than through a client library.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;
pub mod wire;

use thiserror::Error;

/// Main error type for Linkspider operations
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Invalid base address '{0}': expected an http address ending in '/'")]
    InvalidBaseAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Link normalization errors
///
/// None of these are ever reported to the user: a link that fails to
/// normalize is dropped from the crawl.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("'..' climbs above the root of {0}")]
    Underflow(String),

    #[error("Malformed link: {0}")]
    Malformed(String),

    #[error("Unsupported scheme in link: {0}")]
    UnsupportedScheme(String),
}

/// Errors raised while talking HTTP over a socket
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Failed to connect to {host}: {source}")]
    Connect {
        host: String,
        source: std::io::Error,
    },

    #[error("Connection to {host} timed out")]
    ConnectTimeout { host: String },

    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed before the response was complete")]
    UnexpectedEof,

    #[error("Malformed status line: {0:?}")]
    MalformedStatusLine(String),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Malformed chunk size line: {0:?}")]
    MalformedChunk(String),

    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    #[error("Invalid request target: {0}")]
    InvalidTarget(String),
}

impl WireError {
    /// Whether a fresh connection might succeed where this one failed
    ///
    /// Failures that happen after a socket was established (resets, early
    /// EOF, garbage on a stale pooled connection) are retryable. Connect and
    /// DNS failures are not: a second attempt would hit the same wall.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::UnexpectedEof
                | Self::MalformedStatusLine(_)
                | Self::MalformedHeader(_)
                | Self::MalformedChunk(_)
        )
    }
}

/// Result type alias for Linkspider operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for wire operations
pub type WireResult<T> = std::result::Result<T, WireError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, InvalidLink, Link};
pub use url::{normalize, resolve};
pub use wire::{Header, Page, WireClient};
