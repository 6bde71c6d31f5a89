use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Linkspider
///
/// Every section is optional; a missing file or section means defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub wire: WireConfig,
    pub output: OutputConfig,
}

/// Crawl scheduling configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Cap on concurrently running tasks; 0 picks one from cores and free memory
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: usize,

    /// Completed tasks between progress log lines; 0 disables progress logging
    #[serde(rename = "progress-interval")]
    pub progress_interval: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 0,
            progress_interval: 50,
        }
    }
}

/// Socket-level configuration for the HTTP wire client
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// Port used for hosts that do not name one
    pub port: u16,

    /// Connect timeout (milliseconds)
    #[serde(rename = "connect-timeout")]
    pub connect_timeout: u64,

    /// Read timeout for bodies framed by neither length nor chunking (milliseconds)
    #[serde(rename = "eof-read-timeout")]
    pub eof_read_timeout: u64,

    /// Whether connections are kept open and reused between requests
    #[serde(rename = "keep-alive")]
    pub keep_alive: bool,

    /// Idle connections kept per host
    #[serde(rename = "max-idle-per-host")]
    pub max_idle_per_host: usize,
}

impl WireConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout)
    }

    pub fn eof_read_timeout(&self) -> Duration {
        Duration::from_millis(self.eof_read_timeout)
    }
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            port: 80,
            connect_timeout: 10_000,
            eof_read_timeout: 2_000,
            keep_alive: true,
            max_idle_per_host: 8,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the markdown summary written after the crawl, if any
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}
