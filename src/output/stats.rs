//! Crawl statistics
//!
//! Counters gathered while the crawl runs, condensed into a plain struct
//! once the scheduler reaches quiescence.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Same-host pages fetched with status 200 and expanded for links
    pub pages_expanded: u64,

    /// Same-host pages fetched with status 200 but not HTML
    pub non_html_pages: u64,

    /// Links extracted across all expanded pages, duplicates included
    pub links_found: u64,

    /// Distinct addresses scheduled (the root included)
    pub urls_visited: u64,

    /// GET requests issued (one per same-host address)
    pub get_requests: u64,

    /// HEAD requests issued (one per other-host address)
    pub head_requests: u64,

    /// Links recorded as invalid
    pub invalid_links: u64,

    /// Invalid links that never got an HTTP response
    pub network_failures: u64,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStats {
    /// Elapsed time in whole milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Requests of either method issued during the crawl
    pub fn total_requests(&self) -> u64 {
        self.get_requests + self.head_requests
    }

    /// Share of requests that produced an invalid link, in percent
    pub fn failure_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            (self.invalid_links as f64 / total as f64) * 100.0
        }
    }
}

/// Writes statistics to the log at info level
///
/// Statistics never go to stdout, which is reserved for the report.
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn log_statistics(stats: &CrawlStats) {
    tracing::info!(
        "Crawl finished in {} ms: {} pages expanded, {} non-HTML pages, {} links found",
        stats.elapsed_ms(),
        stats.pages_expanded,
        stats.non_html_pages,
        stats.links_found
    );
    tracing::info!(
        "Requests: {} GET, {} HEAD across {} distinct addresses",
        stats.get_requests,
        stats.head_requests,
        stats.urls_visited
    );
    tracing::info!(
        "Invalid links: {} ({} network failures, {:.1}% of requests)",
        stats.invalid_links,
        stats.network_failures,
        stats.failure_rate()
    );
}
