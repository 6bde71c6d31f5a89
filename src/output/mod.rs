//! Output module for crawl results
//!
//! This module handles:
//! - The console report (one line per invalid link, then `TIME`)
//! - Crawl statistics
//! - Optional markdown summaries

mod markdown;
mod report;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::{format_invalid_link, write_report};
pub use stats::{log_statistics, CrawlStats};
