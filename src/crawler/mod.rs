//! Crawler module for link discovery and validation
//!
//! This module contains the core crawling logic, including:
//! - Link and invalid-link records
//! - Lazy link extraction from page bodies
//! - Shared crawl state (visited set, invalid links, counters)
//! - Bounded task scheduling with quiescence detection
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod link;
mod scheduler;
mod state;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, CrawlTask, TaskKind};
pub use extractor::{extract_links, LinkExtractor};
pub use link::{InvalidLink, Link, NETWORK_FAILURE, ROOT_REFERRER};
pub use scheduler::{default_max_concurrency, Scheduler, SchedulerHandle};
pub use state::{CrawlCounters, InvalidLinks, VisitedSet};
