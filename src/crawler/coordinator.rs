//! Crawler coordinator - main crawl orchestration logic
//!
//! Every unit of work is a `CrawlTask`:
//! - `Expand` fetches a same-host page with GET, records it if it fails,
//!   and schedules a task for every newly seen link on it
//! - `Check` validates an other-host link with HEAD and never looks
//!   at its content
//!
//! Tasks run on the bounded scheduler until quiescence; the invalid links
//! collected by then are the crawl's result.

use crate::config::{validate_base_address, Config};
use crate::crawler::extractor::extract_links;
use crate::crawler::link::{InvalidLink, Link};
use crate::crawler::scheduler::{Scheduler, SchedulerHandle};
use crate::crawler::state::{CrawlCounters, InvalidLinks, VisitedSet};
use crate::output::CrawlStats;
use crate::wire::WireClient;
use crate::SpiderError;
use std::sync::Arc;
use std::time::Instant;

/// What a task does with its link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// GET the target and, if it is a 200 HTML page, follow its links
    Expand,
    /// HEAD the target and record it if it is not 200
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub kind: TaskKind,
    pub link: Link,
}

impl CrawlTask {
    pub fn expand(link: Link) -> Self {
        Self {
            kind: TaskKind::Expand,
            link,
        }
    }

    pub fn check(link: Link) -> Self {
        Self {
            kind: TaskKind::Check,
            link,
        }
    }
}

/// Outcome of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Invalid links in the order they were recorded
    pub invalid_links: Vec<InvalidLink>,
    pub stats: CrawlStats,
}

/// State shared by every task of one crawl
struct CrawlContext {
    base_address: String,
    client: WireClient,
    visited: VisitedSet,
    invalid: InvalidLinks,
    counters: CrawlCounters,
}

impl CrawlContext {
    async fn process(&self, task: CrawlTask, handle: &SchedulerHandle<CrawlTask>) {
        match task.kind {
            TaskKind::Expand => self.expand(task.link, handle).await,
            TaskKind::Check => self.check(task.link).await,
        }
    }

    /// Fetches a same-host page and schedules its unseen links
    async fn expand(&self, link: Link, handle: &SchedulerHandle<CrawlTask>) {
        tracing::debug!("GET {}", link.target);
        CrawlCounters::increment(&self.counters.get_requests);

        let page = match self.client.get(&link.target).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("GET {} failed: {}", link.target, e);
                self.record(InvalidLink::network_failure(link));
                return;
            }
        };

        if page.status() != 200 {
            self.record(InvalidLink::new(link, page.status()));
            return;
        }

        if !page.is_html() {
            tracing::debug!(
                "Not expanding {} ({})",
                link.target,
                page.header.content_type.as_deref().unwrap_or_default()
            );
            CrawlCounters::increment(&self.counters.non_html_pages);
            return;
        }

        CrawlCounters::increment(&self.counters.pages_expanded);

        let mut found = 0;
        let mut scheduled = 0;
        for candidate in extract_links(page.body(), &link.target) {
            found += 1;

            if !self.visited.try_add(&candidate.target) {
                continue;
            }
            scheduled += 1;

            if candidate.target.starts_with(&self.base_address) {
                handle.submit(CrawlTask::expand(candidate));
            } else {
                handle.submit(CrawlTask::check(candidate));
            }
        }

        CrawlCounters::add(&self.counters.links_found, found);
        tracing::debug!(
            "Expanded {}: {} links, {} new",
            link.target,
            found,
            scheduled
        );
    }

    /// Validates an other-host link without reading its content
    async fn check(&self, link: Link) {
        tracing::debug!("HEAD {}", link.target);
        CrawlCounters::increment(&self.counters.head_requests);

        match self.client.head(&link.target).await {
            Ok(header) if header.status == 200 => {
                tracing::trace!("{} is valid", link.target);
            }
            Ok(header) => self.record(InvalidLink::new(link, header.status)),
            Err(e) => {
                tracing::warn!("HEAD {} failed: {}", link.target, e);
                self.record(InvalidLink::network_failure(link));
            }
        }
    }

    fn record(&self, invalid: InvalidLink) {
        tracing::warn!(
            "Invalid link {} ({:03}) on {} line {}",
            invalid.link.target,
            invalid.status,
            invalid.link.page_url,
            invalid.link.line
        );
        self.invalid.push(invalid);
    }

    fn stats(&self, invalid_links: &[InvalidLink], started: Instant) -> CrawlStats {
        CrawlStats {
            pages_expanded: CrawlCounters::get(&self.counters.pages_expanded),
            non_html_pages: CrawlCounters::get(&self.counters.non_html_pages),
            links_found: CrawlCounters::get(&self.counters.links_found),
            urls_visited: self.visited.len() as u64,
            get_requests: CrawlCounters::get(&self.counters.get_requests),
            head_requests: CrawlCounters::get(&self.counters.head_requests),
            invalid_links: invalid_links.len() as u64,
            network_failures: invalid_links
                .iter()
                .filter(|invalid| invalid.is_network_failure())
                .count() as u64,
            elapsed: started.elapsed(),
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    base_address: String,
    config: Config,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `base_address` - The `http://` address to crawl, ending in `/`
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - The address is a valid crawl root
    /// * `Err(SpiderError::InvalidBaseAddress)` - It is not
    pub fn new(base_address: &str, config: Config) -> Result<Self, SpiderError> {
        let base_address = validate_base_address(base_address)?;
        Ok(Self {
            base_address,
            config,
        })
    }

    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    /// Runs the crawl to quiescence
    ///
    /// Individual failures are recorded in the report, never returned: once
    /// the coordinator exists, a crawl always completes.
    pub async fn run(self) -> CrawlReport {
        let started = Instant::now();

        let context = Arc::new(CrawlContext {
            base_address: self.base_address.clone(),
            client: WireClient::new(self.config.wire.clone()),
            visited: VisitedSet::new(),
            invalid: InvalidLinks::new(),
            counters: CrawlCounters::default(),
        });

        let scheduler = Scheduler::new(self.config.crawler.max_concurrency)
            .with_progress_interval(self.config.crawler.progress_interval);

        tracing::info!(
            "Starting crawl of {} (concurrency cap {})",
            self.base_address,
            scheduler.max_concurrency()
        );

        let root = Link::root(&self.base_address);
        context.visited.try_add(&root.target);
        scheduler.submit(CrawlTask::expand(root));

        let task_context = Arc::clone(&context);
        let tasks_run = scheduler
            .run(move |task, handle| {
                let context = Arc::clone(&task_context);
                async move { context.process(task, &handle).await }
            })
            .await;

        tracing::debug!("Scheduler drained after {} tasks", tasks_run);

        let invalid_links = context.invalid.snapshot();
        let stats = context.stats(&invalid_links, started);

        CrawlReport {
            invalid_links,
            stats,
        }
    }
}

/// Validates `base_address` and crawls it
///
/// # Arguments
///
/// * `base_address` - The `http://` address to crawl, ending in `/`
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(SpiderError)` - The base address was rejected
pub async fn run_crawl(base_address: &str, config: Config) -> Result<CrawlReport, SpiderError> {
    let coordinator = Coordinator::new(base_address, config)?;
    Ok(coordinator.run().await)
}
