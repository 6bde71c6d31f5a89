//! Shared crawl state
//!
//! These are the only structures mutated by more than one task. Each
//! exposes a single atomic operation per mutation; nothing hands out a
//! guard that could be held across an await point.

use crate::crawler::link::InvalidLink;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Addresses that have already been scheduled
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url`, returning true only for the first insertion
    ///
    /// Test and insert happen under one lock, so concurrent callers racing
    /// on the same address see exactly one `true` between them.
    pub fn try_add(&self, url: &str) -> bool {
        let mut urls = self.urls.lock().unwrap_or_else(|e| e.into_inner());
        if urls.contains(url) {
            false
        } else {
            urls.insert(url.to_string())
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        let urls = self.urls.lock().unwrap_or_else(|e| e.into_inner());
        urls.contains(url)
    }

    pub fn len(&self) -> usize {
        let urls = self.urls.lock().unwrap_or_else(|e| e.into_inner());
        urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append-only collection of the links found to be broken
#[derive(Debug, Default)]
pub struct InvalidLinks {
    links: Mutex<Vec<InvalidLink>>,
}

impl InvalidLinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, invalid: InvalidLink) {
        let mut links = self.links.lock().unwrap_or_else(|e| e.into_inner());
        links.push(invalid);
    }

    pub fn len(&self) -> usize {
        let links = self.links.lock().unwrap_or_else(|e| e.into_inner());
        links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the collection, returning links in insertion order
    pub fn into_vec(self) -> Vec<InvalidLink> {
        self.links.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    /// Copies the links recorded so far, in insertion order
    pub fn snapshot(&self) -> Vec<InvalidLink> {
        let links = self.links.lock().unwrap_or_else(|e| e.into_inner());
        links.clone()
    }
}

/// Request and page counters for the statistics report
#[derive(Debug, Default)]
pub struct CrawlCounters {
    pub get_requests: AtomicU64,
    pub head_requests: AtomicU64,
    pub pages_expanded: AtomicU64,
    pub links_found: AtomicU64,
    pub non_html_pages: AtomicU64,
}

impl CrawlCounters {
    pub fn increment(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, amount: u64) {
        counter.fetch_add(amount, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
