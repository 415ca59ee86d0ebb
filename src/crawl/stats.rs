// src/crawl/stats.rs
// Counters shared by all workers of one crawl run.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_fetched: AtomicU64,
    fetch_retries: AtomicU64,
    fetch_failures: AtomicU64,
    pages_parsed: AtomicU64,
    links_seen: AtomicU64,
    links_claimed: AtomicU64,
}

/// Plain copy of the counters, taken once the run is over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub pages_fetched: u64,
    pub fetch_retries: u64,
    pub fetch_failures: u64,
    pub pages_parsed: u64,
    pub links_seen: u64,
    pub links_claimed: u64,
}

impl CrawlStats {
    pub fn record_fetch(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.fetch_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse(&self, links: usize) {
        self.pages_parsed.fetch_add(1, Ordering::Relaxed);
        self.links_seen.fetch_add(links as u64, Ordering::Relaxed);
    }

    pub fn record_claim(&self) {
        self.links_claimed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_retries: self.fetch_retries.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            pages_parsed: self.pages_parsed.load(Ordering::Relaxed),
            links_seen: self.links_seen.load(Ordering::Relaxed),
            links_claimed: self.links_claimed.load(Ordering::Relaxed),
        }
    }
}
