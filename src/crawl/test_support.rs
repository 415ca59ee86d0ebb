// src/crawl/test_support.rs
// In-memory stand-ins for the fetcher and extractor, used by the crawl tests.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::FetchError;
use crate::extract::LinkExtractor;
use crate::fetch::PageFetcher;

/// Serves a fixed link graph; a page's body is its out-links, one per line
#[derive(Default)]
pub struct GraphFetcher {
    pages: HashMap<String, Vec<String>>,
    scripted: Mutex<HashMap<String, VecDeque<FetchError>>>,
    counts: Mutex<HashMap<String, usize>>,
    delay: Duration,
}

impl GraphFetcher {
    pub fn new(edges: &[(&str, &[&str])]) -> Self {
        let pages = edges
            .iter()
            .map(|(page, links)| {
                (
                    page.to_string(),
                    links.iter().map(|l| l.to_string()).collect(),
                )
            })
            .collect();

        Self {
            pages,
            ..Self::default()
        }
    }

    /// The next `times` fetches of `page` fail with `error`
    pub fn fail(self, page: &str, times: usize, error: FetchError) -> Self {
        self.scripted
            .lock()
            .entry(page.to_string())
            .or_default()
            .extend(std::iter::repeat(error).take(times));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetch_count(&self, page: &str) -> usize {
        self.counts.lock().get(page).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> HashMap<String, usize> {
        self.counts.lock().clone()
    }

    pub fn links_of(&self, page: &str) -> &[String] {
        self.pages.get(page).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl PageFetcher for GraphFetcher {
    fn fetch(&self, target: &str) -> Result<Vec<u8>, FetchError> {
        *self.counts.lock().entry(target.to_string()).or_insert(0) += 1;

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        if let Some(error) = self
            .scripted
            .lock()
            .get_mut(target)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }

        match self.pages.get(target) {
            Some(links) => Ok(links.join("\n").into_bytes()),
            None => Err(FetchError::Permanent("HTTP 404".to_string())),
        }
    }
}

/// Treats every non-empty line of the body as a link
pub struct LineExtractor;

impl LinkExtractor for LineExtractor {
    fn extract(&self, body: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(body)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Polls `condition` until it holds or two seconds pass
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
