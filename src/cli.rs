// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   wikirace                          (default: /wiki/Main_Page -> /wiki/Eggplant)
//   wikirace /wiki/GitHub /wiki/Rust  (your own pair)
//
// The two positionals come as a pair: giving only one, or three, is a usage
// error, and clap exits with status 2 before any crawling starts.
//
// Rust concepts:
// - Derive macros: clap generates the parser from the struct
// - Option<T>: positionals that may be left out
// - value_parser: reject bad paths while parsing, not later
// =============================================================================

use clap::Parser;
use std::time::Duration;

use crate::config::{
    validate_site_path, CrawlConfig, FetcherConfig, DEFAULT_BASE_URL, DEFAULT_DESTINATION,
    DEFAULT_SOURCE,
};
use crate::crawl::RetryPolicy;
use crate::error::ConfigError;

#[derive(Parser, Debug)]
#[command(
    name = "wikirace",
    version,
    about = "Find a chain of links between two wiki articles",
    long_about = "wikirace crawls a wiki breadth-first, with a pool of fetch threads and a pool of \
                  parse threads, until it finds a page that links to the destination."
)]
pub struct Cli {
    /// Article to start from (e.g. /wiki/GitHub)
    #[arg(requires = "destination", value_parser = parse_site_path)]
    pub source: Option<String>,

    /// Article to reach (e.g. /wiki/Rust)
    #[arg(value_parser = parse_site_path)]
    pub destination: Option<String>,

    /// Site the paths are relative to
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Number of page-download threads
    #[arg(long, default_value_t = 8)]
    pub fetch_workers: usize,

    /// Number of link-extraction threads
    #[arg(long, default_value_t = 4)]
    pub parse_workers: usize,

    /// Retries for a page after a network error or 5xx
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    /// Wait before the first retry; doubles on each further retry
    #[arg(long, default_value_t = 250)]
    pub retry_backoff_ms: u64,

    /// Per-request timeout
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Only follow links starting with this prefix (e.g. /wiki/)
    #[arg(long)]
    pub link_prefix: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE)
    }

    pub fn destination(&self) -> &str {
        self.destination.as_deref().unwrap_or(DEFAULT_DESTINATION)
    }

    pub fn crawl_config(&self) -> CrawlConfig {
        let defaults = RetryPolicy::default();
        CrawlConfig {
            fetch_workers: self.fetch_workers,
            parse_workers: self.parse_workers,
            retry: RetryPolicy {
                max_retries: self.max_retries,
                initial_backoff: Duration::from_millis(self.retry_backoff_ms),
                ..defaults
            },
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..FetcherConfig::default()
        }
    }
}

fn parse_site_path(value: &str) -> Result<String, ConfigError> {
    validate_site_path(value)?;
    Ok(value.to_string())
}
