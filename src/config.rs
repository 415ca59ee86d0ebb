// src/config.rs
// =============================================================================
// Settings for a crawl run, filled in from the command line (see cli.rs).
//
// - CrawlConfig: worker pool sizes and the fetch retry policy
// - FetcherConfig: where pages come from and how long to wait for them
//
// Defaults mirror a polite Wikipedia crawl: 8 fetchers, 4 parsers.
// =============================================================================

use std::time::Duration;

use crate::crawl::RetryPolicy;
use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
pub const DEFAULT_SOURCE: &str = "/wiki/Main_Page";
pub const DEFAULT_DESTINATION: &str = "/wiki/Eggplant";

#[derive(Debug, Clone, PartialEq)]
pub struct CrawlConfig {
    /// Parallel page downloads (the crawl's only admission-control knob)
    pub fetch_workers: usize,
    pub parse_workers: usize,
    pub retry: RetryPolicy,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            fetch_workers: 8,
            parse_workers: 4,
            retry: RetryPolicy::default(),
        }
    }
}

impl CrawlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_workers == 0 {
            return Err(ConfigError::ZeroWorkers { stage: "fetch" });
        }
        if self.parse_workers == 0 {
            return Err(ConfigError::ZeroWorkers { stage: "parse" });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetcherConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// Checks that `path` looks like "/wiki/GitHub"
//
// Must start with exactly one slash: "//host/x" is protocol-relative and
// points at another site.
pub fn validate_site_path(path: &str) -> Result<(), ConfigError> {
    if path.starts_with('/') && !path.starts_with("//") && !path.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSitePath(path.to_string()))
    }
}
