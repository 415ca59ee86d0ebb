// src/error.rs
// =============================================================================
// Error types for the crawler.
//
// main.rs uses anyhow for "just report it" errors, but the crawler internals
// return typed errors so callers can react to them:
// - ConfigError: bad settings caught before any thread is started
// - FetchError: a page could not be downloaded (transient vs permanent)
// - CrawlError: something went wrong with the worker threads themselves
// =============================================================================

use thiserror::Error;

/// Invalid settings, detected before the crawl starts
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A worker pool was configured with zero threads
    #[error("{stage} worker pool must have at least one thread")]
    ZeroWorkers { stage: &'static str },

    /// The base URL could not be parsed
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A source/destination path is not a site-relative path
    #[error("'{0}' is not a site-relative path (expected something like /wiki/GitHub)")]
    InvalidSitePath(String),

    /// The CSS selector used for link extraction did not parse
    #[error("invalid link selector: {0}")]
    Selector(String),

    /// The HTTP client could not be built
    #[error("could not build HTTP client: {0}")]
    HttpClient(String),
}

/// Why a single page fetch failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Worth retrying (timeout, connection reset, 5xx, 429)
    #[error("transient fetch error: {0}")]
    Transient(String),

    /// Retrying will not help (404, bad URL, ...)
    #[error("permanent fetch error: {0}")]
    Permanent(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}

/// Failures of the crawl machinery itself
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The OS refused to start a worker thread
    #[error("failed to spawn worker '{name}': {source}")]
    WorkerSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked before it could be joined
    #[error("worker '{name}' panicked")]
    WorkerPanicked { name: String },
}
