// src/fetch/mod.rs
// =============================================================================
// This module is the "page fetcher" collaborator of the crawler.
//
// The crawler only knows the PageFetcher trait: give it a site-relative
// path, get back the raw body or a FetchError saying whether retrying makes
// sense. HttpFetcher is the real implementation; tests plug in an
// in-memory graph instead.
//
// Submodules:
// - http: the reqwest-based fetcher
// =============================================================================

mod http;

pub use http::HttpFetcher;

use crate::error::FetchError;

// Downloads one page
//
// Called from fetch worker threads, so it is allowed to block. Must be
// Send + Sync because one fetcher is shared by every worker.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, target: &str) -> Result<Vec<u8>, FetchError>;
}
