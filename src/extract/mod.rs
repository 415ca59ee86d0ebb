// src/extract/mod.rs
// =============================================================================
// This module is the "link extractor" collaborator of the crawler.
//
// The crawler only depends on the LinkExtractor trait: hand it a page body,
// get back the same-site links on that page, in document order.
//
// Submodules:
// - html: extracts <a href="/..."> links with the scraper crate
// =============================================================================

mod html;

pub use html::HtmlLinkExtractor;

// Pulls same-site link identifiers out of a page body
//
// Shared by every parse worker, hence Send + Sync.
pub trait LinkExtractor: Send + Sync {
    fn extract(&self, body: &[u8]) -> Vec<String>;
}
