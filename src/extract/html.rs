// src/extract/html.rs
// =============================================================================
// This module extracts same-site links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// A link counts as "same-site" when its href is an absolute path:
//   "/wiki/GitHub"          -> kept
//   "//upload.wikimedia.org" -> dropped (protocol-relative, another host)
//   "https://github.com"    -> dropped (absolute URL)
//   "GitHub" / "#History"   -> dropped (relative)
//
// Fragments are stripped so "/wiki/Git#History" and "/wiki/Git" are the
// same page.
// =============================================================================

use scraper::{Html, Selector};

use super::LinkExtractor;
use crate::error::ConfigError;

pub struct HtmlLinkExtractor {
    selector: Selector,
    /// Only keep links starting with this (e.g. "/wiki/")
    prefix: Option<String>,
}

impl HtmlLinkExtractor {
    pub fn new(prefix: Option<String>) -> Result<Self, ConfigError> {
        // Select all <a> tags that have an href attribute
        let selector =
            Selector::parse("a[href]").map_err(|e| ConfigError::Selector(e.to_string()))?;

        Ok(Self { selector, prefix })
    }

    pub fn extract_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        document
            .select(&self.selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| self.normalize(href))
            .collect()
    }

    // Returns the site-relative link for `href`, or None if it isn't one
    fn normalize(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if !href.starts_with('/') || href.starts_with("//") {
            return None;
        }

        let link = match href.find('#') {
            Some(idx) => &href[..idx],
            None => href,
        };
        if link.is_empty() {
            return None;
        }

        if let Some(prefix) = &self.prefix {
            if !link.starts_with(prefix.as_str()) {
                return None;
            }
        }

        Some(link.to_string())
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, body: &[u8]) -> Vec<String> {
        // Wiki pages are UTF-8; anything else is decoded lossily rather than dropped
        self.extract_links(&String::from_utf8_lossy(body))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why store the Selector in the struct?
//    - Parsing "a[href]" every time a page comes in is wasted work
//    - Selector::parse can fail, so new() returns a Result instead of
//      panicking somewhere deep inside a worker thread
//
// 2. What is String::from_utf8_lossy?
//    - Turns bytes into text, replacing invalid UTF-8 with '\u{FFFD}'
//    - Returns a Cow<str>: no copy at all when the bytes were valid
//
// 3. What does filter_map do?
//    - Runs a closure that returns Option<T>
//    - Keeps the Some(..) values and skips the None ones
// -----------------------------------------------------------------------------
