// src/fetch/http.rs
// =============================================================================
// This module downloads wiki pages over HTTP.
//
// Key functionality:
// - Joins the site-relative path (e.g. /wiki/GitHub) onto the base URL
// - Uses reqwest's blocking client (we're on a worker thread, not in async)
// - Sorts every failure into Transient (retry it) or Permanent (give up)
//
// Rust concepts:
// - Traits: HttpFetcher implements the PageFetcher trait
// - Result<T, E>: For error handling
// - match: To categorize status codes and reqwest errors
// =============================================================================

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::trace;
use url::Url;

use super::PageFetcher;
use crate::config::FetcherConfig;
use crate::error::{ConfigError, FetchError};

pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    // Builds the HTTP client
    //
    // The client is reused for all requests (connection pooling), and the
    // timeout keeps one dead server from pinning a fetch worker forever.
    pub fn new(config: &FetcherConfig) -> Result<Self, ConfigError> {
        let base = Url::parse(&config.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client, base })
    }

    /// Absolute URL for a site-relative path
    pub fn url_for(&self, target: &str) -> Result<Url, FetchError> {
        self.base
            .join(target)
            .map_err(|e| FetchError::Permanent(format!("bad path '{}': {}", target, e)))
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, target: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(target)?;
        trace!(%url, "GET");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(categorize_error)?;

        if let Some(err) = classify_status(response.status()) {
            return Err(err);
        }

        let body = response.bytes().map_err(categorize_error)?;
        Ok(body.to_vec())
    }
}

// Decides what a non-success HTTP status means for the crawl
//
// HTTP status codes:
// - 200-299: Success (None)
// - 429 and 5xx: the server is busy or broken right now -> retry
// - everything else (404, 410, 403, ...): retrying won't help
pub(crate) fn classify_status(status: StatusCode) -> Option<FetchError> {
    if status.is_success() {
        None
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Some(FetchError::Transient(format!("HTTP {}", status.as_u16())))
    } else {
        Some(FetchError::Permanent(format!("HTTP {}", status.as_u16())))
    }
}

// Categorizes reqwest errors
//
// Network-level problems (timeouts, refused connections, truncated bodies)
// are transient; anything about the request itself is permanent.
fn categorize_error(error: reqwest::Error) -> FetchError {
    let message = error.to_string();

    if error.is_timeout() || error.is_connect() || error.is_body() || error.is_request() {
        FetchError::Transient(message)
    } else if error.is_redirect() {
        FetchError::Permanent(format!("too many redirects: {}", message))
    } else if error.is_decode() || error.is_builder() {
        FetchError::Permanent(message)
    } else {
        FetchError::Transient(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(base_url: &str) -> FetcherConfig {
        FetcherConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(1),
            ..FetcherConfig::default()
        }
    }

    #[test]
    fn test_url_for_joins_site_path() {
        let fetcher = HttpFetcher::new(&config("https://en.wikipedia.org")).unwrap();
        let url = fetcher.url_for("/wiki/GitHub").unwrap();
        assert_eq!(url.as_str(), "https://en.wikipedia.org/wiki/GitHub");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpFetcher::new(&config("not a url"));
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::OK), None);
        assert!(classify_status(StatusCode::SERVICE_UNAVAILABLE)
            .unwrap()
            .is_transient());
        assert!(classify_status(StatusCode::TOO_MANY_REQUESTS)
            .unwrap()
            .is_transient());
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND),
            Some(FetchError::Permanent("HTTP 404".to_string()))
        );
    }

    #[test]
    fn test_connection_refused_is_transient() {
        // Grab a free port, then close it again so the connect is refused
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let base = format!("http://127.0.0.1:{}", port);

        // No proxy, so a proxy from the environment can't answer instead
        let fetcher = HttpFetcher {
            client: Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(1))
                .build()
                .unwrap(),
            base: Url::parse(&base).unwrap(),
        };
        let err = fetcher.fetch("/wiki/Anything").unwrap_err();
        assert!(err.is_transient());
    }
}
