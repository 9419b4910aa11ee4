//! Page retrieval with a two-tier strategy.
//!
//! A plain HTTP GET is tried first; when it fails the page is rendered in a
//! headless browser. Both tiers sit behind [`PageSource`] so the pipeline can
//! be driven without a network.

mod browser;
mod http;

pub use browser::{BrowserSettings, BrowserSource};
pub use http::HttpSource;

use crate::error::FetchError;
use crate::utils::log_if_slow;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const SLOW_FETCH_THRESHOLD: Duration = Duration::from_secs(10);

/// Something that can turn a URL into markup.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Primary source with an optional fallback renderer.
pub struct ContentFetcher {
    primary: Box<dyn PageSource>,
    fallback: Option<Box<dyn PageSource>>,
}

impl ContentFetcher {
    pub fn new(primary: Box<dyn PageSource>, fallback: Option<Box<dyn PageSource>>) -> Self {
        Self { primary, fallback }
    }

    /// Fetch markup for `url`.
    ///
    /// Returns an empty string when every tier fails; callers treat that as
    /// "no data" for the record.
    pub async fn fetch(&self, url: &str) -> String {
        let start = Instant::now();
        let primary_err = match self.primary.fetch(url).await {
            Ok(body) => {
                debug!(url, source = self.primary.name(), bytes = body.len(), "Fetched page");
                log_if_slow(start, SLOW_FETCH_THRESHOLD, url);
                return body;
            }
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            warn!(url, error = %primary_err, "Fetch failed and no fallback is configured");
            return String::new();
        };

        info!(url, error = %primary_err, fallback = fallback.name(), "Direct fetch failed, trying fallback");
        let body = match fallback.fetch(url).await {
            Ok(body) => {
                debug!(url, source = fallback.name(), bytes = body.len(), "Fetched page");
                body
            }
            Err(e) => {
                warn!(url, error = ?anyhow::Error::from(e), "Fallback fetch failed");
                String::new()
            }
        };
        log_if_slow(start, SLOW_FETCH_THRESHOLD, url);
        body
    }
}
