use super::PageSource;
use crate::error::FetchError;
use anyhow::Context;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use thirtyfour::prelude::*;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// How often the page is polled while waiting for network activity to settle.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Consecutive quiet polls required before the page counts as idle.
const IDLE_QUIET_POLLS: u32 = 2;

const READY_STATE_SCRIPT: &str =
    "return [document.readyState, performance.getEntriesByType('resource').length];";

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// WebDriver endpoint (e.g. a local chromedriver).
    pub webdriver_url: String,
    /// Ceiling for navigation plus the network-idle wait.
    pub navigation_timeout: Duration,
    /// Extra wait after idle for client-side rendering.
    pub settle_delay: Duration,
}

/// Renders pages in a headless Chrome driven over WebDriver.
///
/// A browser session is opened per fetch and always closed before `fetch`
/// returns, whatever happened while rendering.
pub struct BrowserSource {
    settings: BrowserSettings,
}

impl BrowserSource {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    async fn open(&self) -> anyhow::Result<WebDriver> {
        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless()?;
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        caps.add_arg("--disable-gpu")?;
        caps.add_arg("--window-size=1920,1080")?;

        WebDriver::new(self.settings.webdriver_url.as_str(), caps)
            .await
            .with_context(|| format!("failed to connect to WebDriver at {}", self.settings.webdriver_url))
    }

    async fn render(&self, driver: &WebDriver, url: &str) -> Result<String, FetchError> {
        let ceiling = self.settings.navigation_timeout;
        time::timeout(ceiling, async {
            driver
                .goto(url)
                .await
                .context("navigation failed")
                .map_err(FetchError::Browser)?;
            wait_for_network_idle(driver).await
        })
        .await
        .map_err(|_| FetchError::Timeout {
            url: url.to_owned(),
            seconds: ceiling.as_secs(),
        })??;

        time::sleep(self.settings.settle_delay).await;

        driver
            .source()
            .await
            .context("failed to read rendered page source")
            .map_err(FetchError::Browser)
    }
}

#[async_trait]
impl PageSource for BrowserSource {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let driver = self.open().await.map_err(FetchError::Browser)?;
        debug!(url, "Browser session opened");

        let outcome = AssertUnwindSafe(self.render(&driver, url))
            .catch_unwind()
            .await;

        if let Err(e) = driver.quit().await {
            warn!(url, error = %e, "Failed to close browser session");
        }

        match outcome {
            Ok(result) => result,
            Err(_) => Err(FetchError::Browser(anyhow::anyhow!(
                "renderer panicked while loading {url}"
            ))),
        }
    }
}

/// Wait until the document has loaded and no new resources have been
/// requested for [`IDLE_QUIET_POLLS`] consecutive polls.
async fn wait_for_network_idle(driver: &WebDriver) -> Result<(), FetchError> {
    let start = Instant::now();
    let mut last_count: Option<u64> = None;
    let mut quiet = 0;

    loop {
        let ret = driver
            .execute(READY_STATE_SCRIPT, Vec::new())
            .await
            .context("failed to query document state")
            .map_err(FetchError::Browser)?;

        let state = ret.json();
        let complete = state[0].as_str() == Some("complete");
        let count = state[1].as_u64().unwrap_or(0);

        if complete && last_count == Some(count) {
            quiet += 1;
        } else {
            quiet = 0;
        }
        last_count = Some(count);

        trace!(complete, resources = count, quiet, "Polled page state");
        if quiet >= IDLE_QUIET_POLLS {
            debug!(elapsed = ?start.elapsed(), "Page reached network idle");
            return Ok(());
        }

        time::sleep(IDLE_POLL_INTERVAL).await;
    }
}
