//! Configuration module for the enrichment tool.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `ENRICH_`-prefixed environment variables. Nested keys use a double
//! underscore: `ENRICH_BROWSER__WEBDRIVER_URL`.

use crate::fetch::BrowserSettings;
use anyhow::{Context, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read when `--config` is not given; silently skipped if absent.
pub const DEFAULT_CONFIG_FILE: &str = "enrich.toml";

const ENV_PREFIX: &str = "ENRICH_";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level for this crate's targets; `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Internal competitor roster CSV
    pub roster_path: PathBuf,
    /// Institution/program → URL mapping store
    pub mapping_path: PathBuf,
    pub output_dir: PathBuf,
    pub output_prefix: String,
    /// Minimum spacing between page fetches in per-record mode
    #[serde(with = "duration")]
    pub politeness_delay: Duration,
    /// Minimum spacing between page fetches in bulk mode
    #[serde(with = "duration")]
    pub bulk_delay: Duration,
    /// Timeout for the direct HTTP fetch
    #[serde(with = "duration")]
    pub http_timeout: Duration,
    pub user_agent: String,
    pub browser: BrowserConfig,
}

/// Headless browser fallback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub enabled: bool,
    pub webdriver_url: String,
    /// Ceiling for navigation plus waiting for network idle
    #[serde(with = "duration")]
    pub navigation_timeout: Duration,
    /// Extra wait after network idle for client-side rendering
    #[serde(with = "duration")]
    pub settle_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            roster_path: PathBuf::from("data/pilot_competitor_list.csv"),
            mapping_path: PathBuf::from("data/urlMapping.json"),
            output_dir: PathBuf::from("data"),
            output_prefix: "external_competitors".to_string(),
            politeness_delay: Duration::from_secs(1),
            bulk_delay: Duration::from_millis(2500),
            http_timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser: BrowserConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            webdriver_url: "http://localhost:9515".to_string(),
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(2),
        }
    }
}

impl BrowserConfig {
    /// Settings for the browser source, or `None` when the fallback is disabled.
    pub fn settings(&self) -> Option<BrowserSettings> {
        self.enabled.then(|| BrowserSettings {
            webdriver_url: self.webdriver_url.clone(),
            navigation_timeout: self.navigation_timeout,
            settle_delay: self.settle_delay,
        })
    }
}

impl Config {
    /// Load configuration, reading `file` (or [`DEFAULT_CONFIG_FILE`] when it exists).
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let toml = match file {
            Some(path) if !path.exists() => bail!("config file {} does not exist", path.display()),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        Self::extract(
            Self::base()
                .merge(Toml::file(&toml))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
        .with_context(|| format!("failed to load configuration (file: {})", toml.display()))
    }

    /// Defaults only; further providers are merged on top.
    pub fn base() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    pub fn extract(figment: Figment) -> anyhow::Result<Self> {
        Ok(figment.extract::<Config>()?)
    }
}

/// Serde adapter for human-readable durations (`"1s"`, `"2500ms"`, `"2m"`).
///
/// Bare numbers are seconds.
pub mod duration {
    use fundu::DurationParser;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;
    use std::time::Duration;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = value.as_millis();
        if millis % 1000 == 0 {
            serializer.serialize_str(&format!("{}s", millis / 1000))
        } else {
            serializer.serialize_str(&format!("{millis}ms"))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DurationVisitor)
    }

    /// Parse a duration string the way config values are parsed.
    pub fn parse(raw: &str) -> Result<Duration, String> {
        let parsed = DurationParser::with_all_time_units()
            .parse(raw.trim())
            .map_err(|e| format!("invalid duration '{raw}': {e}"))?;
        parsed
            .try_into()
            .map_err(|e| format!("invalid duration '{raw}': {e}"))
    }

    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a duration such as \"1s\" or \"2500ms\", or a number of seconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            parse(v).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("duration cannot be negative"))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Duration, E> {
            Duration::try_from_secs_f64(v).map_err(E::custom)
        }
    }
}
