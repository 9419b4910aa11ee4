//! Error types for the enrichment pipeline.
//!
//! Record-level failures ([`FetchError`]) never escape the orchestrator; they
//! are logged and turned into empty scraped records. Run-level failures are
//! reported as a [`PipelineError`] naming the stage that failed.

use serde::Serialize;
use std::path::PathBuf;

/// Failure fetching markup for a single URL through one source.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("browser session failed")]
    Browser(#[source] anyhow::Error),
    #[error("timed out after {seconds}s waiting for {url}")]
    Timeout { url: String, seconds: u64 },
}

/// Failure persisting output artifacts.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to create output directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize JSON output")]
    Json(#[from] serde_json::Error),
    #[error("failed to serialize CSV output")]
    Csv(#[from] csv::Error),
}

/// Failure reading the internal roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("roster {path} is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Pipeline stage a run-level failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    CsvReading,
    Output,
    Unknown,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::CsvReading => "csv-reading",
            Stage::Output => "output",
            Stage::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run that produced no usable output.
#[derive(Debug, thiserror::Error)]
#[error("enrichment failed at stage `{stage}`: {message}")]
pub struct PipelineError {
    pub stage: Stage,
    pub message: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl PipelineError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(stage: Stage, source: impl Into<anyhow::Error>) -> Self {
        let source = source.into();
        Self {
            stage,
            message: format!("{source:#}"),
            source: Some(source),
        }
    }
}

impl From<RosterError> for PipelineError {
    fn from(err: RosterError) -> Self {
        Self::with_source(Stage::CsvReading, err)
    }
}

impl From<WriteError> for PipelineError {
    fn from(err: WriteError) -> Self {
        Self::with_source(Stage::Output, err)
    }
}
