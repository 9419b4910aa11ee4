use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Enrich the internal competitor roster with data scraped from program pages.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML config file (defaults to `enrich.toml` when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Roster CSV, overriding the configured path
    #[arg(long, value_name = "FILE")]
    pub roster: Option<PathBuf>,

    /// Scrape per roster row, or every mapped URL up front
    #[arg(long, value_enum, default_value_t = Mode::PerRecord)]
    pub mode: Mode,

    /// Log output format
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Resolve and scrape each roster row in order
    PerRecord,
    /// Scrape the whole URL mapping, then match pages to rows
    Bulk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable output
    Pretty,
    /// Structured JSON lines
    Json,
}

/// Pretty output in debug builds, JSON in release builds.
fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}
