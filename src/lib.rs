//! Competitor program enrichment.
//!
//! Takes the internal competitor roster, scrapes each competitor's public
//! program page for cost, length, delivery and curriculum details, and writes
//! the merged dataset as JSON and CSV. [`pipeline::Enricher`] is the entry
//! point.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod json;
pub mod logging;
pub mod matcher;
pub mod merge;
pub mod model;
pub mod output;
pub mod pacing;
pub mod pipeline;
pub mod resolver;
pub mod roster;
pub mod utils;

pub use error::{PipelineError, Stage};
pub use model::{EnrichmentSummary, InternalRecord, MergedRecord, ScrapedRecord, UrlMapping};
pub use pipeline::{Enricher, Enrichment};
