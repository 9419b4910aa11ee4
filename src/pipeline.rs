//! Batch orchestration: resolve, fetch, extract, merge, persist.
//!
//! Records are processed strictly one after another. A failure while
//! scraping one page (including a panic) yields an empty scraped record for
//! that row and the batch moves on; only a missing roster or a failed write
//! ends the run early.

use crate::config::Config;
use crate::error::{PipelineError, Stage};
use crate::extract::{ExtractedFields, FieldExtractor};
use crate::fetch::{BrowserSource, ContentFetcher, HttpSource, PageSource};
use crate::merge::{merge, merge_paired};
use crate::model::{EnrichmentSummary, InternalRecord, MergedRecord, ScrapedRecord};
use crate::output::OutputWriter;
use crate::pacing::Pacer;
use crate::resolver::UrlResolver;
use crate::utils::fmt_duration;
use anyhow::Context;
use chrono::Utc;
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const DEFAULT_POLITENESS_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_BULK_DELAY: Duration = Duration::from_millis(2500);

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub merged: Vec<MergedRecord>,
    pub summary: EnrichmentSummary,
}

/// Drives one enrichment batch over its injected collaborators.
pub struct Enricher {
    resolver: UrlResolver,
    fetcher: ContentFetcher,
    extractor: FieldExtractor,
    writer: OutputWriter,
    politeness_delay: Duration,
    bulk_delay: Duration,
}

impl Enricher {
    pub fn new(
        resolver: UrlResolver,
        fetcher: ContentFetcher,
        extractor: FieldExtractor,
        writer: OutputWriter,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            extractor,
            writer,
            politeness_delay: DEFAULT_POLITENESS_DELAY,
            bulk_delay: DEFAULT_BULK_DELAY,
        }
    }

    /// Build the production pipeline: HTTP first, browser fallback if enabled.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let resolver = UrlResolver::load(&config.mapping_path);

        let primary = HttpSource::new(&config.user_agent, config.http_timeout)
            .context("failed to build HTTP client")?;
        let fallback = config
            .browser
            .settings()
            .map(|settings| Box::new(BrowserSource::new(settings)) as Box<dyn PageSource>);
        if fallback.is_none() {
            info!("Browser fallback disabled");
        }

        Ok(Self::new(
            resolver,
            ContentFetcher::new(Box::new(primary), fallback),
            FieldExtractor::default(),
            OutputWriter::new(&config.output_dir, config.output_prefix.as_str()),
        )
        .with_delays(config.politeness_delay, config.bulk_delay))
    }

    /// Override the per-record and bulk inter-request delays.
    pub fn with_delays(mut self, politeness_delay: Duration, bulk_delay: Duration) -> Self {
        self.politeness_delay = politeness_delay;
        self.bulk_delay = bulk_delay;
        self
    }

    /// Enrich each internal record with its own mapped page, in order.
    ///
    /// Rows without a mapped URL are not fetched and come out with every
    /// scraped field absent.
    pub async fn enrich(&self, internal: &[InternalRecord]) -> Result<Enrichment, PipelineError> {
        guard_unknown(self.run_per_record(internal)).await
    }

    /// Scrape every mapped URL up front, then match pages to internal records.
    pub async fn enrich_bulk(
        &self,
        internal: &[InternalRecord],
    ) -> Result<Enrichment, PipelineError> {
        guard_unknown(self.run_bulk(internal)).await
    }

    async fn run_per_record(
        &self,
        internal: &[InternalRecord],
    ) -> Result<Enrichment, PipelineError> {
        require_records(internal)?;
        let start = Instant::now();
        let total = internal.len();
        info!(records = total, mappings = self.resolver.len(), "Starting per-record enrichment");

        let mut pacer = Pacer::new(self.politeness_delay);
        let mut scraped = Vec::with_capacity(total);
        for (i, record) in internal.iter().enumerate() {
            let Some(url) = self.resolver.resolve(&record.institution, &record.program) else {
                debug!(
                    institution = record.institution.as_str(),
                    program = record.program.as_str(),
                    "No URL mapping, skipping scrape"
                );
                scraped.push(None);
                continue;
            };

            info!(
                progress = format!("{}/{total}", i + 1),
                institution = record.institution.as_str(),
                url,
                "Scraping program page"
            );
            let page = pacer
                .run(self.scrape(&record.institution, &record.program, url))
                .await;
            scraped.push(Some(page));
        }

        self.finish(merge_paired(internal, &scraped), start).await
    }

    async fn run_bulk(&self, internal: &[InternalRecord]) -> Result<Enrichment, PipelineError> {
        require_records(internal)?;
        let start = Instant::now();
        let total = self.resolver.len();
        info!(records = internal.len(), mappings = total, "Starting bulk enrichment");

        let mut pacer = Pacer::new(self.bulk_delay);
        let mut scraped = Vec::with_capacity(total);
        for (i, mapping) in self.resolver.mappings().iter().enumerate() {
            info!(
                progress = format!("{}/{total}", i + 1),
                institution = mapping.institution.as_str(),
                url = mapping.url.as_str(),
                "Scraping program page"
            );
            let page = pacer
                .run(self.scrape(&mapping.institution, &mapping.program_name, &mapping.url))
                .await;
            scraped.push(page);
        }

        self.finish(merge(internal, &scraped), start).await
    }

    /// Fetch and extract one page. Never fails: errors and panics become an
    /// empty record for `url`.
    pub async fn scrape(&self, institution: &str, program: &str, url: &str) -> ScrapedRecord {
        let attempt = AssertUnwindSafe(async {
            let markup = self.fetcher.fetch(url).await;
            self.extractor.extract(institution, &markup)
        })
        .catch_unwind()
        .await;

        let fields = attempt.unwrap_or_else(|panic| {
            warn!(
                institution,
                url,
                error = panic_message(panic.as_ref()),
                "Scrape panicked, recording empty result"
            );
            ExtractedFields::default()
        });

        scraped_record(institution, program, url, fields)
    }

    async fn finish(
        &self,
        merged: Vec<MergedRecord>,
        start: Instant,
    ) -> Result<Enrichment, PipelineError> {
        let generated_at = Utc::now();
        let mut summary = EnrichmentSummary::from_records(&merged, generated_at);

        let files = self.writer.persist_at(&merged, generated_at).await.map_err(|e| {
            let err = PipelineError::from(e);
            error!(stage = %err.stage, error = err.message.as_str(), "Failed to write output");
            err
        })?;
        summary.output_files = Some(files);

        info!(
            total = summary.total_records,
            with_scraped_data = summary.records_with_scraped_data,
            without_scraped_data = summary.records_without_scraped_data,
            duration = fmt_duration(start.elapsed()),
            "Enrichment complete"
        );
        Ok(Enrichment { merged, summary })
    }
}

fn require_records(internal: &[InternalRecord]) -> Result<(), PipelineError> {
    if internal.is_empty() {
        let err = PipelineError::new(Stage::CsvReading, "no internal competitor records to enrich");
        error!(stage = %err.stage, "{}", err.message);
        return Err(err);
    }
    Ok(())
}

/// Attribute a panic anywhere in the run to the `unknown` stage.
async fn guard_unknown<F>(run: F) -> Result<Enrichment, PipelineError>
where
    F: Future<Output = Result<Enrichment, PipelineError>>,
{
    AssertUnwindSafe(run).catch_unwind().await.unwrap_or_else(|panic| {
        let err = PipelineError::new(Stage::Unknown, panic_message(panic.as_ref()));
        error!(stage = %err.stage, error = err.message.as_str(), "Enrichment aborted");
        Err(err)
    })
}

fn scraped_record(
    institution: &str,
    program: &str,
    url: &str,
    fields: ExtractedFields,
) -> ScrapedRecord {
    let accreditation = fields.accreditation();
    ScrapedRecord {
        degree_type: fields.degree_type,
        program_duration: fields.program_duration,
        cost_per_credit_hour: fields.cost_per_credit_hour,
        total_tuition: fields.total_tuition,
        delivery_mode: fields.delivery_mode,
        curriculum_highlights: fields.curriculum_highlights,
        accreditation,
        ..ScrapedRecord::empty(institution, program, url)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
