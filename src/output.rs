//! Persisting merged records as JSON and CSV artifacts.
//!
//! Each run writes a timestamped pair and overwrites the `_latest` pair with
//! identical content. Both documents are fully serialized before any file is
//! touched, so a serialization failure leaves the previous `_latest` intact.

use crate::error::WriteError;
use crate::model::{MergedRecord, OutputFiles};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

const DESCRIPTION: &str =
    "Merged competitor data combining internal analytics with scraped program information";

/// Column order of the CSV artifacts.
pub const CSV_HEADERS: [&str; 16] = [
    "Program",
    "cip_codes_used",
    "Institution",
    "app_percentile",
    "admissibility_percentile",
    "win_percentile",
    "overall_percentile",
    "degreeType",
    "programDuration",
    "costPerCreditHour",
    "totalTuition",
    "deliveryMode",
    "curriculumHighlights",
    "accreditation",
    "sourceUrl",
    "lastScraped",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata<'a> {
    generated_at: DateTime<Utc>,
    total_records: usize,
    records_with_scraped_data: usize,
    description: &'a str,
}

#[derive(Serialize)]
struct Document<'a> {
    metadata: Metadata<'a>,
    competitors: &'a [MergedRecord],
}

/// Writes artifacts under a fixed directory with a fixed file-name prefix.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    prefix: String,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Paths of the `_latest` JSON and CSV artifacts.
    pub fn latest_paths(&self) -> OutputFiles {
        OutputFiles {
            json: self.path_for("latest", "json"),
            csv: self.path_for("latest", "csv"),
        }
    }

    /// Write all four artifacts, returning the timestamped pair.
    pub async fn persist(&self, records: &[MergedRecord]) -> Result<OutputFiles, WriteError> {
        self.persist_at(records, Utc::now()).await
    }

    pub async fn persist_at(
        &self,
        records: &[MergedRecord],
        now: DateTime<Utc>,
    ) -> Result<OutputFiles, WriteError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| WriteError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;

        let stamp = file_timestamp(now);
        let stamped = OutputFiles {
            json: self.path_for(&stamp, "json"),
            csv: self.path_for(&stamp, "csv"),
        };
        let latest = self.latest_paths();

        let json = render_json(records, now)?;
        let csv = render_csv(records, &stamped.csv)?;

        write(&stamped.json, &json).await?;
        write(&latest.json, &json).await?;
        write(&stamped.csv, &csv).await?;
        write(&latest.csv, &csv).await?;

        info!(
            records = records.len(),
            json = %stamped.json.display(),
            csv = %stamped.csv.display(),
            "Wrote output artifacts"
        );
        Ok(stamped)
    }

    fn path_for(&self, suffix: &str, extension: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{suffix}.{extension}", self.prefix))
    }
}

/// ISO-8601 timestamp safe for file names: `:` and `.` become `-`.
pub fn file_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

fn render_json(records: &[MergedRecord], now: DateTime<Utc>) -> Result<Vec<u8>, WriteError> {
    let document = Document {
        metadata: Metadata {
            generated_at: now,
            total_records: records.len(),
            records_with_scraped_data: records.iter().filter(|r| r.has_scraped_data()).count(),
            description: DESCRIPTION,
        },
        competitors: records,
    };
    Ok(serde_json::to_vec_pretty(&document)?)
}

fn render_csv(records: &[MergedRecord], target: &Path) -> Result<Vec<u8>, WriteError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for record in records {
        writer.write_record(csv_row(record))?;
    }

    writer.into_inner().map_err(|e| WriteError::Io {
        path: target.to_path_buf(),
        source: e.into_error(),
    })
}

fn csv_row(record: &MergedRecord) -> [String; 16] {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    let internal = &record.internal;
    [
        internal.program.clone(),
        internal.cip_codes_used.clone(),
        internal.institution.clone(),
        internal.app_percentile.clone(),
        internal.admissibility_percentile.clone(),
        internal.win_percentile.clone(),
        internal.overall_percentile.clone(),
        opt(&record.degree_type),
        opt(&record.program_duration),
        opt(&record.cost_per_credit_hour),
        opt(&record.total_tuition),
        opt(&record.delivery_mode),
        opt(&record.curriculum_highlights),
        opt(&record.accreditation),
        opt(&record.source_url),
        record
            .scraped_at
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default(),
    ]
}

async fn write(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })
}
