//! Records flowing through the enrichment pipeline.
//!
//! Field names on the wire follow the roster's CSV headers for internal
//! columns and camelCase for scraped columns, which is what the dashboard
//! reading the output artifacts expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One row of the internal competitor roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalRecord {
    #[serde(rename = "Program")]
    pub program: String,
    #[serde(rename = "cip_codes_used")]
    pub cip_codes_used: String,
    #[serde(rename = "Institution")]
    pub institution: String,
    #[serde(rename = "app_percentile")]
    pub app_percentile: String,
    #[serde(rename = "admissibility_percentile")]
    pub admissibility_percentile: String,
    #[serde(rename = "win_percentile")]
    pub win_percentile: String,
    #[serde(rename = "overall_percentile")]
    pub overall_percentile: String,
}

/// Percentile columns of an [`InternalRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Percentile {
    App,
    Admissibility,
    Win,
    Overall,
}

impl InternalRecord {
    /// Raw percentile string as it appears in the roster (e.g. `"94%"`).
    pub fn percentile(&self, which: Percentile) -> &str {
        match which {
            Percentile::App => &self.app_percentile,
            Percentile::Admissibility => &self.admissibility_percentile,
            Percentile::Win => &self.win_percentile,
            Percentile::Overall => &self.overall_percentile,
        }
    }

    /// Numeric percentile with any `%` removed; unparsable values read as `0.0`.
    pub fn percentile_value(&self, which: Percentile) -> f64 {
        self.percentile(which)
            .replace('%', "")
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}

/// Hand-curated institution/program → program page URL entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMapping {
    pub institution: String,
    pub program_name: String,
    pub url: String,
}

/// Attributes pulled off a competitor's program page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedRecord {
    pub institution_name: String,
    pub program_name: String,
    pub degree_type: Option<String>,
    pub program_duration: Option<String>,
    pub cost_per_credit_hour: Option<String>,
    pub total_tuition: Option<String>,
    pub delivery_mode: Option<String>,
    pub curriculum_highlights: Option<String>,
    pub accreditation: Option<String>,
    pub source_url: String,
    #[serde(rename = "lastScraped")]
    pub scraped_at: DateTime<Utc>,
}

impl ScrapedRecord {
    /// A record for a scrape attempt that produced nothing usable.
    pub fn empty(institution: &str, program: &str, url: &str) -> Self {
        Self {
            institution_name: institution.to_owned(),
            program_name: program.to_owned(),
            degree_type: None,
            program_duration: None,
            cost_per_credit_hour: None,
            total_tuition: None,
            delivery_mode: None,
            curriculum_highlights: None,
            accreditation: None,
            source_url: url.to_owned(),
            scraped_at: Utc::now(),
        }
    }

    /// True when at least one extracted attribute is present.
    pub fn has_attributes(&self) -> bool {
        [
            &self.degree_type,
            &self.program_duration,
            &self.cost_per_credit_hour,
            &self.total_tuition,
            &self.delivery_mode,
            &self.curriculum_highlights,
            &self.accreditation,
        ]
        .iter()
        .any(|f| f.is_some())
    }
}

/// An internal roster row enriched with at most one scraped record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    #[serde(flatten)]
    pub internal: InternalRecord,
    #[serde(rename = "degreeType")]
    pub degree_type: Option<String>,
    #[serde(rename = "programDuration")]
    pub program_duration: Option<String>,
    #[serde(rename = "costPerCreditHour")]
    pub cost_per_credit_hour: Option<String>,
    #[serde(rename = "totalTuition")]
    pub total_tuition: Option<String>,
    #[serde(rename = "deliveryMode")]
    pub delivery_mode: Option<String>,
    #[serde(rename = "curriculumHighlights")]
    pub curriculum_highlights: Option<String>,
    pub accreditation: Option<String>,
    #[serde(rename = "sourceUrl")]
    pub source_url: Option<String>,
    #[serde(rename = "lastScraped")]
    pub scraped_at: Option<DateTime<Utc>>,
}

impl MergedRecord {
    pub fn new(internal: &InternalRecord, scraped: Option<&ScrapedRecord>) -> Self {
        Self {
            internal: internal.clone(),
            degree_type: scraped.and_then(|s| s.degree_type.clone()),
            program_duration: scraped.and_then(|s| s.program_duration.clone()),
            cost_per_credit_hour: scraped.and_then(|s| s.cost_per_credit_hour.clone()),
            total_tuition: scraped.and_then(|s| s.total_tuition.clone()),
            delivery_mode: scraped.and_then(|s| s.delivery_mode.clone()),
            curriculum_highlights: scraped.and_then(|s| s.curriculum_highlights.clone()),
            accreditation: scraped.and_then(|s| s.accreditation.clone()),
            source_url: scraped.map(|s| s.source_url.clone()),
            scraped_at: scraped.map(|s| s.scraped_at),
        }
    }

    /// Whether a scrape was attempted and recorded for this row.
    pub fn has_scraped_data(&self) -> bool {
        self.scraped_at.is_some()
    }
}

/// Outcome counts for one enrichment run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentSummary {
    pub total_records: usize,
    pub records_with_scraped_data: usize,
    pub records_without_scraped_data: usize,
    pub generated_at: DateTime<Utc>,
    pub output_files: Option<OutputFiles>,
}

impl EnrichmentSummary {
    pub fn from_records(records: &[MergedRecord], generated_at: DateTime<Utc>) -> Self {
        let with = records.iter().filter(|r| r.has_scraped_data()).count();
        Self {
            total_records: records.len(),
            records_with_scraped_data: with,
            records_without_scraped_data: records.len() - with,
            generated_at,
            output_files: None,
        }
    }
}

/// Paths of the timestamped artifacts written by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFiles {
    pub json: PathBuf,
    pub csv: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> InternalRecord {
        InternalRecord {
            program: "Education Policy".into(),
            cip_codes_used: "13.0401".into(),
            institution: "Harvard Graduate School of Education".into(),
            app_percentile: "94%".into(),
            admissibility_percentile: " 12 % ".into(),
            win_percentile: "n/a".into(),
            overall_percentile: "81.5".into(),
        }
    }

    #[test]
    fn test_percentile_value_strips_percent() {
        let r = record();
        assert_eq!(r.percentile_value(Percentile::App), 94.0);
        assert_eq!(r.percentile_value(Percentile::Admissibility), 12.0);
        assert_eq!(r.percentile_value(Percentile::Win), 0.0);
        assert_eq!(r.percentile_value(Percentile::Overall), 81.5);
    }

    #[test]
    fn test_merged_without_scrape_has_no_attributes() {
        let merged = MergedRecord::new(&record(), None);
        assert_eq!(merged.internal, record());
        assert!(merged.degree_type.is_none());
        assert!(merged.accreditation.is_none());
        assert!(merged.source_url.is_none());
        assert!(!merged.has_scraped_data());
    }

    #[test]
    fn test_merged_json_uses_roster_and_camel_case_names() {
        let mut scraped = ScrapedRecord::empty(
            "Harvard Graduate School of Education",
            "Education Policy",
            "https://example.edu/ep",
        );
        scraped.total_tuition = Some("$52,032".into());
        let merged = MergedRecord::new(&record(), Some(&scraped));

        let value = serde_json::to_value(&merged).unwrap();
        assert_eq!(value["Institution"], "Harvard Graduate School of Education");
        assert_eq!(value["app_percentile"], "94%");
        assert_eq!(value["totalTuition"], "$52,032");
        assert_eq!(value["sourceUrl"], "https://example.edu/ep");
        assert!(value["degreeType"].is_null());
        assert!(value.get("lastScraped").is_some());
    }

    #[test]
    fn test_summary_counts() {
        let scraped = ScrapedRecord::empty("A", "B", "https://a.edu");
        let records = vec![
            MergedRecord::new(&record(), Some(&scraped)),
            MergedRecord::new(&record(), None),
            MergedRecord::new(&record(), None),
        ];
        let summary = EnrichmentSummary::from_records(&records, Utc::now());
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.records_with_scraped_data, 1);
        assert_eq!(summary.records_without_scraped_data, 2);
    }
}
