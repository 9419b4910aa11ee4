//! Building one merged row per internal roster row.

use crate::matcher::find_match;
use crate::model::{InternalRecord, MergedRecord, ScrapedRecord};
use tracing::debug;

/// Enrich each internal record with its first matching scraped record.
///
/// Output order and length always equal the input's.
pub fn merge(internal: &[InternalRecord], scraped: &[ScrapedRecord]) -> Vec<MergedRecord> {
    internal
        .iter()
        .map(|record| {
            let found = find_match(record, scraped);
            if found.is_none() {
                debug!(
                    institution = record.institution.as_str(),
                    program = record.program.as_str(),
                    "No scraped record matched"
                );
            }
            MergedRecord::new(record, found)
        })
        .collect()
}

/// Merge when each internal record's scrape is already known by position.
///
/// Missing trailing entries in `scraped` are treated as "not scraped".
pub fn merge_paired(
    internal: &[InternalRecord],
    scraped: &[Option<ScrapedRecord>],
) -> Vec<MergedRecord> {
    internal
        .iter()
        .enumerate()
        .map(|(i, record)| MergedRecord::new(record, scraped.get(i).and_then(Option::as_ref)))
        .collect()
}
