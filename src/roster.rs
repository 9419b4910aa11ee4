//! Reading the internal competitor roster from CSV.

use crate::error::RosterError;
use crate::model::InternalRecord;
use std::path::Path;
use tracing::{debug, info};

const REQUIRED: [&str; 2] = ["Program", "Institution"];

/// Header positions, looked up case-insensitively.
struct Columns {
    names: Vec<String>,
}

impl Columns {
    fn new(headers: &csv::StringRecord) -> Self {
        Self {
            names: headers
                .iter()
                .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
                .collect(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.names.iter().position(|n| *n == wanted)
    }
}

/// Read roster rows from `path`.
///
/// Cells are trimmed; rows with a blank `Institution` are skipped. Columns
/// other than `Program` and `Institution` may be missing and read as empty.
pub fn read_roster(path: &Path) -> Result<Vec<InternalRecord>, RosterError> {
    let read_err = |source| RosterError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let columns = Columns::new(reader.headers().map_err(read_err)?);
    for column in REQUIRED {
        if columns.position(column).is_none() {
            return Err(RosterError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.records() {
        let row = row.map_err(read_err)?;
        let cell = |name: &str| {
            columns
                .position(name)
                .and_then(|i| row.get(i))
                .unwrap_or_default()
                .to_string()
        };

        let record = InternalRecord {
            program: cell("Program"),
            cip_codes_used: cell("cip_codes_used"),
            institution: cell("Institution"),
            app_percentile: cell("app_percentile"),
            admissibility_percentile: cell("admissibility_percentile"),
            win_percentile: cell("win_percentile"),
            overall_percentile: cell("overall_percentile"),
        };
        if record.institution.is_empty() {
            skipped += 1;
            continue;
        }
        records.push(record);
    }

    if skipped > 0 {
        debug!(skipped, "Skipped roster rows without an institution");
    }
    info!(path = %path.display(), count = records.len(), "Loaded roster");
    Ok(records)
}
