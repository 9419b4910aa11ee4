//! JSON parsing with readable error locations.

use std::fmt;

/// A JSON document that failed to deserialize, with enough location detail
/// to find the offending entry in a hand-edited file.
#[derive(Debug)]
pub struct JsonContextError {
    /// Serde path to the failing value, e.g. `[1].programName`.
    pub path: String,
    pub line: usize,
    pub column: usize,
    pub detail: String,
    pub snippet: String,
}

impl fmt::Display for JsonContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() && self.path != "." {
            write!(f, "at path '{}': ", self.path)?;
        }
        write!(
            f,
            "{} (line {} col {})\n{}",
            self.detail, self.line, self.column, self.snippet
        )
    }
}

impl std::error::Error for JsonContextError {}

/// Parse JSON and, on failure, report the serde path, the type mismatch and
/// a snippet of the offending line.
pub fn parse_json_with_context<T: serde::de::DeserializeOwned>(
    body: &str,
) -> Result<T, JsonContextError> {
    let de = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let inner = err.inner();
        let (line, column) = (inner.line(), inner.column());
        let raw = inner.to_string();
        let suffix = format!(" at line {line} column {column}");
        JsonContextError {
            path: err.path().to_string(),
            line,
            column,
            detail: parse_type_mismatch(raw.strip_suffix(&suffix).unwrap_or(&raw)),
            snippet: build_error_snippet(body, line, column, 20),
        }
    })
}

/// Turn "invalid type: null, expected a string" into "expected a string, got null".
fn parse_type_mismatch(error_msg: &str) -> String {
    if let Some(invalid_start) = error_msg.find("invalid type: ") {
        let after_prefix = &error_msg[invalid_start + "invalid type: ".len()..];

        if let Some(comma_pos) = after_prefix.find(", expected ") {
            let actual_type = &after_prefix[..comma_pos];
            let expected_part = &after_prefix[comma_pos + ", expected ".len()..];
            let expected_type = expected_part
                .split(" at line ")
                .next()
                .unwrap_or(expected_part)
                .trim();

            return format!("expected {}, got {}", expected_type, actual_type);
        }
    }

    if error_msg.starts_with("expected ")
        && let Some(expected_part) = error_msg.split(" at line ").next()
    {
        return expected_part.to_string();
    }

    error_msg.to_string()
}

fn build_error_snippet(body: &str, line: usize, column: usize, context_len: usize) -> String {
    let target_line = body.lines().nth(line.saturating_sub(1)).unwrap_or("");
    if target_line.is_empty() {
        return "(empty line)".to_string();
    }

    // column is 1-based
    let error_idx = column.saturating_sub(1).min(target_line.len());

    let half_len = context_len / 2;
    let mut start = error_idx.saturating_sub(half_len);
    while !target_line.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (error_idx + half_len).min(target_line.len());
    while !target_line.is_char_boundary(end) {
        end += 1;
    }

    let slice = &target_line[start..end];
    let indicator = " ".repeat(error_idx - start) + "^";

    format!("...{slice}...\n   {indicator}")
}
