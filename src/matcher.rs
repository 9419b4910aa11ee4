//! Pairing internal roster rows with scraped records by name.
//!
//! Institution names differ between the roster and program pages mostly in
//! spelling ("University of Michigan [Ann Arbor]" vs "University of
//! Michigan"), so both sides are normalized before comparison. Matching is
//! first-hit, not ranked.

use crate::model::{InternalRecord, ScrapedRecord};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Bracketed qualifiers such as campus names.
static QUALIFIER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Long forms collapsed to the abbreviations both sources tend to share.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("university", "univ"),
    ("graduate school of education", "gse"),
    ("teachers college", "tc"),
];

/// Specialization keywords; two programs mentioning the same one are compatible.
const SPECIALIZATIONS: &[&str] = &["education policy", "higher education"];

/// Comparable form of an institution name.
///
/// ```
/// use competitor_enrich::matcher::normalize_institution;
///
/// assert_eq!(normalize_institution("University of São Paulo"), "univ of sao paulo");
/// assert_eq!(
///     normalize_institution("Harvard Graduate School of Education"),
///     "harvard gse"
/// );
/// ```
pub fn normalize_institution(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect();

    let stripped = QUALIFIER_RE.replace_all(&folded, " ");
    let mut normalized = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    for (long, short) in ABBREVIATIONS {
        normalized = normalized.replace(long, short);
    }
    normalized
}

/// Equal after normalization, or one contained in the other.
pub fn institutions_match(a: &str, b: &str) -> bool {
    let (a, b) = (normalize_institution(a), normalize_institution(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(&b) || b.contains(&a)
}

/// Both programs name the same specialization, or are equal ignoring case.
pub fn programs_compatible(a: &str, b: &str) -> bool {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    SPECIALIZATIONS
        .iter()
        .any(|keyword| a.contains(keyword) && b.contains(keyword))
        || a.trim() == b.trim()
}

/// First scraped record compatible with `internal`, if any.
pub fn find_match<'a>(
    internal: &InternalRecord,
    candidates: &'a [ScrapedRecord],
) -> Option<&'a ScrapedRecord> {
    candidates.iter().find(|candidate| {
        institutions_match(&internal.institution, &candidate.institution_name)
            && programs_compatible(&internal.program, &candidate.program_name)
    })
}
