//! Site-agnostic field rules over a page's visible text.
//!
//! Every rule returns `None` when nothing matches; none of them can fail.

use super::page::capitalize_first;
use regex::{Match, Regex};
use std::sync::LazyLock;

/// Characters inspected on each side of a dollar amount when deciding
/// whether it is a per-credit price.
const CREDIT_CONTEXT_CHARS: usize = 50;

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\d+(?:,\d{3})*(?:\.\d{2})?").unwrap());

static DEGREE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:master(?:'?s)?(?:\s+of\s+(?:arts|science|education|public\s+policy))?\b|doctor(?:ate|\s+of\s+(?:education|philosophy))\b|m\.s\.ed\.?|m\.ed\.?|ed\.m\.?|ed\.d\.?|ph\.d\.?|m\.a\.|m\.s\.|(?-i:MSEd|MEd|EdM|EdD|PhD|MA|MS)\b)",
    )
    .unwrap()
});

static CREDITS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})(?:\s*-\s*|\s*)(?:credit|unit)s?\b").unwrap()
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)(?:\s*-\s*|\s*)(years?|yrs?|months?|mos?|semesters?|terms?|weeks?)\b")
        .unwrap()
});

static CREDIT_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:credits?|units?|hours?)\b").unwrap());

static PACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(full|part)[-\s]?time\b").unwrap());

static DELIVERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:online|hybrid|blended|on[-\s]?campus|in[-\s]?person|residential|distance|remote)\b",
    )
    .unwrap()
});

/// First degree designation mentioned on the page, as written.
pub fn degree_type(text: &str) -> Option<String> {
    DEGREE_RE.find(text).map(|m| m.as_str().trim().to_string())
}

/// Program length, preferring a credit count, then a numeric duration, then
/// a full/part-time phrase.
pub fn duration(text: &str) -> Option<String> {
    if let Some(caps) = CREDITS_RE
        .captures_iter(text)
        .find(|c| c.get(1).is_some_and(|n| !follows_amount(text, n)))
    {
        let n = &caps[1];
        return Some(format!("{n} {}", plural("credit", n)));
    }

    if let Some(caps) = DURATION_RE
        .captures_iter(text)
        .find(|c| c.get(1).is_some_and(|n| !follows_amount(text, n)))
    {
        return Some(format_duration(&caps[1], &caps[2]));
    }

    PACE_RE.captures(text).map(|caps| pace_label(&caps[1]))
}

/// All dollar amounts in document order.
pub fn currency_amounts(text: &str) -> Vec<Match<'_>> {
    CURRENCY_RE.find_iter(text).collect()
}

/// Per-credit price and total tuition.
///
/// The per-credit price is the first amount with credit/unit/hour wording
/// nearby. Total tuition is simply the first other amount on the page; the
/// page may well be quoting an annual or per-term figure.
pub fn tuition(text: &str) -> (Option<String>, Option<String>) {
    let amounts = currency_amounts(text);

    let per_credit = amounts
        .iter()
        .position(|m| mentions_credit(&context_window(text, m, CREDIT_CONTEXT_CHARS)));

    let total = amounts
        .iter()
        .enumerate()
        .find(|(i, _)| Some(*i) != per_credit)
        .map(|(_, m)| m.as_str().to_string());

    (per_credit.map(|i| amounts[i].as_str().to_string()), total)
}

/// First delivery-mode term, normalized (e.g. `"on campus"` → `"On-campus"`).
pub fn delivery_mode(text: &str) -> Option<String> {
    DELIVERY_RE.find(text).map(|m| normalize_delivery(m.as_str()))
}

pub fn normalize_delivery(raw: &str) -> String {
    let compact: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();
    match compact.as_str() {
        "oncampus" => "On-campus".to_string(),
        "inperson" => "In-person".to_string(),
        _ => capitalize_first(raw.trim()),
    }
}

/// `("2", "yrs")` → `"2 years"`; `("1", "semester")` → `"1 semester"`.
pub fn format_duration(n: &str, unit: &str) -> String {
    let unit = unit.to_lowercase();
    let base = match unit.trim_end_matches('s') {
        "year" | "yr" => "year",
        "month" | "mo" => "month",
        "semester" => "semester",
        "term" => "term",
        "week" => "week",
        other => return format!("{n} {other}"),
    };
    format!("{n} {}", plural(base, n))
}

pub fn pace_label(kind: &str) -> String {
    if kind.eq_ignore_ascii_case("part") {
        "Part-time".to_string()
    } else {
        "Full-time".to_string()
    }
}

fn plural(unit: &str, n: &str) -> String {
    if n == "1" {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}

/// True when the number is the tail of a dollar figure like `$2,168`.
fn follows_amount(text: &str, number: Match<'_>) -> bool {
    text[..number.start()]
        .chars()
        .next_back()
        .is_some_and(|c| c == '$' || c == ',' || c == '.' || c.is_ascii_digit())
}

fn mentions_credit(window: &str) -> bool {
    CREDIT_WORD_RE.is_match(window)
}

/// Up to `radius` characters either side of `m`, respecting char boundaries.
fn context_window<'a>(text: &'a str, m: &Match<'_>, radius: usize) -> &'a str {
    let start = text[..m.start()]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let end = text[m.end()..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| m.end() + i)
        .unwrap_or(text.len());
    &text[start..end]
}
