use html_scraper::{ElementRef, Html, Selector};
use regex::Regex;
use std::sync::LazyLock;

/// Maximum characters kept for curriculum highlights.
pub const HIGHLIGHT_LIMIT: usize = 200;

/// Minimum characters for a curriculum block to count as content.
const MIN_BLOCK_CHARS: usize = 20;

/// Regions likely to describe the curriculum, in preference order.
const CURRICULUM_SELECTORS: &[&str] = &[
    ".curriculum",
    ".courses",
    ".coursework",
    ".overview",
    ".program-overview",
    "[class*=\"curriculum\"]",
    "[class*=\"course\"]",
    "[class*=\"overview\"]",
];

static CURRICULUM_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:curriculum|coursework|core courses?|courses?|what you'll study)\b")
        .unwrap()
});

/// A fetched page, parsed once and shared by every field rule.
pub struct Page {
    document: Html,
    text: String,
}

impl Page {
    pub fn parse(markup: &str) -> Self {
        let document = Html::parse_document(markup);
        let text = document
            .select(&body_selector())
            .next()
            .map(visible_text)
            .unwrap_or_else(|| visible_text(document.root_element()));
        Self { document, text }
    }

    /// Whitespace-collapsed visible text of the page body.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// First curriculum-labeled block of meaningful length, else the window
    /// following the first curriculum keyword in the body text.
    pub fn curriculum_highlights(&self) -> Option<String> {
        for raw in CURRICULUM_SELECTORS {
            let Ok(selector) = Selector::parse(raw) else {
                continue;
            };
            for element in self.document.select(&selector) {
                let block = visible_text(element);
                if block.chars().count() > MIN_BLOCK_CHARS {
                    return Some(truncate_with_ellipsis(&block, HIGHLIGHT_LIMIT));
                }
            }
        }

        let found = CURRICULUM_KEYWORD_RE.find(&self.text)?;
        let window: String = self.text[found.start()..]
            .chars()
            .take(HIGHLIGHT_LIMIT)
            .collect();
        Some(window.trim().to_string())
    }
}

fn body_selector() -> Selector {
    Selector::parse("body").unwrap()
}

/// Text content under `root`, skipping script-like elements.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|el| el.name().to_owned()))
            .is_some_and(|name| matches!(name.as_str(), "script" | "style" | "noscript" | "template"));
        if hidden {
            continue;
        }
        out.push_str(text);
        out.push(' ');
    }
    collapse_whitespace(&out)
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep the first `limit` characters, appending `...` only when something was cut.
pub fn truncate_with_ellipsis(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

/// `"on campus"` → `"On campus"`: first letter upper, rest lower.
pub fn capitalize_first(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
