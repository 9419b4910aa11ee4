//! Per-institution extraction strategies.

use super::ExtractedFields;
use super::generic;
use super::page::Page;
use regex::Regex;
use std::sync::LazyLock;

/// Turns a parsed page into extracted fields.
///
/// Implementations must be total: unmatched fields stay `None`.
pub trait ExtractionStrategy: Send + Sync {
    fn extract(&self, page: &Page) -> ExtractedFields;
}

/// Pattern rules that apply to any site.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericStrategy;

impl ExtractionStrategy for GenericStrategy {
    fn extract(&self, page: &Page) -> ExtractedFields {
        let text = page.text();
        let (cost_per_credit_hour, total_tuition) = generic::tuition(text);
        ExtractedFields {
            degree_type: generic::degree_type(text),
            program_duration: generic::duration(text),
            cost_per_credit_hour,
            total_tuition,
            delivery_mode: generic::delivery_mode(text),
            curriculum_highlights: page.curriculum_highlights(),
        }
    }
}

/// Constant answers for a site whose page cannot be parsed reliably.
#[derive(Debug, Clone)]
pub struct FixedAnswers(pub ExtractedFields);

impl ExtractionStrategy for FixedAnswers {
    fn extract(&self, _page: &Page) -> ExtractedFields {
        self.0.clone()
    }
}

/// Which dollar amount on the page is the program's tuition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuitionPick {
    First,
    Last,
    /// Second amount, or the only one when the page has just one.
    SecondOrFirst,
}

/// How a matched delivery phrase is reported.
#[derive(Debug, Clone)]
pub enum DeliveryLabel {
    /// Always report this label.
    Fixed(&'static str),
    /// Report the matched phrase, normalized.
    Matched,
}

/// Selector-free pattern set tuned to one site's wording.
///
/// Duration patterns are tried in order. A pattern with `n` and `unit`
/// capture groups yields e.g. `"2 years"`; one without yields `"Full-time"`.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    degree: Option<(Regex, &'static str)>,
    durations: Vec<Regex>,
    tuition: TuitionPick,
    per_credit: bool,
    delivery: Option<(Regex, DeliveryLabel)>,
}

impl SiteProfile {
    pub fn new(tuition: TuitionPick) -> Self {
        Self {
            degree: None,
            durations: Vec::new(),
            tuition,
            per_credit: false,
            delivery: None,
        }
    }

    /// Report `label` as the degree when `pattern` appears on the page.
    pub fn degree(mut self, pattern: Regex, label: &'static str) -> Self {
        self.degree = Some((pattern, label));
        self
    }

    pub fn duration(mut self, pattern: Regex) -> Self {
        self.durations.push(pattern);
        self
    }

    /// Look for an amount written directly against credit/unit/hour wording.
    pub fn per_credit(mut self) -> Self {
        self.per_credit = true;
        self
    }

    pub fn delivery(mut self, pattern: Regex, label: DeliveryLabel) -> Self {
        self.delivery = Some((pattern, label));
        self
    }

    fn match_duration(&self, text: &str) -> Option<String> {
        self.durations.iter().find_map(|re| {
            let caps = re.captures(text)?;
            Some(match (caps.name("n"), caps.name("unit")) {
                (Some(n), Some(unit)) => generic::format_duration(n.as_str(), unit.as_str()),
                _ => generic::pace_label("full"),
            })
        })
    }

    fn match_tuition(&self, text: &str) -> Option<String> {
        let amounts = generic::currency_amounts(text);
        let picked = match self.tuition {
            TuitionPick::First => amounts.first(),
            TuitionPick::Last => amounts.last(),
            TuitionPick::SecondOrFirst => amounts.get(1).or(amounts.first()),
        };
        picked.map(|m| m.as_str().to_string())
    }

    fn match_per_credit(&self, text: &str) -> Option<String> {
        if !self.per_credit {
            return None;
        }
        let caps = ADJACENT_CREDIT_RE.captures(text)?;
        Some(caps[1].to_string())
    }
}

static ADJACENT_CREDIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\$\d+(?:,\d{3})*(?:\.\d{2})?)\s*(?:per\s+|/\s*)?(?:credit|unit|hour)").unwrap()
});

impl ExtractionStrategy for SiteProfile {
    fn extract(&self, page: &Page) -> ExtractedFields {
        let text = page.text();
        ExtractedFields {
            degree_type: self
                .degree
                .as_ref()
                .filter(|(re, _)| re.is_match(text))
                .map(|(_, label)| (*label).to_string()),
            program_duration: self.match_duration(text),
            cost_per_credit_hour: self.match_per_credit(text),
            total_tuition: self.match_tuition(text),
            delivery_mode: self.delivery.as_ref().and_then(|(re, label)| {
                let found = re.find(text)?;
                Some(match label {
                    DeliveryLabel::Fixed(fixed) => (*fixed).to_string(),
                    DeliveryLabel::Matched => generic::normalize_delivery(found.as_str()),
                })
            }),
            curriculum_highlights: page.curriculum_highlights(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn test_generic_strategy_reads_all_fields() {
        let page = Page::parse(
            r#"<body>
                <h1>Master of Education in Higher Education</h1>
                <p>This 36-credit program is offered online.</p>
                <p>Tuition: $1,050 per credit hour. Estimated program cost $37,800.</p>
                <section class="curriculum">Courses in student affairs, assessment, and law.</section>
            </body>"#,
        );
        let fields = GenericStrategy.extract(&page);
        assert_eq!(fields.degree_type.as_deref(), Some("Master of Education"));
        assert_eq!(fields.program_duration.as_deref(), Some("36 credits"));
        assert_eq!(fields.cost_per_credit_hour.as_deref(), Some("$1,050"));
        assert_eq!(fields.total_tuition.as_deref(), Some("$37,800"));
        assert_eq!(fields.delivery_mode.as_deref(), Some("Online"));
        assert_eq!(
            fields.curriculum_highlights.as_deref(),
            Some("Courses in student affairs, assessment, and law.")
        );
    }

    #[test]
    fn test_generic_strategy_on_empty_page() {
        let fields = GenericStrategy.extract(&Page::parse(""));
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn test_fixed_answers_ignore_page() {
        let answers = ExtractedFields {
            degree_type: Some("Master's".into()),
            ..Default::default()
        };
        let fields = FixedAnswers(answers.clone()).extract(&Page::parse("<p>M.A.</p>"));
        assert_eq!(fields, answers);
    }

    #[test]
    fn test_site_profile_labels_and_picks() {
        let profile = SiteProfile::new(TuitionPick::Last)
            .degree(re(r"(?i)\bmaster(?:'s)?\s+of\s+arts\b"), "M.A.")
            .duration(re(r"(?i)\b(?P<n>\d+)\s*(?P<unit>year)"))
            .duration(re(r"(?i)\bfull[-\s]?time\b"))
            .delivery(re(r"(?i)\b(?:on[-\s]?campus|residential)\b"), DeliveryLabel::Fixed("On-campus"));

        let page = Page::parse(
            "<p>A residential Master of Arts. Fees $500; tuition $60,000 per year. Full-time.</p>",
        );
        let fields = profile.extract(&page);
        assert_eq!(fields.degree_type.as_deref(), Some("M.A."));
        assert_eq!(fields.program_duration.as_deref(), Some("Full-time"));
        assert_eq!(fields.total_tuition.as_deref(), Some("$60,000"));
        assert_eq!(fields.cost_per_credit_hour, None);
        assert_eq!(fields.delivery_mode.as_deref(), Some("On-campus"));
    }

    #[test]
    fn test_site_profile_second_amount_and_adjacent_credit() {
        let profile = SiteProfile::new(TuitionPick::SecondOrFirst)
            .per_credit()
            .delivery(re(r"(?i)\b(?:on[-\s]?campus|hybrid|online)\b"), DeliveryLabel::Matched);

        let page = Page::parse("<p>Application fee $75. Tuition $2,012 per credit. Hybrid.</p>");
        let fields = profile.extract(&page);
        assert_eq!(fields.total_tuition.as_deref(), Some("$2,012"));
        assert_eq!(fields.cost_per_credit_hour.as_deref(), Some("$2,012"));
        assert_eq!(fields.delivery_mode.as_deref(), Some("Hybrid"));

        let single = Page::parse("<p>Tuition $48,000</p>");
        assert_eq!(profile.extract(&single).total_tuition.as_deref(), Some("$48,000"));
    }

    #[test]
    fn test_site_profile_unmatched_is_absent() {
        let profile = SiteProfile::new(TuitionPick::First)
            .degree(re(r"(?i)\bm\.?p\.?p\b"), "M.P.P.")
            .duration(re(r"(?i)\b(?P<n>\d+)\s*(?P<unit>year)"));
        let fields = profile.extract(&Page::parse("<p>Nothing relevant here.</p>"));
        assert_eq!(fields, ExtractedFields::default());
    }
}
