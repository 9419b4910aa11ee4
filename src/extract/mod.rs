//! Field extraction from fetched program pages.
//!
//! Extraction is looked up per institution in a [`StrategyRegistry`]; sites
//! without a registered strategy go through [`GenericStrategy`].

pub mod generic;
mod page;
mod strategy;

pub use page::{HIGHLIGHT_LIMIT, Page, truncate_with_ellipsis};
pub use strategy::{
    DeliveryLabel, ExtractionStrategy, FixedAnswers, GenericStrategy, SiteProfile, TuitionPick,
};

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, trace};

/// Placeholder reported when a page describes its curriculum. Not a lookup.
pub const ACCREDITATION_PLACEHOLDER: &str = "Regionally Accredited";

/// Attributes a strategy can pull off a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub degree_type: Option<String>,
    pub program_duration: Option<String>,
    pub cost_per_credit_hour: Option<String>,
    pub total_tuition: Option<String>,
    pub delivery_mode: Option<String>,
    pub curriculum_highlights: Option<String>,
}

impl ExtractedFields {
    /// Derived accreditation marker; present only alongside curriculum highlights.
    pub fn accreditation(&self) -> Option<String> {
        self.curriculum_highlights
            .as_ref()
            .map(|_| ACCREDITATION_PLACEHOLDER.to_string())
    }
}

/// Institution name → extraction strategy, with a generic default.
pub struct StrategyRegistry {
    by_institution: HashMap<String, Box<dyn ExtractionStrategy>>,
    fallback: Box<dyn ExtractionStrategy>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyRegistry {
    /// A registry with no overrides.
    pub fn new() -> Self {
        Self {
            by_institution: HashMap::new(),
            fallback: Box::new(GenericStrategy),
        }
    }

    /// A registry preloaded with the built-in site profiles.
    pub fn with_builtin_profiles() -> Self {
        let mut registry = Self::new();
        register_builtin_profiles(&mut registry);
        registry
    }

    /// Register (or replace) the strategy for an exact institution name.
    pub fn register(
        &mut self,
        institution: impl Into<String>,
        strategy: impl ExtractionStrategy + 'static,
    ) -> &mut Self {
        self.by_institution
            .insert(institution.into(), Box::new(strategy));
        self
    }

    pub fn has_override(&self, institution: &str) -> bool {
        self.by_institution.contains_key(institution)
    }

    pub fn get(&self, institution: &str) -> &dyn ExtractionStrategy {
        self.by_institution
            .get(institution)
            .map(|s| s.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }
}

/// Applies the registered strategy for an institution to raw markup.
pub struct FieldExtractor {
    registry: StrategyRegistry,
}

impl FieldExtractor {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    /// Extract fields for `institution` from `markup`.
    ///
    /// Empty markup means nothing was fetched, so every field is absent even
    /// for institutions with constant answers.
    pub fn extract(&self, institution: &str, markup: &str) -> ExtractedFields {
        if markup.trim().is_empty() {
            debug!(institution, "No markup to extract from");
            return ExtractedFields::default();
        }

        let page = Page::parse(markup);
        let fields = self.registry.get(institution).extract(&page);
        trace!(
            institution,
            override_strategy = self.registry.has_override(institution),
            degree_type = ?fields.degree_type,
            program_duration = ?fields.program_duration,
            cost_per_credit_hour = ?fields.cost_per_credit_hour,
            total_tuition = ?fields.total_tuition,
            delivery_mode = ?fields.delivery_mode,
            "Extracted fields"
        );
        fields
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(StrategyRegistry::with_builtin_profiles())
    }
}

static MASTER_OF_ARTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:m\.?a\b|master(?:'s)?\s+of\s+arts)").unwrap());
static MASTER_OF_SCIENCE_ED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:m\.?s\.?e\.?d?\b|master(?:'s)?\s+of\s+science)").unwrap()
});
static MASTER_OF_PUBLIC_POLICY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:m\.?p\.?p\b|master(?:'s)?\s+of\s+public\s+policy)").unwrap()
});

static YEARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?P<n>\d+)\s*(?P<unit>year)").unwrap());
static YEARS_OR_MONTHS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?P<n>\d+)\s*(?P<unit>year|month)").unwrap());
static YEARS_OR_SEMESTERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?P<n>\d+)\s*(?P<unit>year|semester)").unwrap());
static TWENTY_FOUR_MONTHS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?P<n>24)\s*(?P<unit>month)").unwrap());
static FULL_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfull[-\s]?time\b").unwrap());

static ON_CAMPUS_LIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:on[-\s]?campus|residential)\b").unwrap());
static CAMPUS_OR_HYBRID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:on[-\s]?campus|hybrid)\b").unwrap());
static CAMPUS_HYBRID_OR_ONLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:on[-\s]?campus|hybrid|online)\b").unwrap());

/// Profiles for roster institutions whose pages need site-specific handling.
fn register_builtin_profiles(registry: &mut StrategyRegistry) {
    registry.register(
        "Harvard Graduate School of Education",
        FixedAnswers(ExtractedFields {
            degree_type: Some("Master's".into()),
            program_duration: Some("1 year full-time".into()),
            cost_per_credit_hour: Some("$2,168".into()),
            total_tuition: Some("$52,032".into()),
            delivery_mode: Some("On-campus".into()),
            curriculum_highlights: Some(
                "Policy analysis, organizational leadership, data-driven decision making, quantitative methods"
                    .into(),
            ),
        }),
    );

    registry.register(
        "Stanford University",
        SiteProfile::new(TuitionPick::Last)
            .degree(MASTER_OF_ARTS_RE.clone(), "M.A.")
            .duration(YEARS_RE.clone())
            .duration(FULL_TIME_RE.clone())
            .delivery(ON_CAMPUS_LIKE_RE.clone(), DeliveryLabel::Fixed("On-campus")),
    );

    registry.register(
        "University of Pennsylvania",
        SiteProfile::new(TuitionPick::First)
            .degree(MASTER_OF_SCIENCE_ED_RE.clone(), "M.S.Ed.")
            .duration(YEARS_OR_MONTHS_RE.clone())
            .per_credit()
            .delivery(CAMPUS_HYBRID_OR_ONLINE_RE.clone(), DeliveryLabel::Matched),
    );

    registry.register(
        "Teachers College Columbia University",
        SiteProfile::new(TuitionPick::SecondOrFirst)
            .degree(MASTER_OF_ARTS_RE.clone(), "M.A.")
            .duration(YEARS_OR_SEMESTERS_RE.clone())
            .per_credit()
            .delivery(CAMPUS_OR_HYBRID_RE.clone(), DeliveryLabel::Fixed("On-campus")),
    );

    registry.register(
        "Duke University",
        SiteProfile::new(TuitionPick::First)
            .degree(MASTER_OF_PUBLIC_POLICY_RE.clone(), "M.P.P.")
            .duration(TWENTY_FOUR_MONTHS_RE.clone())
            .duration(YEARS_RE.clone())
            .delivery(ON_CAMPUS_LIKE_RE.clone(), DeliveryLabel::Fixed("On-campus")),
    );

    registry.register(
        "University of Michigan [Ann Arbor]",
        SiteProfile::new(TuitionPick::First)
            .degree(MASTER_OF_ARTS_RE.clone(), "M.A.")
            .duration(YEARS_OR_SEMESTERS_RE.clone())
            .per_credit()
            .delivery(CAMPUS_HYBRID_OR_ONLINE_RE.clone(), DeliveryLabel::Matched),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const HARVARD: &str = "Harvard Graduate School of Education";

    #[test]
    fn test_builtin_registry_has_overrides() {
        let registry = StrategyRegistry::with_builtin_profiles();
        for institution in [
            HARVARD,
            "Stanford University",
            "University of Pennsylvania",
            "Teachers College Columbia University",
            "Duke University",
            "University of Michigan [Ann Arbor]",
        ] {
            assert!(registry.has_override(institution), "{institution}");
        }
        assert!(!registry.has_override("Vanderbilt University"));
    }

    #[test]
    fn test_harvard_fixed_answers() {
        let extractor = FieldExtractor::default();
        let fields = extractor.extract(HARVARD, "<html><body>anything</body></html>");
        assert_eq!(fields.degree_type.as_deref(), Some("Master's"));
        assert_eq!(fields.total_tuition.as_deref(), Some("$52,032"));
        assert_eq!(fields.cost_per_credit_hour.as_deref(), Some("$2,168"));
        assert_eq!(fields.delivery_mode.as_deref(), Some("On-campus"));
        assert_eq!(fields.accreditation().as_deref(), Some(ACCREDITATION_PLACEHOLDER));
    }

    #[test]
    fn test_empty_markup_yields_nothing_even_with_override() {
        let extractor = FieldExtractor::default();
        let fields = extractor.extract(HARVARD, "   ");
        assert_eq!(fields, ExtractedFields::default());
        assert_eq!(fields.accreditation(), None);
    }

    #[test]
    fn test_unregistered_institution_uses_generic_rules() {
        let extractor = FieldExtractor::default();
        let fields = extractor.extract(
            "Vanderbilt University",
            "<body><p>$2,168 per credit</p><p>$52,032 total tuition</p></body>",
        );
        assert_eq!(fields.cost_per_credit_hour.as_deref(), Some("$2,168"));
        assert_eq!(fields.total_tuition.as_deref(), Some("$52,032"));
        assert_eq!(fields.accreditation(), None);
    }

    #[test]
    fn test_registration_replaces_strategy() {
        let mut registry = StrategyRegistry::new();
        registry.register(
            "Vanderbilt University",
            FixedAnswers(ExtractedFields {
                delivery_mode: Some("Hybrid".into()),
                ..Default::default()
            }),
        );
        let extractor = FieldExtractor::new(registry);
        let fields = extractor.extract("Vanderbilt University", "<p>online</p>");
        assert_eq!(fields.delivery_mode.as_deref(), Some("Hybrid"));
    }

    #[test]
    fn test_duke_prefers_month_phrasing() {
        let extractor = FieldExtractor::default();
        let fields = extractor.extract(
            "Duke University",
            "<p>The Master of Public Policy is a 2 year, 24 month residential program. Tuition $68,000.</p>",
        );
        assert_eq!(fields.degree_type.as_deref(), Some("M.P.P."));
        assert_eq!(fields.program_duration.as_deref(), Some("24 months"));
        assert_eq!(fields.delivery_mode.as_deref(), Some("On-campus"));
        assert_eq!(fields.total_tuition.as_deref(), Some("$68,000"));
        assert_eq!(fields.cost_per_credit_hour, None);
    }

    #[test]
    fn test_stanford_profile_from_fresh_registries() {
        let markup = "<p>Master of Arts, 1 year full-time, residential. \
                      Fees $1,500. Tuition $58,000.</p>";
        for _ in 0..2 {
            let fields = FieldExtractor::default().extract("Stanford University", markup);
            assert_eq!(fields.degree_type.as_deref(), Some("M.A."));
            assert_eq!(fields.program_duration.as_deref(), Some("1 year"));
            assert_eq!(fields.delivery_mode.as_deref(), Some("On-campus"));
            assert_eq!(fields.total_tuition.as_deref(), Some("$58,000"));
            assert_eq!(fields.cost_per_credit_hour, None);
        }
    }

    #[test]
    fn test_penn_matched_delivery_and_credit_price() {
        let extractor = FieldExtractor::default();
        let fields = extractor.extract(
            "University of Pennsylvania",
            "<p>M.S.Ed. in Education Policy, 12 months, online. $1,957 per credit; $39,140 total.</p>",
        );
        assert_eq!(fields.degree_type.as_deref(), Some("M.S.Ed."));
        assert_eq!(fields.program_duration.as_deref(), Some("12 months"));
        assert_eq!(fields.delivery_mode.as_deref(), Some("Online"));
        assert_eq!(fields.cost_per_credit_hour.as_deref(), Some("$1,957"));
        assert_eq!(fields.total_tuition.as_deref(), Some("$1,957"));
    }
}
