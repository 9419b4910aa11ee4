//! Static institution/program → URL lookup.

use crate::json::parse_json_with_context;
use crate::model::UrlMapping;
use std::path::Path;
use tracing::{error, info, warn};

/// Lookup table built from the hand-curated mapping store.
///
/// Keys are compared byte-for-byte: the store is maintained to mirror the
/// roster's institution and program strings exactly, so no normalization
/// happens here.
#[derive(Debug, Clone, Default)]
pub struct UrlResolver {
    mappings: Vec<UrlMapping>,
}

impl UrlResolver {
    pub fn new(mappings: Vec<UrlMapping>) -> Self {
        Self {
            mappings: mappings.into_iter().filter(is_usable).collect(),
        }
    }

    /// Load the mapping store at `path`.
    ///
    /// Never fails: an unreadable or malformed store yields an empty resolver
    /// and an error log naming the path that was tried.
    pub fn load(path: &Path) -> Self {
        let body = match std::fs::read_to_string(path) {
            Ok(body) => body,
            Err(e) => {
                error!(path = %path.display(), error = %e, "URL mapping store unreadable, continuing without mappings");
                return Self::default();
            }
        };

        match parse_json_with_context::<Vec<UrlMapping>>(&body) {
            Ok(mappings) => {
                let resolver = Self::new(mappings);
                info!(path = %path.display(), count = resolver.len(), "Loaded URL mappings");
                resolver
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "URL mapping store malformed, continuing without mappings");
                Self::default()
            }
        }
    }

    /// URL for an exact (institution, program) pair.
    pub fn resolve(&self, institution: &str, program: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.institution == institution && m.program_name == program)
            .map(|m| m.url.as_str())
    }

    pub fn mappings(&self) -> &[UrlMapping] {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

fn is_usable(mapping: &UrlMapping) -> bool {
    match url::Url::parse(&mapping.url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => true,
        Ok(u) => {
            warn!(institution = mapping.institution.as_str(), scheme = u.scheme(), "Dropping URL mapping with unsupported scheme");
            false
        }
        Err(e) => {
            warn!(institution = mapping.institution.as_str(), url = mapping.url.as_str(), error = %e, "Dropping unparsable URL mapping");
            false
        }
    }
}
