//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use competitor_enrich::error::FetchError;
use competitor_enrich::extract::FieldExtractor;
use competitor_enrich::fetch::{ContentFetcher, PageSource};
use competitor_enrich::output::OutputWriter;
use competitor_enrich::resolver::UrlResolver;
use competitor_enrich::{Enricher, InternalRecord, UrlMapping};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory pages keyed by URL; unknown URLs fail with a 404.
#[derive(Default, Clone)]
pub struct FakeWeb {
    pages: Arc<HashMap<String, String>>,
    pub requested: Arc<Mutex<Vec<String>>>,
}

impl FakeWeb {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
            ),
            requested: Arc::default(),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for FakeWeb {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            status: 404,
            url: url.to_string(),
        })
    }
}

pub fn make_record(institution: &str, program: &str) -> InternalRecord {
    InternalRecord {
        program: program.to_owned(),
        cip_codes_used: "13.0401".to_owned(),
        institution: institution.to_owned(),
        app_percentile: "94%".to_owned(),
        admissibility_percentile: "12%".to_owned(),
        win_percentile: "67%".to_owned(),
        overall_percentile: "81%".to_owned(),
    }
}

pub fn make_mapping(institution: &str, program: &str, url: &str) -> UrlMapping {
    UrlMapping {
        institution: institution.to_owned(),
        program_name: program.to_owned(),
        url: url.to_owned(),
    }
}

/// Pipeline over `web` with built-in site profiles and no delays.
pub fn make_enricher(mappings: Vec<UrlMapping>, web: FakeWeb, out: &Path) -> Enricher {
    Enricher::new(
        UrlResolver::new(mappings),
        ContentFetcher::new(Box::new(web), None),
        FieldExtractor::default(),
        OutputWriter::new(out, "external_competitors"),
    )
    .with_delays(Duration::ZERO, Duration::ZERO)
}
