//! End-to-end runs of the enrichment pipeline against in-memory pages.

mod helpers;

use competitor_enrich::Stage;
use competitor_enrich::resolver::UrlResolver;
use competitor_enrich::roster::read_roster;
use helpers::{FakeWeb, make_enricher, make_mapping, make_record};

const HARVARD: &str = "Harvard Graduate School of Education";
const HARVARD_URL: &str = "https://www.gse.harvard.edu/masters/ep";

#[tokio::test]
async fn harvard_override_yields_fixed_answers() {
    let dir = tempfile::tempdir().unwrap();
    let web = FakeWeb::new(&[(HARVARD_URL, "<html><body><h1>Ed.M. Education Policy</h1></body></html>")]);
    let enricher = make_enricher(
        vec![make_mapping(HARVARD, "Education Policy", HARVARD_URL)],
        web.clone(),
        dir.path(),
    );

    let input = make_record(HARVARD, "Education Policy");
    let result = enricher.enrich(std::slice::from_ref(&input)).await.unwrap();

    let merged = &result.merged[0];
    assert_eq!(merged.degree_type.as_deref(), Some("Master's"));
    assert_eq!(merged.total_tuition.as_deref(), Some("$52,032"));
    assert_eq!(merged.delivery_mode.as_deref(), Some("On-campus"));
    assert_eq!(merged.accreditation.as_deref(), Some("Regionally Accredited"));
    assert_eq!(merged.source_url.as_deref(), Some(HARVARD_URL));
    assert_eq!(merged.internal, input);
    assert_eq!(merged.internal.app_percentile, "94%");
    assert_eq!(web.requested(), vec![HARVARD_URL.to_string()]);
}

#[tokio::test]
async fn zero_mappings_keeps_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let web = FakeWeb::default();
    let enricher = make_enricher(vec![], web.clone(), dir.path());

    let roster = vec![
        make_record(HARVARD, "Education Policy"),
        make_record("Duke University", "Public Policy"),
        make_record("University of Michigan [Ann Arbor]", "Education Policy"),
    ];
    let result = enricher.enrich(&roster).await.unwrap();

    assert_eq!(result.merged.len(), roster.len());
    for (merged, input) in result.merged.iter().zip(&roster) {
        assert_eq!(&merged.internal, input);
        assert!(!merged.has_scraped_data());
        assert_eq!(merged.accreditation, None);
    }
    assert_eq!(result.summary.total_records, 3);
    assert_eq!(result.summary.records_with_scraped_data, 0);
    assert!(web.requested().is_empty());
}

#[tokio::test]
async fn latest_artifacts_track_the_latest_run() {
    let dir = tempfile::tempdir().unwrap();
    let enricher = make_enricher(vec![], FakeWeb::default(), dir.path());

    let roster = vec![
        make_record("Duke University", "Public Policy"),
        make_record("Vanderbilt University", "Higher Education"),
    ];
    enricher.enrich(&roster).await.unwrap();
    let second = enricher.enrich(&roster[..1]).await.unwrap();

    let files = second.summary.output_files.expect("output paths reported");
    assert!(files.json.exists());
    assert!(files.csv.exists());

    let latest_json = dir.path().join("external_competitors_latest.json");
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&latest_json).unwrap()).unwrap();
    assert_eq!(value["metadata"]["totalRecords"], 1);
    assert_eq!(value["competitors"].as_array().unwrap().len(), 1);

    let latest_csv = std::fs::read_to_string(dir.path().join("external_competitors_latest.csv")).unwrap();
    // header plus one row
    assert_eq!(latest_csv.lines().count(), 2);
}

#[tokio::test]
async fn failed_run_leaves_previous_latest_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let enricher = make_enricher(vec![], FakeWeb::default(), dir.path());
    enricher
        .enrich(&[make_record("Duke University", "Public Policy")])
        .await
        .unwrap();

    let latest_json = dir.path().join("external_competitors_latest.json");
    let before = std::fs::read(&latest_json).unwrap();

    let err = enricher.enrich(&[]).await.unwrap_err();
    assert_eq!(err.stage, Stage::CsvReading);
    assert_eq!(std::fs::read(&latest_json).unwrap(), before);
}

#[tokio::test]
async fn roster_and_mapping_files_drive_a_run() {
    let dir = tempfile::tempdir().unwrap();
    let roster_path = dir.path().join("roster.csv");
    std::fs::write(
        &roster_path,
        "Program,cip_codes_used,Institution,app_percentile,admissibility_percentile,win_percentile,overall_percentile\n\
         Education Policy,13.0401,Harvard Graduate School of Education,94%,12%,67%,81%\n\
         Public Policy,44.0501,Duke University,70%,30%,50%,60%\n",
    )
    .unwrap();
    let mapping_path = dir.path().join("urlMapping.json");
    std::fs::write(
        &mapping_path,
        format!(
            r#"[{{"institution": "{HARVARD}", "programName": "Education Policy", "url": "{HARVARD_URL}"}},
                {{"institution": "Duke University", "programName": "Public Policy", "url": "ftp://duke.example/mpp"}}]"#
        ),
    )
    .unwrap();

    let resolver = UrlResolver::load(&mapping_path);
    // the ftp entry is dropped at load time
    assert_eq!(resolver.len(), 1);

    let roster = read_roster(&roster_path).unwrap();
    let web = FakeWeb::new(&[(HARVARD_URL, "<p>Program page</p>")]);
    let enricher = make_enricher(resolver.mappings().to_vec(), web, &dir.path().join("out"));
    let result = enricher.enrich(&roster).await.unwrap();

    assert_eq!(result.merged.len(), 2);
    assert_eq!(result.summary.records_with_scraped_data, 1);
    assert_eq!(result.merged[0].cost_per_credit_hour.as_deref(), Some("$2,168"));
    assert!(!result.merged[1].has_scraped_data());
}

#[tokio::test]
async fn unreadable_mapping_store_means_no_scraping() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = UrlResolver::load(&dir.path().join("missing.json"));
    assert!(resolver.is_empty());

    let web = FakeWeb::default();
    let enricher = make_enricher(resolver.mappings().to_vec(), web.clone(), dir.path());
    let result = enricher
        .enrich(&[make_record(HARVARD, "Education Policy")])
        .await
        .unwrap();
    assert_eq!(result.merged.len(), 1);
    assert!(!result.merged[0].has_scraped_data());
    assert!(web.requested().is_empty());
}
