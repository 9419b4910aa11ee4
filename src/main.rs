use clap::Parser;
use competitor_enrich::cli::{Args, Mode};
use competitor_enrich::config::Config;
use competitor_enrich::logging::setup_logging;
use competitor_enrich::roster::read_roster;
use competitor_enrich::{Enricher, PipelineError};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config before anything else so startup logs are never silently dropped
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(roster) = args.roster {
        config.roster_path = roster;
    }
    setup_logging(&config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT_SHORT"),
        mode = ?args.mode,
        roster = %config.roster_path.display(),
        mappings = %config.mapping_path.display(),
        output_dir = %config.output_dir.display(),
        "starting competitor-enrich"
    );

    let enricher = match Enricher::from_config(&config) {
        Ok(enricher) => enricher,
        Err(e) => {
            error!(error = ?e, "Failed to initialize pipeline");
            return ExitCode::FAILURE;
        }
    };

    let roster = match read_roster(&config.roster_path) {
        Ok(roster) => roster,
        Err(e) => return report(PipelineError::from(e)),
    };

    let result = match args.mode {
        Mode::PerRecord => enricher.enrich(&roster).await,
        Mode::Bulk => enricher.enrich_bulk(&roster).await,
    };

    match result {
        Ok(enrichment) => match serde_json::to_string_pretty(&enrichment.summary) {
            Ok(summary) => {
                println!("{summary}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "Failed to serialize summary");
                ExitCode::FAILURE
            }
        },
        Err(e) => report(e),
    }
}

fn report(err: PipelineError) -> ExitCode {
    error!(stage = %err.stage, error = err.message.as_str(), "Enrichment failed");
    ExitCode::FAILURE
}
