use anyhow::Result;
use chrono::Local;
use pollscraper::{
    config::{select_sources, Settings},
    fetch::build_client,
    logging, pipeline,
};
use std::{env, process::ExitCode};
use tracing::{error, info};

/// Scrape and clean every selected source, then rebuild the dashboard.
/// Usage: pollscraper [SOURCE_KEY ...]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init();
    info!("startup");

    // ─── 2) settings + sources ───────────────────────────────────────
    let settings = Settings::from_env()?;
    let keys: Vec<String> = env::args().skip(1).collect();
    let sources = select_sources(settings.load_sources()?, &keys)?;
    info!(
        sources = sources.len(),
        data_dir = %settings.data_dir.display(),
        "configured"
    );

    // ─── 3) scrape → clean, one source at a time ─────────────────────
    let client = build_client(&settings.user_agent)?;
    let mut failed = Vec::new();
    for source in &sources {
        if let Err(e) = pipeline::run_source(&client, source, &settings).await {
            error!(source = %source.key, error = %format!("{e:#}"), "source failed; skipping");
            failed.push(source.key.clone());
        }
    }

    // ─── 4) dashboard from whatever cleaned data exists ──────────────
    let rendered = pipeline::build_dashboard(&sources, &settings, Local::now().date_naive())?;
    info!(countries = rendered, "all done");

    if failed.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        error!(?failed, "some sources failed");
        Ok(ExitCode::FAILURE)
    }
}
