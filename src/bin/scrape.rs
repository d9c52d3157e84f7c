use anyhow::Result;
use pollscraper::{
    config::{select_sources, Settings},
    fetch::build_client,
    logging, pipeline,
};
use std::{env, process::ExitCode};
use tracing::{error, info};

/// Fetch each selected source page and write its raw CSV.
/// Usage: scrape [SOURCE_KEY ...]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    logging::init();

    let settings = Settings::from_env()?;
    let keys: Vec<String> = env::args().skip(1).collect();
    let sources = select_sources(settings.load_sources()?, &keys)?;
    let client = build_client(&settings.user_agent)?;

    let mut failures = 0;
    for source in &sources {
        match pipeline::scrape_source(&client, source, &settings).await {
            Ok(window) => info!(
                source = %source.key,
                found = ?window.found,
                kept = ?window.kept,
                "raw CSV written"
            ),
            Err(e) => {
                error!(source = %source.key, error = %format!("{e:#}"), "scrape failed");
                failures += 1;
            }
        }
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
