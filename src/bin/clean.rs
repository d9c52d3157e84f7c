use anyhow::Result;
use pollscraper::{
    config::{select_sources, Settings},
    logging, pipeline,
};
use std::{env, process::ExitCode};
use tracing::{error, info};

/// Turn each selected source's raw CSV into its cleaned CSV.
/// Usage: clean [SOURCE_KEY ...]
fn main() -> Result<ExitCode> {
    logging::init();

    let settings = Settings::from_env()?;
    let keys: Vec<String> = env::args().skip(1).collect();
    let sources = select_sources(settings.load_sources()?, &keys)?;

    let mut failures = 0;
    for source in &sources {
        let raw = settings.raw_csv_path(&source.key);
        let clean = settings.clean_csv_path(&source.key);
        match pipeline::clean_source(&raw, &clean, &source.clean) {
            Ok(stats) => info!(
                source = %source.key,
                rows_in = stats.rows_in,
                rows_out = stats.rows_out,
                "cleaned CSV written"
            ),
            Err(e) => {
                error!(source = %source.key, error = %format!("{e:#}"), "clean failed");
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
