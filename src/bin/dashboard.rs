use anyhow::Result;
use chrono::Local;
use pollscraper::{
    config::{select_sources, Settings},
    logging, pipeline,
};
use std::env;
use tracing::info;

/// Rebuild the dashboard from the cleaned CSVs on disk.
/// Usage: dashboard [SOURCE_KEY ...]
fn main() -> Result<()> {
    logging::init();

    let settings = Settings::from_env()?;
    let keys: Vec<String> = env::args().skip(1).collect();
    let sources = select_sources(settings.load_sources()?, &keys)?;

    let rendered = pipeline::build_dashboard(&sources, &settings, Local::now().date_naive())?;
    info!(
        countries = rendered,
        path = %settings.dashboard_path.display(),
        "dashboard written"
    );
    Ok(())
}
