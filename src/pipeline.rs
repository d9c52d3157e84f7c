// src/pipeline.rs

//! Stage orchestration. Every stage receives its input and output paths
//! explicitly; the only state shared between stages is the filesystem.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Client;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::clean::{clean_table, read_clean_csv, write_clean_csv, CleanStats, CleanedTable};
use crate::config::{CleanConfig, Settings, SourceConfig};
use crate::dashboard::{render_dashboard, write_dashboard};
use crate::extract::{extract_source, read_raw_csv, write_raw_csv, YearWindow};
use crate::fetch::fetch_page;

/// Extract the poll table from an already fetched page and write it as the
/// raw CSV at `raw_path`.
#[instrument(level = "info", skip(html, source), fields(source = %source.key))]
pub fn scrape_html(
    html: &str,
    source: &SourceConfig,
    years_to_keep: usize,
    raw_path: &Path,
) -> Result<YearWindow> {
    let (raw, window) = extract_source(html, source, years_to_keep)?;
    write_raw_csv(raw_path, &raw)?;
    info!(rows = raw.rows.len(), columns = raw.header.len(), "scraped");
    Ok(window)
}

/// Fetch the source page and write its raw CSV under the data directory.
#[instrument(level = "info", skip_all, fields(source = %source.key))]
pub async fn scrape_source(
    client: &Client,
    source: &SourceConfig,
    settings: &Settings,
) -> Result<YearWindow> {
    let html = fetch_page(client, &source.url).await?;
    scrape_html(
        &html,
        source,
        settings.years_to_keep,
        &settings.raw_csv_path(&source.key),
    )
}

/// Raw CSV → cleaned CSV.
#[instrument(level = "info", skip(config), fields(raw = %raw_path.display()))]
pub fn clean_source(
    raw_path: &Path,
    clean_path: &Path,
    config: &CleanConfig,
) -> Result<CleanStats> {
    let raw = read_raw_csv(raw_path)?;
    let (table, stats) = clean_table(&raw, config);
    write_clean_csv(clean_path, &table)?;
    Ok(stats)
}

/// Scrape then clean one source.
pub async fn run_source(client: &Client, source: &SourceConfig, settings: &Settings) -> Result<()> {
    scrape_source(client, source, settings)
        .await
        .with_context(|| format!("scraping {}", source.key))?;
    let stats = clean_source(
        &settings.raw_csv_path(&source.key),
        &settings.clean_csv_path(&source.key),
        &source.clean,
    )
    .with_context(|| format!("cleaning {}", source.key))?;
    info!(source = %source.key, kept = stats.rows_out, "source done");
    Ok(())
}

/// Cleaned tables of every source that has one on disk. Missing or
/// unreadable files are logged and skipped.
pub fn load_cleaned(
    sources: &[SourceConfig],
    settings: &Settings,
) -> Vec<(SourceConfig, CleanedTable)> {
    sources
        .iter()
        .filter_map(|source| {
            let path = settings.clean_csv_path(&source.key);
            if !path.exists() {
                warn!(
                    source = %source.key,
                    path = %path.display(),
                    "no cleaned CSV; leaving it off the dashboard"
                );
                return None;
            }
            let numeric_lead = source.clean.lead.as_ref().map_or(false, |l| l.numeric);
            match read_clean_csv(&path, numeric_lead) {
                Ok(table) => Some((source.clone(), table)),
                Err(e) => {
                    warn!(
                        source = %source.key,
                        error = %format!("{e:#}"),
                        "skipping unreadable cleaned CSV"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Build the dashboard from whatever cleaned CSVs exist. Returns the number
/// of countries rendered.
#[instrument(level = "info", skip_all, fields(path = %settings.dashboard_path.display()))]
pub fn build_dashboard(
    sources: &[SourceConfig],
    settings: &Settings,
    generated: NaiveDate,
) -> Result<usize> {
    let countries = load_cleaned(sources, settings);
    if countries.is_empty() {
        warn!("no cleaned data available; dashboard will only show the map");
    }
    let html = render_dashboard(&countries, settings.latest_polls, generated);
    write_dashboard(&settings.dashboard_path, &html)?;
    Ok(countries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::POLLSTER_COLUMN;
    use crate::config::{
        CellScope, DateColumn, DropPolicy, PartyStyle, RowConfig, TableMatch, YearStrategy,
    };
    use crate::error::ScrapeError;
    use crate::fetch::build_client;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    use url::Url;

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,pollscraper=debug")),
            )
            .with_test_writer()
            .finish();
        // Another test may have installed it already.
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const PAGE: &str = r#"
<html><body>
<table class="wikitable">
  <tr><th>Polling firm</th><th>Fieldwork date</th><th>Sample size</th><th>PartyA</th><th>PartyB</th></tr>
  <tr><td>Forsa[1]</td><td data-sort-value="2025-12-11">9–11 Dec</td><td>1,502</td><td>30.5%</td><td>20</td></tr>
  <tr><td>INSA[2]</td><td data-sort-value="2024-03-05">5 Mar</td><td>2,004</td><td>28</td><td>–</td></tr>
  <tr><td>GMS</td><td data-sort-value="2023-06-01">1 Jun</td><td>1,000</td><td>27</td><td>22</td></tr>
  <tr><td>Kantar[3]</td><td data-sort-value="2022-02-14">14 Feb</td><td>1,400</td><td>26</td><td>23</td></tr>
  <tr><td>Ipsos</td><td data-sort-value="2021-09-20">20 Sep</td><td>998.6</td><td>25</td><td>24</td></tr>
  <tr><td>Allensbach[4]</td><td data-sort-value="2020-01-10">10 Jan</td><td>1,100</td><td>24</td><td>25</td></tr>
</table>
</body></html>"#;

    fn synthetic_source(url: Url) -> SourceConfig {
        SourceConfig {
            key: "xx".into(),
            country: "Testland".into(),
            iso_numeric: 999,
            url,
            tables: TableMatch {
                markers: vec!["Polling firm".into(), "Sample size".into()],
                max_tables: None,
            },
            rows: RowConfig {
                header_skip: 0,
                cells: CellScope::All,
                year_chain: vec![YearStrategy::SortValue { cell: None }],
                date_column: Some(DateColumn {
                    header: "Fieldwork date".into(),
                    fallback_index: 1,
                }),
            },
            clean: CleanConfig {
                pollster_column: "Polling firm".into(),
                pollster_markers: vec!['['],
                fieldwork_column: "Fieldwork date".into(),
                sample_size_column: "Sample size".into(),
                party_columns: vec!["PartyA".into(), "PartyB".into()],
                lead: None,
                renames: BTreeMap::new(),
                strip_question_marks: false,
                policy: DropPolicy::RequireSampleSizeAndDate,
            },
            palette: vec![PartyStyle {
                party: "PartyA".into(),
                color: "#123456".into(),
                label: "Party A".into(),
            }],
        }
    }

    fn settings(dir: &Path) -> Settings {
        Settings {
            data_dir: dir.join("data"),
            dashboard_path: dir.join("dashboard").join("index.html"),
            ..Settings::default()
        }
    }

    fn offline_url() -> Url {
        Url::parse("http://127.0.0.1:9/").unwrap()
    }

    #[test]
    fn synthetic_table_goes_all_the_way_to_cleaned_csv() -> Result<()> {
        init_test_logging();
        let tmp = tempdir()?;
        let settings = settings(tmp.path());
        let source = synthetic_source(offline_url());
        let raw_path = settings.raw_csv_path(&source.key);
        let clean_path = settings.clean_csv_path(&source.key);

        let window = scrape_html(PAGE, &source, 5, &raw_path)?;
        assert_eq!(window.found, vec![2025, 2024, 2023, 2022, 2021, 2020]);
        assert_eq!(window.kept, vec![2025, 2024, 2023, 2022, 2021]);

        let stats = clean_source(&raw_path, &clean_path, &source.clean)?;
        assert_eq!(stats.rows_in, 5);
        assert_eq!(stats.rows_out, 5);

        let cleaned = read_clean_csv(&clean_path, true)?;
        assert_eq!(cleaned.parties, vec!["PartyA", "PartyB"]);
        let pollsters: Vec<&str> = cleaned.records.iter().map(|r| r.pollster.as_str()).collect();
        assert_eq!(pollsters, vec!["Forsa", "INSA", "GMS", "Kantar", "Ipsos"]);

        let first = &cleaned.records[0];
        assert_eq!(first.date_conducted, NaiveDate::from_ymd_opt(2025, 12, 11));
        assert_eq!(first.sample_size, Some(1502));
        assert_eq!(first.shares, vec![Some(30.5), Some(20.0)]);
        assert_eq!(cleaned.records[1].shares, vec![Some(28.0), None]);
        assert_eq!(cleaned.records[4].sample_size, Some(999));

        let text = fs::read_to_string(&clean_path)?;
        let header = format!("Date_conducted,{POLLSTER_COLUMN},Sample_size,PartyA,PartyB\n");
        assert!(text.starts_with(&header));
        assert!(!text.contains("Allensbach"));
        Ok(())
    }

    #[test]
    fn page_without_matching_table_writes_nothing() -> Result<()> {
        let tmp = tempdir()?;
        let settings = settings(tmp.path());
        let source = synthetic_source(offline_url());
        let raw_path = settings.raw_csv_path(&source.key);

        let err = scrape_html(
            "<table class=\"wikitable\"><tr><th>Other</th></tr></table>",
            &source,
            5,
            &raw_path,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::NoTablesFound { .. })
        ));
        assert!(!raw_path.exists());
        Ok(())
    }

    #[test]
    fn dashboard_skips_sources_without_cleaned_data() -> Result<()> {
        let tmp = tempdir()?;
        let settings = settings(tmp.path());
        let present = synthetic_source(offline_url());
        let mut absent = synthetic_source(offline_url());
        absent.key = "yy".into();

        scrape_html(PAGE, &present, 5, &settings.raw_csv_path(&present.key))?;
        clean_source(
            &settings.raw_csv_path(&present.key),
            &settings.clean_csv_path(&present.key),
            &present.clean,
        )?;

        let rendered = build_dashboard(
            &[present, absent],
            &settings,
            NaiveDate::from_ymd_opt(2025, 12, 12).unwrap(),
        )?;
        assert_eq!(rendered, 1);

        let html = fs::read_to_string(&settings.dashboard_path)?;
        assert!(html.contains("<section id=\"xx\">"));
        assert!(!html.contains("<section id=\"yy\">"));
        assert!(html.contains("Testland Polling Trends (Updated on 11 Dec 2025)"));
        Ok(())
    }

    /// Answer one GET with `body`.
    async fn serve_page(body: String) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/wiki/Polls")).unwrap()
    }

    #[tokio::test]
    async fn run_source_fetches_scrapes_and_cleans() -> Result<()> {
        init_test_logging();
        let tmp = tempdir()?;
        let settings = settings(tmp.path());
        let source = synthetic_source(serve_page(PAGE.to_string()).await);
        let client = build_client(&settings.user_agent)?;

        run_source(&client, &source, &settings).await?;

        assert!(settings.raw_csv_path("xx").exists());
        let cleaned = read_clean_csv(&settings.clean_csv_path("xx"), true)?;
        assert_eq!(cleaned.records.len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_source_fails_without_output() -> Result<()> {
        let tmp = tempdir()?;
        let settings = settings(tmp.path());
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);
        let source = synthetic_source(Url::parse(&format!("http://{addr}/"))?);
        let client = build_client(&settings.user_agent)?;

        let err = run_source(&client, &source, &settings).await.unwrap_err();
        assert!(format!("{err:#}").contains("scraping xx"));
        assert!(!settings.clean_csv_path("xx").exists());
        Ok(())
    }
}
