// src/dashboard/mod.rs

//! Dashboard Renderer: cleaned tables → one static HTML page with a map,
//! per-country trend charts and latest-poll tables.

pub mod leading;
pub mod long;
pub mod page;
pub mod trend;
pub mod vega;

use anyhow::Result;
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::clean::CleanedTable;
use crate::config::SourceConfig;
use crate::write::write_text_atomic;

pub use leading::{latest_polls, leading_party, row_leader, Leader};
pub use long::{to_long, LongRow};
pub use trend::{loess, trend_lines, TrendLine, LOESS_BANDWIDTH};

/// Colour of parties missing from a palette, and of an unknown leader.
pub const DEFAULT_PARTY_COLOR: &str = "#888888";
pub const DISPLAY_DATE: &str = "%d %b %Y";

/// Parties charted for a source: the palette's parties that the table
/// actually has, in palette order. Without a palette, every party except
/// `Others`.
pub fn chart_parties(source: &SourceConfig, table: &CleanedTable) -> Vec<String> {
    if source.palette.is_empty() {
        return table
            .parties
            .iter()
            .filter(|p| p.as_str() != "Others")
            .cloned()
            .collect();
    }
    source
        .palette
        .iter()
        .filter(|s| table.party_index(&s.party).is_some())
        .map(|s| s.party.clone())
        .collect()
}

/// Derived view of one source used by every dashboard element.
#[derive(Debug, Clone)]
pub struct CountrySummary<'a> {
    pub source: &'a SourceConfig,
    pub table: &'a CleanedTable,
    pub parties: Vec<String>,
    pub leader: Option<Leader>,
    /// Most recent poll date.
    pub updated: Option<NaiveDate>,
}

impl<'a> CountrySummary<'a> {
    pub fn new(source: &'a SourceConfig, table: &'a CleanedTable, latest: usize) -> Self {
        let parties = chart_parties(source, table);
        let leader = leading_party(table, &parties, latest);
        let updated = table.records.iter().filter_map(|r| r.date_conducted).max();
        CountrySummary {
            source,
            table,
            parties,
            leader,
            updated,
        }
    }

    pub fn leader_label(&self) -> Option<&str> {
        self.leader
            .as_ref()
            .map(|l| self.source.label_of(&l.party))
    }

    pub fn leader_color(&self) -> &str {
        self.leader
            .as_ref()
            .and_then(|l| self.source.color_of(&l.party))
            .unwrap_or(DEFAULT_PARTY_COLOR)
    }

    pub fn title(&self) -> String {
        match self.updated {
            Some(d) => format!(
                "{} Polling Trends (Updated on {})",
                self.source.country,
                d.format(DISPLAY_DATE)
            ),
            None => format!("{} Polling Trends", self.source.country),
        }
    }
}

/// Render the dashboard for every (source, cleaned table) pair.
#[instrument(level = "info", skip_all, fields(countries = countries.len()))]
pub fn render_dashboard(
    countries: &[(SourceConfig, CleanedTable)],
    latest: usize,
    generated: NaiveDate,
) -> String {
    let summaries: Vec<CountrySummary<'_>> = countries
        .iter()
        .map(|(source, table)| CountrySummary::new(source, table, latest))
        .collect();

    let sections: Vec<page::Section> = summaries
        .iter()
        .map(|c| {
            let note = match (&c.leader, c.leader_label()) {
                (Some(l), Some(label)) => {
                    info!(
                        source = %c.source.key,
                        leader = %l.party,
                        mean = l.mean,
                        "leading party"
                    );
                    format!("Leading over the last {latest} polls: {label} ({:.1}%)", l.mean)
                }
                _ => {
                    warn!(source = %c.source.key, "no dated polls to pick a leading party from");
                    "No recent polls".to_string()
                }
            };
            page::Section {
                key: c.source.key.clone(),
                heading: c.source.country.clone(),
                note,
                trend: vega::trend_spec(c, LOESS_BANDWIDTH),
                table: page::latest_table(c, latest),
            }
        })
        .collect();

    page::render_page(generated, &vega::map_spec(&summaries), &sections)
}

pub fn write_dashboard(path: &Path, html: &str) -> Result<()> {
    write_text_atomic(path, html)?;
    info!(path = %path.display(), bytes = html.len(), "wrote dashboard");
    Ok(())
}
