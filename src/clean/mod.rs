// src/clean/mod.rs

//! Field Cleaner: raw scraped cells → canonical, typed poll records.

pub mod clean_csv;
pub mod fields;

use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::{CleanConfig, DropPolicy};
use crate::extract::RawTable;

pub use clean_csv::{read_clean_csv, write_clean_csv};
pub use fields::{conducted_date, parse_numeric, parse_sample_size, strip_pollster};

pub const DATE_COLUMN: &str = "Date_conducted";
pub const POLLSTER_COLUMN: &str = "Pollster";
pub const SAMPLE_SIZE_COLUMN: &str = "Sample_size";
pub const LEAD_COLUMN: &str = "Lead";

/// Lead margin: numeric when the source's lead column is coerced, free
/// text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Lead {
    Margin(f64),
    Label(String),
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lead::Margin(v) => write!(f, "{v}"),
            Lead::Label(s) => f.write_str(s),
        }
    }
}

/// One poll event.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedPollRecord {
    pub date_conducted: Option<NaiveDate>,
    pub pollster: String,
    pub sample_size: Option<u64>,
    /// One share per party of the owning [`CleanedTable`], same order.
    pub shares: Vec<Option<f64>>,
    pub lead: Option<Lead>,
}

/// Cleaned polls of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    /// Canonical party column names.
    pub parties: Vec<String>,
    pub has_lead: bool,
    pub records: Vec<CleanedPollRecord>,
}

impl CleanedTable {
    pub fn party_index(&self, party: &str) -> Option<usize> {
        self.parties.iter().position(|p| p == party)
    }

    /// Share of `party` in `record`, if the party is tracked and polled.
    pub fn share(&self, record: &CleanedPollRecord, party: &str) -> Option<f64> {
        self.party_index(party)
            .and_then(|i| record.shares.get(i).copied().flatten())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanStats {
    pub rows_in: usize,
    pub rows_out: usize,
    pub missing_sample_size: usize,
    pub missing_date: usize,
}

/// Apply the source's cleaning rules to a raw table.
///
/// Party and lead columns that the raw header lacks are skipped silently.
/// Columns not named by `config` (method, client, area, ...) are dropped.
pub fn clean_table(raw: &RawTable, config: &CleanConfig) -> (CleanedTable, CleanStats) {
    let col = |name: &str| raw.header.iter().position(|h| h == name);

    let pollster_idx = col(config.pollster_column.as_str());
    let fieldwork_idx = col(config.fieldwork_column.as_str());
    let sample_idx = col(config.sample_size_column.as_str());
    for (what, idx, name) in [
        ("pollster", pollster_idx, &config.pollster_column),
        ("fieldwork", fieldwork_idx, &config.fieldwork_column),
        ("sample size", sample_idx, &config.sample_size_column),
    ] {
        if idx.is_none() {
            warn!(column = %name, "raw header has no {what} column");
        }
    }

    let party_cols: Vec<(usize, String)> = config
        .party_columns
        .iter()
        .filter_map(|p| col(p.as_str()).map(|i| (i, config.canonical_name(p).to_string())))
        .collect();
    let lead_col = config
        .lead
        .as_ref()
        .and_then(|l| col(l.column.as_str()).map(|i| (i, l.numeric)));

    let strip_q = config.strip_question_marks;
    let cell = |cells: &[String], idx: Option<usize>| -> String {
        idx.and_then(|i| cells.get(i)).cloned().unwrap_or_default()
    };

    let mut stats = CleanStats {
        rows_in: raw.rows.len(),
        ..CleanStats::default()
    };
    let mut records = Vec::with_capacity(raw.rows.len());

    for row in &raw.rows {
        let sample_size = parse_sample_size(&cell(&row.cells, sample_idx), strip_q);
        let date_conducted = conducted_date(&cell(&row.cells, fieldwork_idx), row.year);

        let keep = match config.policy {
            DropPolicy::RequireSampleSize => sample_size.is_some(),
            DropPolicy::RequireSampleSizeAndDate => {
                sample_size.is_some() && date_conducted.is_some()
            }
        };
        if sample_size.is_none() {
            stats.missing_sample_size += 1;
        }
        if date_conducted.is_none() {
            stats.missing_date += 1;
        }
        if !keep {
            continue;
        }

        let shares = party_cols
            .iter()
            .map(|(i, _)| row.cells.get(*i).and_then(|c| parse_numeric(c, strip_q)))
            .collect();
        let lead = lead_col.and_then(|(i, numeric)| {
            let text = row.cells.get(i)?;
            if numeric {
                parse_numeric(text, strip_q).map(Lead::Margin)
            } else {
                let text = text.trim();
                (!text.is_empty()).then(|| Lead::Label(text.to_string()))
            }
        });

        records.push(CleanedPollRecord {
            date_conducted,
            pollster: strip_pollster(&cell(&row.cells, pollster_idx), &config.pollster_markers),
            sample_size,
            shares,
            lead,
        });
    }

    stats.rows_out = records.len();
    debug!(?stats, "cleaned raw table");
    if stats.rows_out < stats.rows_in {
        info!(
            dropped = stats.rows_in - stats.rows_out,
            policy = ?config.policy,
            "dropped rows failing the drop policy"
        );
    }

    let table = CleanedTable {
        parties: party_cols.into_iter().map(|(_, name)| name).collect(),
        has_lead: lead_col.is_some(),
        records,
    };
    (table, stats)
}
