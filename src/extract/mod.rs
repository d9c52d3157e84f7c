// src/extract/mod.rs

//! Poll-table extraction: Table Selector → Row Extractor → Row Normalizer →
//! Year Window Filter, producing a [`RawTable`] ready for the raw CSV.

pub mod raw_csv;
pub mod rows;
pub mod select;
pub mod window;
pub mod year;

use scraper::{ElementRef, Html};
use tracing::{info, instrument};

use crate::config::{CellScope, SourceConfig};
use crate::error::ScrapeError;

pub use raw_csv::{read_raw_csv, write_raw_csv};
pub use rows::{extract_rows, fit_to_header, Extraction};
pub use select::{header_matches, select_tables};
pub use window::{keep_recent_years, YearWindow};

/// One poll row: visible cell texts aligned to the header, plus the year
/// inferred for it (not part of the visible cells).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPollRow {
    pub year: i32,
    pub cells: Vec<String>,
}

/// The output of one scrape: header and year-windowed rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<RawPollRow>,
}

/// Text of an element with every text node trimmed, blanks dropped, and
/// the rest joined by single spaces.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Direct `<th>`/`<td>` children of a row, filtered by `scope`.
pub fn record_cells(tr: ElementRef<'_>, scope: CellScope) -> Vec<ElementRef<'_>> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| match (el.value().name(), scope) {
            ("td", _) => true,
            ("th", CellScope::All) => true,
            _ => false,
        })
        .collect()
}

/// Run the full extraction for one source over an already fetched page.
#[instrument(level = "info", skip(html, source), fields(source = %source.key))]
pub fn extract_source(
    html: &str,
    source: &SourceConfig,
    years_to_keep: usize,
) -> Result<(RawTable, YearWindow), ScrapeError> {
    let doc = Html::parse_document(html);
    let tables = select_tables(&doc, &source.tables, &source.key)?;
    let Extraction { header, rows } = extract_rows(&tables, &source.rows, &source.key)?;

    let (rows, window) = keep_recent_years(rows, years_to_keep);
    info!(found = ?window.found, kept = ?window.kept, "year window");

    Ok((RawTable { header, rows }, window))
}
