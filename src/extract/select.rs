// src/extract/select.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::element_text;
use crate::config::TableMatch;
use crate::error::ScrapeError;

static TABLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("table.wikitable").unwrap());
static TR_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static TH_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());

/// Header cell texts of the table's first row.
pub fn first_row_headers(table: ElementRef<'_>) -> Vec<String> {
    table
        .select(&TR_SEL)
        .next()
        .map(|tr| tr.select(&TH_SEL).map(element_text).collect())
        .unwrap_or_default()
}

/// A table qualifies iff its first row has header cells whose joined text
/// contains every marker. With no markers, any header cell qualifies.
pub fn header_matches(header_cells: &[String], table_match: &TableMatch) -> bool {
    if header_cells.is_empty() {
        return false;
    }
    let joined = header_cells.join(" ");
    table_match.markers.iter().all(|m| joined.contains(m.as_str()))
}

/// All poll tables of `doc`, in document order, capped at `max_tables`.
pub fn select_tables<'a>(
    doc: &'a Html,
    table_match: &TableMatch,
    source_key: &str,
) -> Result<Vec<ElementRef<'a>>, ScrapeError> {
    let mut tables: Vec<ElementRef<'a>> = doc
        .select(&TABLE_SEL)
        .filter(|table| header_matches(&first_row_headers(*table), table_match))
        .collect();

    if let Some(max) = table_match.max_tables {
        tables.truncate(max);
    }
    if tables.is_empty() {
        return Err(ScrapeError::NoTablesFound {
            source_key: source_key.to_string(),
            markers: table_match.markers.clone(),
        });
    }
    debug!(source = source_key, tables = tables.len(), "selected poll tables");
    Ok(tables)
}
