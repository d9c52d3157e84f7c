// src/extract/rows.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use tracing::{debug, trace};

use super::year::{infer_year, RowView};
use super::{element_text, record_cells, RawPollRow};
use crate::config::{CellScope, RowConfig};
use crate::error::ScrapeError;

static TR_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());

/// Header plus every row that produced a year, before the year window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub header: Vec<String>,
    pub rows: Vec<RawPollRow>,
}

/// Pad with empty cells or truncate so the row is exactly `width` wide.
pub fn fit_to_header(mut cells: Vec<String>, width: usize) -> Vec<String> {
    cells.resize(width, String::new());
    cells
}

/// Walk the rows of every selected table in document order.
///
/// The header is captured once, from the first header-like row after
/// `header_skip` of them; later header-like rows are ignored. Rows without
/// `<td>` cells, rows missing their date text, and rows no year strategy
/// can date are dropped silently.
pub fn extract_rows(
    tables: &[ElementRef<'_>],
    config: &RowConfig,
    source_key: &str,
) -> Result<Extraction, ScrapeError> {
    let mut header: Option<Vec<String>> = None;
    let mut date_idx: Option<usize> = None;
    let mut skipped_headers = 0usize;
    let mut rows = Vec::new();
    let mut discarded = 0usize;

    for table in tables {
        for tr in table.select(&TR_SEL) {
            let (ths, tds) = count_cells(tr);

            if ths > 0 && tds == 0 {
                if header.is_none() {
                    if skipped_headers < config.header_skip {
                        skipped_headers += 1;
                        continue;
                    }
                    let captured: Vec<String> = record_cells(tr, CellScope::All)
                        .into_iter()
                        .map(element_text)
                        .collect();
                    date_idx = resolve_date_idx(config, Some(&captured));
                    trace!(?captured, ?date_idx, "captured header");
                    header = Some(captured);
                }
                continue;
            }
            if tds == 0 {
                continue;
            }

            let cells = record_cells(tr, config.cells);
            if cells.is_empty() {
                continue;
            }
            let texts: Vec<String> = cells.iter().map(|c| element_text(*c)).collect();

            let width = match &header {
                Some(h) => h.len(),
                None => {
                    let synthetic: Vec<String> =
                        (0..texts.len()).map(|i| format!("col_{i}")).collect();
                    date_idx = resolve_date_idx(config, None);
                    debug!(width = synthetic.len(), "no header row seen; synthesised one");
                    let width = synthetic.len();
                    header = Some(synthetic);
                    width
                }
            };

            if config.date_column.is_some() {
                match date_idx.and_then(|i| texts.get(i)) {
                    Some(text) if !text.is_empty() => {}
                    _ => {
                        discarded += 1;
                        continue;
                    }
                }
            }

            let view = RowView {
                row: tr,
                cells: &cells,
                texts: &texts,
                date_idx,
            };
            let Some(year) = infer_year(&config.year_chain, &view) else {
                discarded += 1;
                continue;
            };

            rows.push(RawPollRow {
                year,
                cells: fit_to_header(texts, width),
            });
        }
    }

    if rows.is_empty() {
        return Err(ScrapeError::NoDataRows {
            source_key: source_key.to_string(),
        });
    }
    debug!(
        source = source_key,
        kept = rows.len(),
        discarded,
        "extracted data rows"
    );
    Ok(Extraction {
        header: header.unwrap_or_default(),
        rows,
    })
}

fn count_cells(tr: ElementRef<'_>) -> (usize, usize) {
    tr.children()
        .filter_map(ElementRef::wrap)
        .fold((0, 0), |(th, td), el| match el.value().name() {
            "th" => (th + 1, td),
            "td" => (th, td + 1),
            _ => (th, td),
        })
}

fn resolve_date_idx(config: &RowConfig, header: Option<&[String]>) -> Option<usize> {
    let date = config.date_column.as_ref()?;
    header
        .and_then(|h| h.iter().position(|c| c == &date.header))
        .or(Some(date.fallback_index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DateColumn, TableMatch, YearStrategy};
    use crate::extract::select::select_tables;
    use scraper::Html;

    fn any_table() -> TableMatch {
        TableMatch::default()
    }

    fn run(html: &str, config: &RowConfig) -> Result<Extraction, ScrapeError> {
        let doc = Html::parse_document(html);
        let tables = select_tables(&doc, &any_table(), "t")?;
        extract_rows(&tables, config, "t")
    }

    fn data_only_sort_value(cell: usize) -> RowConfig {
        RowConfig {
            header_skip: 0,
            cells: CellScope::DataOnly,
            year_chain: vec![YearStrategy::SortValue { cell: Some(cell) }],
            date_column: None,
        }
    }

    #[test]
    fn fit_to_header_pads_and_truncates() {
        let short = vec!["a".to_string()];
        assert_eq!(fit_to_header(short, 3), vec!["a", "", ""]);

        let long = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(fit_to_header(long, 2), vec!["a", "b"]);
    }

    #[test]
    fn every_row_matches_header_width() {
        let html = r#"<table class="wikitable">
            <tr><th>Polling firm</th><th>Fieldwork date</th><th>Sample size</th><th>A</th></tr>
            <tr><td>P1</td><td data-sort-value="2024-01-02">2 Jan</td><td>1,000</td></tr>
            <tr><td>P2</td><td data-sort-value="2024-02-02">2 Feb</td><td>900</td><td>30</td><td>extra</td></tr>
        </table>"#;
        let out = run(html, &data_only_sort_value(1)).unwrap();
        assert_eq!(out.header.len(), 4);
        assert_eq!(out.rows.len(), 2);
        assert!(out.rows.iter().all(|r| r.cells.len() == out.header.len()));
        assert_eq!(out.rows[0].cells, vec!["P1", "2 Jan", "1,000", ""]);
    }

    #[test]
    fn header_captured_once_across_tables() {
        let html = r#"
            <table class="wikitable">
              <tr><th>Polling firm</th><th>Fieldwork date</th></tr>
              <tr><td>P1</td><td data-sort-value="2025-01-01">1 Jan</td></tr>
            </table>
            <table class="wikitable">
              <tr><th>Firm</th><th>Date</th></tr>
              <tr><td>P2</td><td data-sort-value="2024-01-01">1 Jan</td></tr>
            </table>"#;
        let out = run(html, &data_only_sort_value(1)).unwrap();
        assert_eq!(out.header, vec!["Polling firm", "Fieldwork date"]);
        let years: Vec<i32> = out.rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2025, 2024]);
    }

    #[test]
    fn header_skip_uses_second_header_row() {
        let html = r#"<table class="wikitable">
            <tr><th colspan="3">Group</th></tr>
            <tr><th>Polling firm</th><th>Fieldwork date</th><th>A</th></tr>
            <tr><td>P1</td><td><span class="sortkey">2023-03-01</span>1 Mar</td><td>20</td></tr>
        </table>"#;
        let config = RowConfig {
            header_skip: 1,
            cells: CellScope::All,
            year_chain: vec![YearStrategy::SortKey],
            date_column: None,
        };
        let out = run(html, &config).unwrap();
        assert_eq!(out.header, vec!["Polling firm", "Fieldwork date", "A"]);
        assert_eq!(out.rows[0].year, 2023);
    }

    #[test]
    fn pollster_in_th_is_kept_with_all_scope() {
        let html = r#"<table class="wikitable">
            <tr><th>Polling firm</th><th>Fieldwork date</th><th>Lead</th></tr>
            <tr><th>Market</th><td>8–9 Dec 2025</td><td>5</td></tr>
        </table>"#;
        let config = RowConfig {
            header_skip: 0,
            cells: CellScope::All,
            year_chain: vec![YearStrategy::DateText],
            date_column: Some(DateColumn {
                header: "Fieldwork date".into(),
                fallback_index: 1,
            }),
        };
        let out = run(html, &config).unwrap();
        assert_eq!(out.rows[0].cells, vec!["Market", "8–9 Dec 2025", "5"]);
        assert_eq!(out.rows[0].year, 2025);
    }

    #[test]
    fn rows_without_year_or_date_are_dropped() {
        let html = r#"<table class="wikitable">
            <tr><th>Polling firm</th><th>Fieldwork date</th></tr>
            <tr><td>Average</td><td></td></tr>
            <tr><td>P1</td><td>sometime</td></tr>
            <tr><td>P2</td><td>3 May 2022</td></tr>
        </table>"#;
        let config = RowConfig {
            header_skip: 0,
            cells: CellScope::All,
            year_chain: vec![YearStrategy::DateText],
            date_column: Some(DateColumn {
                header: "Fieldwork date".into(),
                fallback_index: 1,
            }),
        };
        let out = run(html, &config).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].cells[0], "P2");
    }

    #[test]
    fn synthesises_header_when_none_seen() {
        let html = r#"<table class="wikitable">
            <tr><th>x</th><td>P1</td><td>2021</td></tr>
        </table>"#;
        let config = RowConfig {
            header_skip: 0,
            cells: CellScope::All,
            year_chain: vec![YearStrategy::RowText],
            date_column: None,
        };
        let out = run(html, &config).unwrap();
        assert_eq!(out.header, vec!["col_0", "col_1", "col_2"]);
        assert_eq!(out.rows[0].year, 2021);
    }

    #[test]
    fn zero_surviving_rows_is_fatal() {
        let html = r#"<table class="wikitable">
            <tr><th>Polling firm</th><th>Fieldwork date</th></tr>
            <tr><td>P1</td><td>undated</td></tr>
        </table>"#;
        let err = run(html, &data_only_sort_value(1)).unwrap_err();
        assert!(matches!(err, ScrapeError::NoDataRows { .. }));
    }
}
