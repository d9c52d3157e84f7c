// src/extract/year.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::config::YearStrategy;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(19|20)\d{2}").unwrap());
static SORT_VALUE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("[data-sort-value]").unwrap());
static SORT_KEY_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("span.sortkey").unwrap());

/// What a year strategy may look at for one table row.
pub struct RowView<'a, 'b> {
    pub row: ElementRef<'a>,
    /// Record cells, as selected by the source's cell scope.
    pub cells: &'b [ElementRef<'a>],
    /// Visible text of `cells`, same order.
    pub texts: &'b [String],
    pub date_idx: Option<usize>,
}

/// First year matching `(19|20)\d{2}` anywhere in `text`.
pub fn find_year(text: &str) -> Option<i32> {
    YEAR_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Year from a machine-sortable value: its leading four digits when they
/// form a plausible year, else the first year found in it.
pub fn sort_value_year(value: &str) -> Option<i32> {
    let value = value.trim();
    if let Some(lead) = value.get(..4) {
        if lead.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(year) = lead.parse::<i32>() {
                if (1900..=2099).contains(&year) {
                    return Some(year);
                }
            }
        }
    }
    find_year(value)
}

/// Run `chain` in order and stop at the first strategy that yields a year.
pub fn infer_year(chain: &[YearStrategy], view: &RowView<'_, '_>) -> Option<i32> {
    chain.iter().find_map(|strategy| apply(*strategy, view))
}

fn apply(strategy: YearStrategy, view: &RowView<'_, '_>) -> Option<i32> {
    match strategy {
        YearStrategy::SortValue { cell: Some(idx) } => view
            .cells
            .get(idx)?
            .value()
            .attr("data-sort-value")
            .and_then(sort_value_year),
        YearStrategy::SortValue { cell: None } => view
            .row
            .select(&SORT_VALUE_SEL)
            .filter_map(|el| el.value().attr("data-sort-value"))
            .find_map(sort_value_year),
        YearStrategy::SortKey => view
            .row
            .select(&SORT_KEY_SEL)
            .find_map(|el| find_year(&super::element_text(el))),
        YearStrategy::DateText => find_year(view.texts.get(view.date_idx?)?),
        YearStrategy::RowText => find_year(&view.texts.join(" ")),
    }
}
