// src/config/source.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Everything that distinguishes one poll page from another.
///
/// A single extraction + cleaning engine is driven by these records; the
/// built-in ones live in [`super::builtin`], and a YAML list of them can
/// replace the built-ins at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Short identifier used in file names and on the command line (`uk`, `de`, ...).
    pub key: String,
    pub country: String,
    /// ISO-3166 numeric country code, used to colour the map.
    pub iso_numeric: u16,
    pub url: Url,
    pub tables: TableMatch,
    pub rows: RowConfig,
    pub clean: CleanConfig,
    #[serde(default)]
    pub palette: Vec<PartyStyle>,
}

impl SourceConfig {
    /// Colour for a canonical party name, if the palette knows it.
    pub fn color_of(&self, party: &str) -> Option<&str> {
        self.palette
            .iter()
            .find(|p| p.party == party)
            .map(|p| p.color.as_str())
    }

    /// Display label for a canonical party name, falling back to the name itself.
    pub fn label_of<'a>(&'a self, party: &'a str) -> &'a str {
        self.palette
            .iter()
            .find(|p| p.party == party)
            .map(|p| p.label.as_str())
            .unwrap_or(party)
    }
}

/// Table Selector heuristic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableMatch {
    /// Substrings that must all appear in the first row's joined header text.
    /// Empty means "any table whose first row has header cells".
    #[serde(default)]
    pub markers: Vec<String>,
    /// Only the first `n` matching tables are used.
    #[serde(default)]
    pub max_tables: Option<usize>,
}

/// Row Extractor settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowConfig {
    /// Header-like rows to skip before the header is captured.
    #[serde(default)]
    pub header_skip: usize,
    #[serde(default)]
    pub cells: CellScope,
    /// Tried in order; the first strategy yielding a year wins.
    pub year_chain: Vec<YearStrategy>,
    /// When set, rows whose date cell is missing or blank are discarded.
    #[serde(default)]
    pub date_column: Option<DateColumn>,
}

/// Which cells of a data row make up the record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CellScope {
    /// Only `<td>` cells.
    DataOnly,
    /// `<th>` and `<td>` cells in document order (pollster is often a `<th>`).
    #[default]
    All,
}

/// One step of the year-inference chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum YearStrategy {
    /// A `data-sort-value` attribute, either on the given record cell or on
    /// any element in the row.
    SortValue {
        #[serde(default)]
        cell: Option<usize>,
    },
    /// The text of a `span.sortkey` inside the row.
    SortKey,
    /// A year in the visible text of the date column.
    DateText,
    /// A year anywhere in the row's visible text.
    RowText,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateColumn {
    pub header: String,
    /// Used when `header` is not among the captured header cells.
    #[serde(default)]
    pub fallback_index: usize,
}

/// Field Cleaner settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanConfig {
    pub pollster_column: String,
    /// The pollster is cut at the first of these characters (citation markers).
    #[serde(default)]
    pub pollster_markers: Vec<char>,
    pub fieldwork_column: String,
    pub sample_size_column: String,
    /// Raw header names of the tracked party columns, in output order.
    pub party_columns: Vec<String>,
    #[serde(default)]
    pub lead: Option<LeadColumn>,
    /// Raw party header → canonical output name.
    #[serde(default)]
    pub renames: BTreeMap<String, String>,
    #[serde(default)]
    pub strip_question_marks: bool,
    #[serde(default)]
    pub policy: DropPolicy,
}

impl CleanConfig {
    /// Canonical output name for a raw party column.
    pub fn canonical_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.renames.get(raw).map(String::as_str).unwrap_or(raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeadColumn {
    pub column: String,
    /// Coerce to a number; otherwise the trimmed text is kept.
    #[serde(default)]
    pub numeric: bool,
}

/// Which cleaned rows survive.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    RequireSampleSize,
    #[default]
    RequireSampleSizeAndDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartyStyle {
    /// Canonical (post-rename) party column name.
    pub party: String,
    pub color: String,
    pub label: String,
}
