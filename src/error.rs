// src/error.rs

use thiserror::Error;

/// Fatal failures of a single source run.
///
/// Per-row parse failures are not represented here: they turn into empty
/// cells and are handled by the cleaner's drop policy.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The page could not be fetched or answered with a non-success status.
    #[error("source unavailable: {url}: {reason}")]
    SourceUnavailable { url: String, reason: String },

    /// No table on the page passed the header heuristic.
    #[error("no poll tables found for `{source_key}` (markers: {markers:?})")]
    NoTablesFound {
        source_key: String,
        markers: Vec<String>,
    },

    /// Tables were found but no row yielded a year.
    #[error("no data rows with a year found for `{source_key}`")]
    NoDataRows { source_key: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
