// src/extract/window.rs

use std::collections::BTreeSet;

use super::RawPollRow;

/// Distinct years seen and the ones kept, both newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearWindow {
    pub found: Vec<i32>,
    pub kept: Vec<i32>,
}

/// Distinct years of `rows`, newest first.
pub fn distinct_years_desc(rows: &[RawPollRow]) -> Vec<i32> {
    let years: BTreeSet<i32> = rows.iter().map(|r| r.year).collect();
    years.into_iter().rev().collect()
}

/// Keep only rows from the `n` most recent distinct years. Row order is
/// preserved; with fewer than `n` distinct years everything is kept.
pub fn keep_recent_years(rows: Vec<RawPollRow>, n: usize) -> (Vec<RawPollRow>, YearWindow) {
    let found = distinct_years_desc(&rows);
    let kept: Vec<i32> = found.iter().copied().take(n).collect();
    let keep: BTreeSet<i32> = kept.iter().copied().collect();

    let rows = rows.into_iter().filter(|r| keep.contains(&r.year)).collect();
    (rows, YearWindow { found, kept })
}
