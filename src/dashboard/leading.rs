// src/dashboard/leading.rs

use crate::clean::{CleanedPollRecord, CleanedTable};

/// Party with the highest mean share over a window of polls.
#[derive(Debug, Clone, PartialEq)]
pub struct Leader {
    pub party: String,
    pub mean: f64,
}

/// The `k` most recent dated polls, newest first. Polls conducted on the
/// same day keep their table order.
pub fn latest_polls(table: &CleanedTable, k: usize) -> Vec<&CleanedPollRecord> {
    let mut dated: Vec<&CleanedPollRecord> = table
        .records
        .iter()
        .filter(|r| r.date_conducted.is_some())
        .collect();
    dated.sort_by(|a, b| b.date_conducted.cmp(&a.date_conducted));
    dated.truncate(k);
    dated
}

/// Mean share of each of `parties` over the `k` latest polls; the highest
/// mean wins, ties going to the earlier party in `parties`. Null shares
/// are skipped, and a party with no shares in the window cannot lead.
pub fn leading_party(table: &CleanedTable, parties: &[String], k: usize) -> Option<Leader> {
    let window = latest_polls(table, k);

    let mut best: Option<Leader> = None;
    for party in parties {
        let values: Vec<f64> = window
            .iter()
            .filter_map(|rec| table.share(rec, party))
            .collect();
        if values.is_empty() {
            continue;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        if best.as_ref().map_or(true, |b| mean > b.mean) {
            best = Some(Leader {
                party: party.clone(),
                mean,
            });
        }
    }
    best
}

/// Party with the highest share in a single poll, first one on ties.
pub fn row_leader<'a>(
    table: &CleanedTable,
    record: &CleanedPollRecord,
    parties: &'a [String],
) -> Option<&'a str> {
    let mut best: Option<(&'a str, f64)> = None;
    for party in parties {
        if let Some(v) = table.share(record, party) {
            if best.map_or(true, |(_, b)| v > b) {
                best = Some((party.as_str(), v));
            }
        }
    }
    best.map(|(p, _)| p)
}
