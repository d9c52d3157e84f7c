// src/dashboard/long.rs

use chrono::NaiveDate;
use serde::Serialize;

use crate::clean::CleanedTable;

/// One poll × party observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRow {
    pub date: NaiveDate,
    pub party: String,
    pub value: f64,
    pub pollster: String,
    pub sample_size: Option<u64>,
}

/// Reshape a cleaned table to long format, restricted to `parties`.
/// Undated polls and null shares produce no rows.
pub fn to_long(table: &CleanedTable, parties: &[String]) -> Vec<LongRow> {
    let columns: Vec<(usize, &String)> = parties
        .iter()
        .filter_map(|p| table.party_index(p).map(|i| (i, p)))
        .collect();

    table
        .records
        .iter()
        .filter_map(|rec| rec.date_conducted.map(|d| (d, rec)))
        .flat_map(|(date, rec)| {
            columns.iter().filter_map(move |(i, party)| {
                let value = rec.shares.get(*i).copied().flatten()?;
                Some(LongRow {
                    date,
                    party: (*party).clone(),
                    value,
                    pollster: rec.pollster.clone(),
                    sample_size: rec.sample_size,
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::CleanedPollRecord;

    #[test]
    fn one_row_per_dated_poll_and_party() {
        let table = CleanedTable {
            parties: vec!["A".into(), "B".into(), "Others".into()],
            has_lead: false,
            records: vec![
                CleanedPollRecord {
                    date_conducted: NaiveDate::from_ymd_opt(2025, 1, 2),
                    pollster: "P1".into(),
                    sample_size: Some(1000),
                    shares: vec![Some(30.0), None, Some(5.0)],
                    lead: None,
                },
                CleanedPollRecord {
                    date_conducted: None,
                    pollster: "P2".into(),
                    sample_size: Some(900),
                    shares: vec![Some(31.0), Some(20.0), Some(4.0)],
                    lead: None,
                },
            ],
        };
        let parties = vec!["A".to_string(), "B".to_string(), "Z".to_string()];
        let long = to_long(&table, &parties);

        assert_eq!(long.len(), 1);
        assert_eq!(long[0].party, "A");
        assert_eq!(long[0].value, 30.0);
        assert_eq!(long[0].pollster, "P1");
    }
}
