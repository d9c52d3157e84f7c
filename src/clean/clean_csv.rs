// src/clean/clean_csv.rs

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::{info, warn};

use super::{
    CleanedPollRecord, CleanedTable, Lead, DATE_COLUMN, LEAD_COLUMN, POLLSTER_COLUMN,
    SAMPLE_SIZE_COLUMN,
};
use crate::write::write_csv_atomic;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `Date_conducted,Pollster,Sample_size,<parties...>[,Lead]`; nulls are empty.
pub fn write_clean_csv(path: &Path, table: &CleanedTable) -> Result<()> {
    write_csv_atomic(path, |w| {
        let mut header = vec![DATE_COLUMN, POLLSTER_COLUMN, SAMPLE_SIZE_COLUMN];
        header.extend(table.parties.iter().map(String::as_str));
        if table.has_lead {
            header.push(LEAD_COLUMN);
        }
        w.write_record(&header)?;

        for rec in &table.records {
            let mut line = Vec::with_capacity(header.len());
            line.push(
                rec.date_conducted
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
            );
            line.push(rec.pollster.clone());
            line.push(rec.sample_size.map(|n| n.to_string()).unwrap_or_default());
            line.extend(
                rec.shares
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            if table.has_lead {
                line.push(rec.lead.as_ref().map(Lead::to_string).unwrap_or_default());
            }
            w.write_record(&line)?;
        }
        Ok(())
    })?;
    info!(path = %path.display(), rows = table.records.len(), "wrote cleaned CSV");
    Ok(())
}

/// `numeric_lead` mirrors the source's lead setting: the CSV itself does not
/// record whether `14` was a margin or a text label.
pub fn read_clean_csv(path: &Path, numeric_lead: bool) -> Result<CleanedTable> {
    let file =
        File::open(path).with_context(|| format!("opening cleaned CSV {}", path.display()))?;
    read_clean_from(file, numeric_lead)
        .with_context(|| format!("reading cleaned CSV {}", path.display()))
}

/// Parse a cleaned CSV. Every column besides the fixed ones is a party.
/// Leads become [`Lead::Margin`] only when `numeric_lead` is set and the cell
/// parses as a number; everything else is kept as [`Lead::Label`].
pub fn read_clean_from<R: Read>(reader: R, numeric_lead: bool) -> Result<CleanedTable> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();

    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("missing `{name}` column"))
    };
    let date_idx = find(DATE_COLUMN)?;
    let pollster_idx = find(POLLSTER_COLUMN)?;
    let sample_idx = find(SAMPLE_SIZE_COLUMN)?;
    let lead_idx = headers.iter().position(|h| h == LEAD_COLUMN);

    let party_idx: Vec<usize> = (0..headers.len())
        .filter(|i| ![date_idx, pollster_idx, sample_idx].contains(i) && Some(*i) != lead_idx)
        .collect();
    let parties = party_idx.iter().map(|&i| headers[i].to_string()).collect();

    let mut records = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("CSV parse error at record {idx}"))?;
        let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");

        let date_conducted = match field(date_idx) {
            "" => None,
            raw => {
                let parsed = NaiveDate::parse_from_str(raw, DATE_FORMAT).ok();
                if parsed.is_none() {
                    warn!(record = idx, value = raw, "unparsable date");
                }
                parsed
            }
        };
        let lead = lead_idx.and_then(|i| match field(i) {
            "" => None,
            raw if numeric_lead => Some(
                raw.parse::<f64>()
                    .map(Lead::Margin)
                    .unwrap_or_else(|_| Lead::Label(raw.to_string())),
            ),
            raw => Some(Lead::Label(raw.to_string())),
        });

        records.push(CleanedPollRecord {
            date_conducted,
            pollster: field(pollster_idx).to_string(),
            sample_size: field(sample_idx).parse().ok(),
            shares: party_idx.iter().map(|&i| field(i).parse().ok()).collect(),
            lead,
        });
    }

    Ok(CleanedTable {
        parties,
        has_lead: lead_idx.is_some(),
        records,
    })
}
