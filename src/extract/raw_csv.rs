// src/extract/raw_csv.rs

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::{info, warn};

use super::{rows::fit_to_header, RawPollRow, RawTable};
use crate::write::write_csv_atomic;

pub const YEAR_COLUMN: &str = "Year";

/// Write `Year,<header...>` followed by one line per row.
pub fn write_raw_csv(path: &Path, table: &RawTable) -> Result<()> {
    write_csv_atomic(path, |w| {
        let header = std::iter::once(YEAR_COLUMN).chain(table.header.iter().map(String::as_str));
        w.write_record(header)?;
        for row in &table.rows {
            let year = row.year.to_string();
            w.write_record(
                std::iter::once(year.as_str()).chain(row.cells.iter().map(String::as_str)),
            )?;
        }
        Ok(())
    })?;
    info!(path = %path.display(), rows = table.rows.len(), "wrote raw CSV");
    Ok(())
}

pub fn read_raw_csv(path: &Path) -> Result<RawTable> {
    let file = File::open(path).with_context(|| format!("opening raw CSV {}", path.display()))?;
    read_raw_from(file).with_context(|| format!("reading raw CSV {}", path.display()))
}

/// Parse a raw CSV. Lines whose year does not parse are skipped.
pub fn read_raw_from<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    match headers.get(0) {
        Some(YEAR_COLUMN) => {}
        other => bail!("expected first column `{YEAR_COLUMN}`, found {other:?}"),
    }
    let header: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("CSV parse error at record {idx}"))?;
        let Some(year) = record.get(0).and_then(|y| y.trim().parse::<i32>().ok()) else {
            warn!(record = idx, "skipping raw row without a year");
            continue;
        };
        let cells: Vec<String> = record.iter().skip(1).map(str::to_string).collect();
        rows.push(RawPollRow {
            year,
            cells: fit_to_header(cells, header.len()),
        });
    }

    Ok(RawTable { header, rows })
}
