// src/write.rs

use anyhow::{Context, Result};
use std::{fs, io::Write, path::Path};
use tempfile::NamedTempFile;

/// Write a CSV through `fill`, atomically: rows go to a temp file next to
/// `path`, which is renamed over `path` only once `fill` has succeeded.
pub fn write_csv_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut csv::Writer<&mut NamedTempFile>) -> Result<()>,
{
    let mut tmp = temp_beside(path)?;
    {
        let mut writer = csv::Writer::from_writer(&mut tmp);
        fill(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("flushing CSV for {}", path.display()))?;
    }
    persist(tmp, path)
}

/// Replace `path` with `contents` via temp file + rename.
pub fn write_text_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = temp_beside(path)?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    persist(tmp, path)
}

fn temp_beside(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("creating directory {}", dir.display()))?;
    NamedTempFile::new_in(dir).with_context(|| format!("creating temp file in {}", dir.display()))
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("renaming temp file over {}", path.display()))?;
    Ok(())
}
