// src/config/mod.rs

pub mod builtin;
pub mod source;

pub use builtin::builtin_sources;
pub use source::{
    CellScope, CleanConfig, DateColumn, DropPolicy, LeadColumn, PartyStyle, RowConfig,
    SourceConfig, TableMatch, YearStrategy,
};

use anyhow::{Context, Result};
use std::{
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info};

use crate::error::ScrapeError;

/// Wikipedia refuses obvious bot user agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Run-wide settings. Paths are handed to each stage explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub dashboard_path: PathBuf,
    /// Number of most recent distinct years kept by the scraper.
    pub years_to_keep: usize,
    /// Poll window for the leading party and the latest-polls table.
    pub latest_polls: usize,
    pub user_agent: String,
    /// YAML list of [`SourceConfig`] replacing the built-in sources.
    pub sources_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            dashboard_path: PathBuf::from("dashboard").join("index.html"),
            years_to_keep: 5,
            latest_polls: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sources_file: None,
        }
    }
}

impl Settings {
    /// Defaults overridden by `POLLS_DATA_DIR`, `POLLS_DASHBOARD`,
    /// `POLLS_YEARS`, `POLLS_LATEST` and `POLLS_SOURCES`.
    pub fn from_env() -> Result<Self, ScrapeError> {
        let mut settings = Self::default();
        if let Ok(dir) = env::var("POLLS_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Ok(path) = env::var("POLLS_DASHBOARD") {
            settings.dashboard_path = PathBuf::from(path);
        }
        if let Some(n) = parse_env::<usize>("POLLS_YEARS")? {
            settings.years_to_keep = n;
        }
        if let Some(n) = parse_env::<usize>("POLLS_LATEST")? {
            settings.latest_polls = n;
        }
        if let Ok(path) = env::var("POLLS_SOURCES") {
            settings.sources_file = Some(PathBuf::from(path));
        }
        if settings.years_to_keep == 0 || settings.latest_polls == 0 {
            return Err(ScrapeError::InvalidConfig(
                "POLLS_YEARS and POLLS_LATEST must be at least 1".into(),
            ));
        }
        debug!(?settings, "settings resolved");
        Ok(settings)
    }

    pub fn raw_csv_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}_polls_raw.csv"))
    }

    pub fn clean_csv_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}_polls_clean.csv"))
    }

    /// The configured sources: the YAML file if one is set, else the built-ins.
    pub fn load_sources(&self) -> Result<Vec<SourceConfig>> {
        match &self.sources_file {
            Some(path) => load_sources_file(path),
            None => Ok(builtin_sources()),
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>, ScrapeError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ScrapeError::InvalidConfig(format!("{name}={raw:?} is not a number"))),
        Err(_) => Ok(None),
    }
}

/// Read a YAML list of source records.
pub fn load_sources_file(path: &Path) -> Result<Vec<SourceConfig>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading sources file {}", path.display()))?;
    let sources: Vec<SourceConfig> = serde_yaml::from_str(&text)
        .map_err(|e| ScrapeError::InvalidConfig(format!("{}: {e}", path.display())))?;
    for source in &sources {
        validate_key(&source.key)?;
    }
    info!(path = %path.display(), count = sources.len(), "loaded sources file");
    Ok(sources)
}

/// Source keys end up in file names and HTML element ids, so only
/// `[a-z0-9_-]` is accepted.
pub fn validate_key(key: &str) -> Result<(), ScrapeError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(ScrapeError::InvalidConfig(format!(
            "source key `{key}` may only contain a-z, 0-9, `_` and `-`"
        )))
    }
}

/// Keep only the sources named in `keys`, in the order given. An empty
/// `keys` selects every source.
pub fn select_sources(
    sources: Vec<SourceConfig>,
    keys: &[String],
) -> Result<Vec<SourceConfig>, ScrapeError> {
    if keys.is_empty() {
        return Ok(sources);
    }
    keys.iter()
        .map(|key| {
            sources
                .iter()
                .find(|s| s.key.eq_ignore_ascii_case(key))
                .cloned()
                .ok_or_else(|| ScrapeError::InvalidConfig(format!("unknown source `{key}`")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn csv_paths_are_derived_from_the_data_dir() {
        let settings = Settings {
            data_dir: PathBuf::from("/tmp/polls"),
            ..Settings::default()
        };
        assert_eq!(
            settings.raw_csv_path("de"),
            PathBuf::from("/tmp/polls/de_polls_raw.csv")
        );
        assert_eq!(
            settings.clean_csv_path("de"),
            PathBuf::from("/tmp/polls/de_polls_clean.csv")
        );
    }

    #[test]
    fn select_sources_keeps_requested_order() -> Result<()> {
        let keys = vec!["IT".to_string(), "uk".to_string()];
        let picked = select_sources(builtin_sources(), &keys)?;
        let picked: Vec<_> = picked.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(picked, vec!["it", "uk"]);
        Ok(())
    }

    #[test]
    fn select_sources_rejects_unknown_keys() {
        let err = select_sources(builtin_sources(), &["fr".to_string()]).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidConfig(_)));
    }

    #[test]
    fn sources_round_trip_through_yaml() -> Result<()> {
        let yaml = serde_yaml::to_string(&builtin_sources())?;
        let mut file = NamedTempFile::new()?;
        file.write_all(yaml.as_bytes())?;

        let loaded = load_sources_file(file.path())?;
        assert_eq!(loaded, builtin_sources());
        Ok(())
    }

    #[test]
    fn minimal_yaml_source_uses_defaults() -> Result<()> {
        let yaml = r#"
- key: xx
  country: Testland
  iso_numeric: 999
  url: https://example.org/polls
  tables:
    markers: ["Fieldwork date"]
  rows:
    year_chain:
      - kind: sort_value
      - kind: date_text
  clean:
    pollster_column: Polling firm
    pollster_markers: ["["]
    fieldwork_column: Fieldwork date
    sample_size_column: Sample size
    party_columns: [A, B]
"#;
        let sources: Vec<SourceConfig> = serde_yaml::from_str(yaml)?;
        let source = &sources[0];
        assert_eq!(source.rows.header_skip, 0);
        assert_eq!(source.rows.cells, CellScope::All);
        assert_eq!(
            source.rows.year_chain,
            vec![YearStrategy::SortValue { cell: None }, YearStrategy::DateText]
        );
        assert_eq!(source.clean.policy, DropPolicy::RequireSampleSizeAndDate);
        assert_eq!(source.clean.pollster_markers, vec!['[']);
        assert!(source.palette.is_empty());
        Ok(())
    }

    #[test]
    fn builtin_keys_are_valid() {
        for source in builtin_sources() {
            assert!(validate_key(&source.key).is_ok(), "{}", source.key);
        }
    }

    #[test]
    fn yaml_source_with_unsafe_key_is_rejected() -> Result<()> {
        let yaml = r#"
- key: "u.k &co"
  country: Testland
  iso_numeric: 999
  url: https://example.org/polls
  tables:
    markers: ["Pollster"]
  rows:
    year_chain:
      - kind: date_text
  clean:
    pollster_column: Pollster
    fieldwork_column: Fieldwork date
    sample_size_column: Sample size
    party_columns: [A]
"#;
        let mut file = NamedTempFile::new()?;
        file.write_all(yaml.as_bytes())?;

        let err = load_sources_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::InvalidConfig(msg)) if msg.contains("u.k &co")
        ));
        Ok(())
    }

    #[test]
    fn key_charset() {
        assert!(validate_key("uk").is_ok());
        assert!(validate_key("de_2025-b").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("UK").is_err());
        assert!(validate_key("u k").is_err());
        assert!(validate_key("a.b").is_err());
    }
}
