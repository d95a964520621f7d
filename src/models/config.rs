//! Configuration for chemtab.
//!
//! Everything tunable about a run is parameterized here and resolved from a
//! TOML file; every field has a default so a missing file or section is not
//! an error.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Lookup call behavior (timeouts, retries, pacing)
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Enrichment run behavior (persistence cadence)
    #[serde(default)]
    pub enrich: EnrichConfig,
}

/// Lookup call configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Per-call timeout in seconds; a timeout counts as a transient failure
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum attempts per row before the row is left pending
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Minimum delay between lookup calls in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// How row keys are normalized before matching
    #[serde(default)]
    pub normalization: KeyNormalization,
}

fn default_timeout() -> u64 {
    20
}

fn default_max_retries() -> u32 {
    3
}

fn default_request_delay_ms() -> u64 {
    2000
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            request_delay_ms: default_request_delay_ms(),
            normalization: KeyNormalization::default(),
        }
    }
}

/// Enrichment run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// Persist progress after this many newly settled rows
    #[serde(default = "default_persist_every")]
    pub persist_every: usize,
}

fn default_persist_every() -> usize {
    1
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            persist_every: default_persist_every(),
        }
    }
}

/// Key normalization policy applied before a key is matched against a
/// lookup source or the resume state.
///
/// Spreadsheet exports wrap identifiers in quotes or pad them with
/// whitespace; `Trimmed` strips both. `Caseless` additionally lowercases,
/// for sources whose labels vary in case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyNormalization {
    /// Use the cell content as-is
    Exact,
    /// Strip surrounding whitespace and quotes (default)
    #[default]
    Trimmed,
    /// Strip surrounding whitespace and quotes, then lowercase
    Caseless,
}

impl KeyNormalization {
    /// Normalize a raw cell value into a row key.
    pub fn apply(&self, raw: &str) -> String {
        match self {
            Self::Exact => raw.to_string(),
            Self::Trimmed => trim_key(raw).to_string(),
            Self::Caseless => trim_key(raw).to_lowercase(),
        }
    }
}

fn trim_key(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '\'' || c == '"').trim()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
