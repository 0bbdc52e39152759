//! Advisor configuration.
//!
//! One TOML file covering the catalog location, the decision log, and the
//! external collaborators. Missing file means defaults; a malformed file is
//! a startup error, not something to silently paper over.

use crate::generative::GenerativeConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";
pub const DEFAULT_PEOPLE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Path to the course catalog JSON document
    pub catalog_path: PathBuf,
    /// Routing decision log (JSONL); `None` disables the file sink
    pub decision_log_path: Option<PathBuf>,
    pub generative: GenerativeConfig,
    /// People-search service endpoint; `None` degrades that intent
    pub people_endpoint: Option<String>,
    pub people_timeout_secs: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            decision_log_path: None,
            generative: GenerativeConfig::default(),
            people_endpoint: None,
            people_timeout_secs: DEFAULT_PEOPLE_TIMEOUT_SECS,
        }
    }
}

impl AdvisorConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }
}
