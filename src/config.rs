use crate::debounce::DEFAULT_DEBOUNCE_MS;
use crate::domain::{UnassignedPolicy, UseCaseMode};
use crate::persistence::{atomic_write, read_file};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_SNAPSHOT_FILE: &str = "snapshot.json";

/// App settings stored in config.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Idle interval before a title edit is written
    pub debounce_ms: u64,
    /// How completed todos without a daily list are classified
    pub unassigned_policy: UnassignedPolicy,
    pub use_case_mode: UseCaseMode,
    /// Snapshot file name, relative to the data directory
    pub snapshot_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            unassigned_policy: UnassignedPolicy::default(),
            use_case_mode: UseCaseMode::default(),
            snapshot_file: DEFAULT_SNAPSHOT_FILE.to_string(),
        }
    }
}

impl Config {
    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn snapshot_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.snapshot_file)
    }
}

pub fn config_file(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load config, returning defaults if the file doesn't exist
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = read_file(path)?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    atomic_write(path, &json)
}
