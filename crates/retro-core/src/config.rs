use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MERGE_SEPARATOR: &str = "\n";
pub const DEFAULT_TEXT_DEBOUNCE_MS: u64 = 400;

/// How inbound remote snapshots are reconciled against local state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    /// Every inbound snapshot replaces local state, discarding unacknowledged commits.
    #[default]
    LastSnapshotWins,
    /// Only strictly newer revisions are applied; unacknowledged commits are replayed on top.
    NewerRevisionOnly,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub merge_separator: Option<String>,
    #[serde(default)]
    pub reconcile_policy: Option<ReconcilePolicy>,
    #[serde(default)]
    pub text_debounce_ms: Option<u64>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/retro/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("retro/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("retro\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            if let Ok(content) = std::fs::read_to_string(path) {
                if let Ok(config) = toml::from_str(&content) {
                    return config;
                }
            }
        }
        Self::default()
    }

    pub fn effective_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("retro")))
            .unwrap_or_else(|| PathBuf::from(".retro"))
    }

    pub fn effective_merge_separator(&self) -> &str {
        self.merge_separator
            .as_deref()
            .unwrap_or(DEFAULT_MERGE_SEPARATOR)
    }

    pub fn effective_reconcile_policy(&self) -> ReconcilePolicy {
        self.reconcile_policy.unwrap_or_default()
    }

    pub fn effective_text_debounce_ms(&self) -> u64 {
        self.text_debounce_ms.unwrap_or(DEFAULT_TEXT_DEBOUNCE_MS)
    }
}
