//! User configuration
//!
//! Stored as `config.json` in the data directory. Every field has a default,
//! so a missing file or missing keys are fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flashcards::{FlashcardStorage, GraduationThreshold, StudyPolicy};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "COIN_DATA_DIR";

const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Unknown config key '{0}': expected graduationIntervalDays, graduationRepetitions or studyPolicy")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinConfig {
    #[serde(default = "default_graduation_interval_days")]
    pub graduation_interval_days: u32,
    #[serde(default = "default_graduation_repetitions")]
    pub graduation_repetitions: u32,
    /// What `queue` shows when nothing is due
    #[serde(default)]
    pub study_policy: StudyPolicy,
}

fn default_graduation_interval_days() -> u32 {
    GraduationThreshold::default().interval_days
}

fn default_graduation_repetitions() -> u32 {
    GraduationThreshold::default().repetitions
}

impl Default for CoinConfig {
    fn default() -> Self {
        Self {
            graduation_interval_days: default_graduation_interval_days(),
            graduation_repetitions: default_graduation_repetitions(),
            study_policy: StudyPolicy::default(),
        }
    }
}

impl CoinConfig {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Load the config from `data_dir`, falling back to defaults
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(data_dir);
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(data_dir)?;
        fs::write(Self::path(data_dir), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Set one field by its camelCase key, parsing `value` for that field
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "graduationIntervalDays" => {
                self.graduation_interval_days = value.trim().parse().map_err(|_| invalid())?;
            }
            "graduationRepetitions" => {
                self.graduation_repetitions = value.trim().parse().map_err(|_| invalid())?;
            }
            "studyPolicy" => {
                self.study_policy = match value.trim() {
                    "dueOnly" | "due-only" => StudyPolicy::DueOnly,
                    "fallbackToAll" | "fallback-to-all" => StudyPolicy::FallbackToAll,
                    _ => return Err(invalid()),
                };
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }

        log::debug!("Config {} set to {}", key, value);
        Ok(())
    }

    pub fn graduation_threshold(&self) -> GraduationThreshold {
        GraduationThreshold {
            interval_days: self.graduation_interval_days,
            repetitions: self.graduation_repetitions,
        }
    }
}

/// Resolve the data directory: explicit path, then `COIN_DATA_DIR`, then the
/// platform default
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    FlashcardStorage::default_data_dir().map_err(|_| ConfigError::DataDirNotFound)
}
