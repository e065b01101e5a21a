// ============================================
// src/settings.rs
// User settings and where files live on disk
// ============================================

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::store::StorageFormat;

const SETTINGS_FILE: &str = "settings.json";

/// Persisted preferences. Command-line flags override these per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Word list imported with `wordwiz import`.
    pub deck_path: Option<PathBuf>,
    pub show_romanization: bool,
    pub storage_format: StorageFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deck_path: None,
            show_romanization: true,
            storage_format: StorageFormat::Json,
        }
    }
}

impl Settings {
    /// Falls back to defaults when the file is missing or broken.
    pub fn load(path: &Path) -> Self {
        let Ok(text) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "saved settings");
        Ok(())
    }
}

/// Directories for progress data and settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl AppPaths {
    // MARK: resolve the per-user directories, current directory as a last resort
    pub fn resolve(data_dir_override: Option<PathBuf>) -> Self {
        let dirs = ProjectDirs::from("dev", "wordwiz", "WORD_WIZ");
        let config_dir = dirs
            .as_ref()
            .map(|d| d.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let data_dir = data_dir_override
            .or_else(|| dirs.as_ref().map(|d| d.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        Self { data_dir, config_dir }
    }

    /// Keeps settings next to the data, e.g. for a portable install or tests.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            data_dir: dir.clone(),
            config_dir: dir,
        }
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }
}
