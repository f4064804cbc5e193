// Application settings
// Loaded from ~/.config/periodgrid/settings.toml

use chrono::Datelike;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Grid defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Year label for the first row. Unset = current calendar year.
    pub base_year: Option<i32>,
}

/// User-facing texts
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MessageSettings {
    /// Attached to every rejected cell
    pub invalid_cell: String,
    /// Shown when every table is empty
    pub empty_grid: String,
    /// Shown after a successful submission
    pub valid: String,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            invalid_cell: "Invalid.".to_string(),
            empty_grid: "Please fill out the table.".to_string(),
            valid: "Valid.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Caption template; `{number}` is replaced by the 1-based table number
    pub caption: String,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            caption: "Table #{number}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive used when RUST_LOG is not set
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid: GridSettings,
    pub messages: MessageSettings,
    pub table: TableSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("periodgrid")
            .join("settings.toml")
    }

    /// Parse settings from TOML text. Missing keys take their defaults.
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Load an explicitly named settings file. A missing or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from the default location. A missing file gives defaults;
    /// an unreadable or malformed one is reported so the caller can fall back.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Year label for the first row of a new grid
    pub fn base_year(&self) -> i32 {
        self.grid
            .base_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}
