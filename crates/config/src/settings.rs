// User settings
// Loaded from ~/.config/geochem/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_FILE: &str = r#"{
    // Sample CSV used when no --data flag is given
    "data.path": null,

    // Assistant TOML (region, typo threshold, grid sizes, surfacing)
    "assistant.config": null,

    // Log level when neither --log-level nor RUST_LOG is set
    // Options: "error", "warn", "info", "debug", "trace"
    "log.level": null,

    // Pretty-print JSON output
    "output.pretty": false
}
"#;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "data.path")]
    pub data_path: Option<PathBuf>,

    #[serde(rename = "assistant.config")]
    pub assistant_config: Option<PathBuf>,

    #[serde(rename = "log.level")]
    pub log_level: Option<String>,

    #[serde(rename = "output.pretty")]
    pub pretty: bool,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("geochem");
        config_dir.join("settings.json")
    }

    /// Load settings from the user config dir, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file is created with commented
    /// defaults; an unreadable or malformed one yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {e}; using default settings", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines that start with `//`.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

fn create_default_file(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::warn!("error creating config directory: {e}");
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_FILE) {
        log::warn!("error writing default settings.json: {e}");
    }
}
