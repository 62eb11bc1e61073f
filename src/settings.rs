//! Persistent settings for the canvas viewer.

use crate::filter::DisplayMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// All persistable viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Canvas opened on startup when none is given on the command line
    #[serde(default)]
    pub last_canvas: Option<PathBuf>,
    /// Notes directory used for file tags; defaults to the canvas's directory
    #[serde(default)]
    pub vault_root: Option<PathBuf>,

    // Display
    #[serde(default = "default_show_arrows")]
    pub show_arrows: bool,
    /// Mode the filter session starts in
    #[serde(default)]
    pub start_mode: DisplayMode,

    // Tag picker
    #[serde(default = "default_picker_limit")]
    pub picker_limit: usize,
}

fn default_show_arrows() -> bool {
    true
}

fn default_picker_limit() -> usize {
    50
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_canvas: None,
            vault_root: None,
            show_arrows: true,
            start_mode: DisplayMode::Hide,
            picker_limit: 50,
        }
    }
}

impl Settings {
    /// Get the path to the settings file
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("canvas-filter");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk, returning defaults if file doesn't exist or is invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    tracing::warn!("Failed to parse settings file: {}, using defaults", e);
                    Self::default()
                }
            },
            // File doesn't exist yet, that's fine
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory, settings not saved");
            return;
        };
        self.save_to(&path);
    }

    pub fn save_to(&self, path: &Path) {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create config directory: {}", e);
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    tracing::warn!("Failed to write settings file: {}", e);
                } else {
                    tracing::info!("Saved settings to {:?}", path);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to serialize settings: {}", e);
            }
        }
    }

    /// Directory searched for file tags when viewing `canvas`
    pub fn vault_for(&self, canvas: &Path) -> PathBuf {
        self.vault_root
            .clone()
            .or_else(|| canvas.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");
        let settings = Settings {
            last_canvas: Some(PathBuf::from("/tmp/board.canvas")),
            start_mode: DisplayMode::Fade,
            picker_limit: 10,
            ..Settings::default()
        };
        settings.save_to(&path);
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn missing_or_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(Settings::load_from(&path), Settings::default());

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"show_arrows": false}"#).unwrap();
        let loaded = Settings::load_from(&path);
        assert!(!loaded.show_arrows);
        assert_eq!(loaded.picker_limit, 50);
        assert_eq!(loaded.start_mode, DisplayMode::Hide);
    }

    #[test]
    fn vault_defaults_to_canvas_directory() {
        let settings = Settings::default();
        assert_eq!(
            settings.vault_for(Path::new("/notes/boards/plan.canvas")),
            PathBuf::from("/notes/boards")
        );
        let pinned = Settings {
            vault_root: Some(PathBuf::from("/vault")),
            ..Settings::default()
        };
        assert_eq!(pinned.vault_for(Path::new("/x/y.canvas")), PathBuf::from("/vault"));
    }
}
