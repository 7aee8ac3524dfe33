//! Processor configuration persistence
//!
//! Stores user preferences in `~/.config/textedit/config.yaml`

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::processor::EditStyle;

/// Buffer implementation used by the command line tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferBackend {
    /// `ropey::Rope`, for large files
    #[default]
    Rope,
    /// Plain `String`
    String,
}

/// Defaults for how edits are performed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditConfig {
    /// Capture an undo edit on every apply
    #[serde(default = "default_create_undo")]
    pub create_undo: bool,
    /// Report where every edit ended up
    #[serde(default)]
    pub update_regions: bool,
    #[serde(default)]
    pub backend: BufferBackend,
}

fn default_create_undo() -> bool {
    true
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            create_undo: default_create_undo(),
            update_regions: false,
            backend: BufferBackend::default(),
        }
    }
}

impl EditConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to `path`
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Processor style flags for these settings
    pub fn style(&self) -> EditStyle {
        let mut style = EditStyle::NONE;
        if self.create_undo {
            style |= EditStyle::CREATE_UNDO;
        }
        if self.update_regions {
            style |= EditStyle::UPDATE_REGIONS;
        }
        style
    }
}
