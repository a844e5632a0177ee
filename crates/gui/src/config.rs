//! Viewer settings
//!
//! Settings are read-only: they are loaded at startup from `--config <path>`
//! or from the platform config directory, and never written back.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared::{ColumnValue, Rgb};

use crate::error::ConfigError;

/// Display filter parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Factor applied to every triangle by the shrink filter (1.0 = unchanged)
    pub shrink_factor: f32,
    /// A point on the clip plane
    pub clip_origin: [f32; 3],
    /// Clip plane normal; the half-space it points into is kept
    pub clip_normal: [f32; 3],
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            shrink_factor: 0.8,
            clip_origin: [0.0, 0.0, 0.0],
            clip_normal: [0.0, 1.0, 0.0],
        }
    }
}

/// Render loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Target time between two frames
    pub frame_interval_ms: u64,
    /// Number of per-frame rotation deltas kept by the mirror backend
    pub history_len: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 20,
            history_len: 256,
        }
    }
}

impl RenderSettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

/// Window settings for the desktop app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// All viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Color given to newly created parts
    pub default_color: Rgb,
    /// Header row of the part tree
    pub column_headers: Vec<String>,
    pub filters: FilterSettings,
    pub render: RenderSettings,
    pub window: WindowSettings,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            default_color: Rgb::default(),
            column_headers: vec!["Part".to_string(), "Visible?".to_string()],
            filters: FilterSettings::default(),
            render: RenderSettings::default(),
            window: WindowSettings::default(),
        }
    }
}

impl ViewerSettings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "partview", "partview")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Parse settings from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load settings, falling back to defaults.
    ///
    /// A missing file is silent; an unreadable or malformed one is logged.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Self::default(),
            },
        };

        match Self::from_file(&path) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                tracing::error!("Ignoring settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Column headers as the root row of the tree
    pub fn header_row(&self) -> Vec<ColumnValue> {
        self.column_headers
            .iter()
            .map(|h| ColumnValue::from(h.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let json = r#"{"render": {"frame_interval_ms": 5}, "default_color": {"r": 1, "g": 2, "b": 3}}"#;
        let s: ViewerSettings = serde_json::from_str(json).unwrap();
        assert_eq!(s.render.frame_interval_ms, 5);
        assert_eq!(s.render.history_len, 256);
        assert_eq!(s.default_color, Rgb::new(1, 2, 3));
        assert_eq!(s.filters.shrink_factor, 0.8);
        assert_eq!(s.column_headers, vec!["Part", "Visible?"]);
    }

    #[test]
    fn test_zero_frame_interval_is_clamped() {
        let s = RenderSettings {
            frame_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(s.frame_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_load_missing_explicit_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let s = ViewerSettings::load(Some(&dir.path().join("settings.json")));
        assert_eq!(s, ViewerSettings::default());
    }

    #[test]
    fn test_load_malformed_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(ViewerSettings::from_file(file.path()).is_err());
        assert_eq!(ViewerSettings::load(Some(file.path())), ViewerSettings::default());
    }
}
