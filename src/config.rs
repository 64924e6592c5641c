use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{HevconvError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ffmpeg: FfmpegConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfmpegConfig {
    /// Path to the ffmpeg binary
    pub binary_path: String,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
        }
    }
}

/// Conversion defaults applied for any flag the caller omits. A value left
/// out here falls back to the built-in default (crf 28, preset "fast",
/// audio codec "aac", encoder "nvenc").
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    pub crf: Option<i32>,
    pub preset: Option<String>,
    pub audio_codec: Option<String>,
    pub resolution: Option<String>,
    pub encoder: Option<String>,
    pub bitrate: Option<String>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HevconvError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| HevconvError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HevconvError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| HevconvError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.ffmpeg.binary_path, "ffmpeg");
        assert!(config.defaults.crf.is_none());
        assert!(config.defaults.encoder.is_none());
    }

    #[test]
    fn test_partial_file_parses() {
        let config: Config = toml::from_str(
            r#"
            [defaults]
            crf = 24
            preset = "medium"
            "#,
        )
        .unwrap();
        assert_eq!(config.ffmpeg.binary_path, "ffmpeg");
        assert_eq!(config.defaults.crf, Some(24));
        assert_eq!(config.defaults.preset.as_deref(), Some("medium"));
        assert!(config.defaults.bitrate.is_none());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hevconv.toml");

        let mut config = Config::default();
        config.defaults.encoder = Some("libx265".to_string());
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.defaults.encoder.as_deref(), Some("libx265"));
    }
}
