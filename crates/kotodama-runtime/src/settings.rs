//! Render settings and the optional config file
//!
//! Everything the frame loop needs to know about how to render is carried
//! in an explicit `RenderSettings` value passed in each tick — stereo and
//! fullscreen state never live in globals.

use kotodama_core::{KotodamaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-frame render switches, owned by the app and passed into the
/// compositor every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Dual half-viewport stereoscopic output
    pub stereo: bool,
    /// Effective pixel density (device density after the tier cap)
    pub pixel_density: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            stereo: false,
            pixel_density: 1.0,
        }
    }
}

/// Optional `kotodama.toml` tuning. Missing file or missing keys fall back
/// to defaults; a malformed file is a Config error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Window title
    pub title: String,
    /// Initial window size (logical pixels)
    pub width: u32,
    pub height: u32,
    /// Start in stereo mode
    pub stereo: bool,
    /// Seed for the field RNG; 0 derives one from the clock
    pub seed: u32,
    /// Path to the TTF glyph source
    pub font: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "kotodama".to_string(),
            width: 1280,
            height: 720,
            stereo: false,
            seed: 0,
            font: "assets/fonts/MPLUS1-Thin.ttf".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| KotodamaError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = AppConfig::default();
        assert!(config.width > 0 && config.height > 0);
        assert!(!config.stereo);
        assert!(!config.font.is_empty());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str("stereo = true\nseed = 7").unwrap();
        assert!(config.stereo);
        assert_eq!(config.seed, 7);
        assert_eq!(config.width, AppConfig::default().width);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = AppConfig {
            title: "test".into(),
            width: 640,
            height: 480,
            stereo: true,
            seed: 99,
            font: "x.ttf".into(),
        };
        let text = toml::to_string(&config).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load(Path::new("definitely/not/here.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
