use crate::bounds::BoundsVolume;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Room dimensions and construction parameters for one editing session.
///
/// Supplied by the project store at session start and treated as read-only
/// constants afterwards; the engine only ever derives the bounds volume from
/// them.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "ProjectConfig::default_width")]
    pub width: f32,
    #[serde(default = "ProjectConfig::default_length")]
    pub length: f32,
    #[serde(default = "ProjectConfig::default_height")]
    pub height: f32,
    #[serde(default)]
    pub wall_thickness: Option<f32>,
    #[serde(default)]
    pub door_width: Option<f32>,
    #[serde(default)]
    pub door_height: Option<f32>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            length: Self::default_length(),
            height: Self::default_height(),
            wall_thickness: None,
            door_width: None,
            door_height: None,
        }
    }
}

impl ProjectConfig {
    const fn default_width() -> f32 {
        10.0
    }

    const fn default_length() -> f32 {
        10.0
    }

    const fn default_height() -> f32 {
        2.8
    }

    pub fn from_dimensions(width: f32, length: f32, height: f32) -> Self {
        Self { width, length, height, ..Self::default() }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read project file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse project file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] project load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn bounds_volume(&self) -> BoundsVolume {
        BoundsVolume::from_dimensions(self.width, self.length, self.height)
    }
}
