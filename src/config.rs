//! Server configuration

use std::path::Path;

use serde::Deserialize;

use crate::core::{Error, Result};
use crate::viz::classifier::MAX_LEVELS;
use crate::viz::color::Rgba;

/// Configuration for map loading and visualization.
///
/// Every field has a default, so a JSON config file only needs the fields
/// it overrides.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Coordinate frame the map and visualization are expressed in.
    pub frame_id: String,
    /// Color voxels by height instead of the fixed color.
    pub use_height_map: bool,
    /// Compression of the usable hue range, in (0, 1]. Keeps the color
    /// wheel from visually wrapping within one map.
    pub color_factor: f64,
    /// Uniform cube color used when height coloring is disabled.
    pub fixed_color: Rgba,
    /// Number of LOD levels to emit, in 1..=16.
    pub level_count: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            frame_id: "/map".to_string(),
            use_height_map: true,
            color_factor: 0.8,
            fixed_color: Rgba::new(0.0, 0.0, 1.0, 1.0),
            level_count: MAX_LEVELS,
        }
    }
}

impl ServerConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on out-of-range knobs, before any load work happens.
    ///
    /// `level_count` stays bounded to preserve the fixed-index delivery
    /// contract of the visualization.
    pub fn validate(&self) -> Result<()> {
        if self.level_count == 0 || self.level_count > MAX_LEVELS {
            return Err(Error::Config(format!(
                "level_count must be in 1..={MAX_LEVELS}, got {}",
                self.level_count
            )));
        }
        if !(self.color_factor > 0.0 && self.color_factor <= 1.0) {
            return Err(Error::Config(format!(
                "color_factor must be in (0, 1], got {}",
                self.color_factor
            )));
        }
        Ok(())
    }
}
