//! Widget settings with TOML support.
//!
//! Every struct uses `#[serde(default)]`, so a partial TOML document (e.g. only
//! a `[particles]` table with `count = 120`) keeps defaults for the rest.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level settings container
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Background animation
    pub particles: ParticleConfig,
    /// Computation history
    pub history: HistoryConfig,
}

/// Background animation settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Number of particles, fixed for the lifetime of the field
    pub count: usize,
    /// Pairs closer than this are connected by a line
    pub link_distance: f64,
    /// Line alpha is `(link_distance - d) / alpha_divisor`
    pub alpha_divisor: f64,
    /// Each velocity component is drawn from `[-speed / 2, speed / 2)`
    pub speed: f64,
    pub point_radius: f64,
    pub point_alpha: f64,
    /// HSL saturation and lightness, percent
    pub saturation: u32,
    pub lightness: u32,
    /// Fill painted over the whole surface every frame
    pub trail_color: String,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        ParticleConfig {
            count: 60,
            link_distance: 120.0,
            alpha_divisor: 200.0,
            speed: 0.6,
            point_radius: 1.8,
            point_alpha: 0.95,
            saturation: 90,
            lightness: 60,
            trail_color: "rgba(2,6,23,0.12)".to_string(),
        }
    }
}

/// Computation history settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Keep at most this many entries; unbounded when absent
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfigError(String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "config parse error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl WidgetConfig {
    /// Parses settings from TOML text. Missing fields use defaults
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError(e.to_string()))
    }
}
