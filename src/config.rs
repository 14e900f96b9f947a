//! Viewer configuration (TOML)
//!
//! Every section and field has a default, so a missing or partial file still
//! produces a complete configuration. CLI flags override individual fields.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, MeshError};
use crate::graph::Shading;
use crate::noise::NoiseSettings;
use crate::strategy::{GradientPull, SamplingStrategy, UniformGrid};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ViewerConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub noise: NoiseSettings,
    #[serde(default)]
    pub primitives: PrimitiveConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[default]
    UniformGrid,
    GradientPull,
}

impl StrategyKind {
    pub fn build(self, resolution: u32) -> Result<Box<dyn SamplingStrategy>, MeshError> {
        Ok(match self {
            StrategyKind::UniformGrid => Box::new(UniformGrid::new(resolution)?),
            StrategyKind::GradientPull => Box::new(GradientPull::new(resolution)?),
        })
    }
}

/// Which scalar field the demo graphs plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceKind {
    /// Radial ripple that tightens toward the centre.
    #[default]
    Ripple,
    /// Layered Perlin noise from the `[noise]` section.
    Noise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Cells per side of the sampling lattice (default: 50)
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default)]
    pub shading: Shading,
    #[serde(default)]
    pub surface: SurfaceKind,
    /// Show every strategy/shading pair side by side instead of a single graph (default: true)
    #[serde(default = "default_true")]
    pub compare: bool,
    #[serde(default = "default_bounds_min")]
    pub bounds_min: [f32; 2],
    #[serde(default = "default_bounds_max")]
    pub bounds_max: [f32; 2],
    /// Model scale applied to each graph (default: [5, 1, 5])
    #[serde(default = "default_graph_scale")]
    pub scale: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveConfig {
    /// Segments for cone, cylinder and pyramid (default: 32)
    #[serde(default = "default_detail")]
    pub detail: u32,
    /// Highest icosphere resolution in the row of spheres (default: 4)
    #[serde(default = "default_sphere_resolution")]
    pub sphere_resolution: u32,
    #[serde(default = "default_uv_columns")]
    pub uv_columns: u32,
    #[serde(default = "default_uv_rows")]
    pub uv_rows: u32,
}

fn default_title() -> String {
    "graphmesh".to_string()
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_resolution() -> u32 {
    50
}
fn default_bounds_min() -> [f32; 2] {
    [-1.0, -1.0]
}
fn default_bounds_max() -> [f32; 2] {
    [1.0, 1.0]
}
fn default_graph_scale() -> [f32; 3] {
    [5.0, 1.0, 5.0]
}
fn default_detail() -> u32 {
    32
}
fn default_sphere_resolution() -> u32 {
    4
}
fn default_uv_columns() -> u32 {
    30
}
fn default_uv_rows() -> u32 {
    20
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            vsync: default_true(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            strategy: StrategyKind::default(),
            shading: Shading::default(),
            surface: SurfaceKind::default(),
            compare: default_true(),
            bounds_min: default_bounds_min(),
            bounds_max: default_bounds_max(),
            scale: default_graph_scale(),
        }
    }
}

impl Default for PrimitiveConfig {
    fn default() -> Self {
        Self {
            detail: default_detail(),
            sphere_resolution: default_sphere_resolution(),
            uv_columns: default_uv_columns(),
            uv_rows: default_uv_rows(),
        }
    }
}

impl ViewerConfig {
    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid configuration TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialize_empty() {
        let config: ViewerConfig = toml::from_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.graph.resolution, 50);
        assert_eq!(config.graph.strategy, StrategyKind::UniformGrid);
        assert!(config.window.vsync);
    }

    #[test]
    fn test_config_deserialize_partial_graph() {
        let toml_str = r#"
[graph]
strategy = "gradient-pull"
shading = "smooth"
resolution = 12

[noise]
octaves = 6
"#;
        let config: ViewerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.graph.strategy, StrategyKind::GradientPull);
        assert_eq!(config.graph.shading, Shading::Smooth);
        assert_eq!(config.graph.resolution, 12);
        assert_eq!(config.graph.scale, [5.0, 1.0, 5.0]); // default
        assert_eq!(config.noise.octaves, 6);
        assert_eq!(config.noise.seed, NoiseSettings::default().seed); // default
        assert_eq!(config.primitives, PrimitiveConfig::default());
    }

    #[test]
    fn test_config_rejects_unknown_strategy() {
        let result: Result<ViewerConfig, _> = toml::from_str("[graph]\nstrategy = \"marching-cubes\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_strategy_kind_builds_matching_strategy() {
        let strategy = StrategyKind::GradientPull.build(8).unwrap();
        assert_eq!(strategy.name(), "gradient-pull");
        assert_eq!(strategy.resolution(), 8);
        assert!(StrategyKind::UniformGrid.build(0).is_err());
    }

    #[test]
    fn test_config_serialize_roundtrip() {
        let mut config = ViewerConfig::default();
        config.graph.surface = SurfaceKind::Noise;
        config.primitives.detail = 7;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: ViewerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ViewerConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
