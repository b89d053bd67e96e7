//! Generation configuration, loadable from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::math::WorldBounds;

/// Grid walk for height vertices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightMapParams {
    /// Stride along X (width) between candidate vertices.
    pub step_x: u32,
    /// Stride along Z (height) between candidate vertices.
    pub step_z: u32,
    /// Scales the distance at which height vertices appear.
    pub distance_factor: f32,
    /// Minimum local curvature (in raw samples) for an interior vertex to be kept.
    pub steep_threshold: f32,
}

impl Default for HeightMapParams {
    fn default() -> Self {
        Self {
            step_x: 1,
            step_z: 1,
            distance_factor: 1.0,
            steep_threshold: 1.0,
        }
    }
}

/// Random scattering of trees, grass and flowers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterParams {
    /// Roughly one in `random_modulo` eligible cells receives an element.
    pub random_modulo: u32,
}

impl Default for ScatterParams {
    fn default() -> Self {
        Self { random_modulo: 16 }
    }
}

/// Edge thresholds for stone and water rasters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureThresholds {
    /// Raster values `>= outer` belong to the feature.
    pub outer: u8,
    /// Edge of this wider margin receives extra plain height vertices.
    pub cleanup: u8,
}

impl Default for FeatureThresholds {
    fn default() -> Self {
        Self { outer: 128, cleanup: 64 }
    }
}

/// Edge thresholds for the road raster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadThresholds {
    pub outer: u8,
    pub inner: u8,
    pub cleanup: u8,
}

impl Default for RoadThresholds {
    fn default() -> Self {
        Self { outer: 100, inner: 128, cleanup: 64 }
    }
}

/// Collision field resolution and smoothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionParams {
    pub width: u32,
    pub height: u32,
    /// Box blur radius applied after stamping, 0 disables it
    pub blur_radius: u32,
}

impl Default for CollisionParams {
    fn default() -> Self {
        Self { width: 1024, height: 1024, blur_radius: 3 }
    }
}

/// Configuration for a full landscape generation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub bounds: WorldBounds,
    pub height_map: HeightMapParams,
    pub trees: ScatterParams,
    pub grass: ScatterParams,
    pub flowers: ScatterParams,
    pub stones: FeatureThresholds,
    pub water: FeatureThresholds,
    pub roads: RoadThresholds,
    pub collision: CollisionParams,
}

impl GenerationConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = GenerationConfig::from_json_str(
            r#"{ "trees": { "random_modulo": 4 }, "height_map": { "step_x": 2 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.trees.random_modulo, 4);
        assert_eq!(cfg.grass, ScatterParams::default());
        assert_eq!(cfg.height_map.step_x, 2);
        assert_eq!(cfg.height_map.step_z, 1);
        assert_eq!(cfg.bounds, WorldBounds::default());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("landscape.json");
        let mut cfg = GenerationConfig::default();
        cfg.roads.inner = 140;
        std::fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();
        assert_eq!(GenerationConfig::from_json_file(&path).unwrap(), cfg);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = GenerationConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::core::Error::Config(_)));
    }
}
