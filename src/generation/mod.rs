//! Procedural landscape generators.
//!
//! Each generator scans an input raster (optionally gated by a mask where a
//! non-zero value means "skip") and appends elements to a [`LandscapeStore`].
//! Passes that need randomness start from a fresh [`PassRng`], so the same
//! inputs always reproduce the same elements in the same order.
//!
//! [`LandscapeStore`]: crate::terrain::LandscapeStore

pub mod config;
pub mod rng;
pub mod height_map;
pub mod vegetation;
pub mod features;
pub mod objects;

pub use config::{
    CollisionParams, FeatureThresholds, GenerationConfig, HeightMapParams, RoadThresholds,
    ScatterParams,
};
pub use rng::PassRng;
pub use objects::{DRAGON_OBJECT_ID, PORTAL_OBJECT_ID};

use crate::core::Result;
use crate::terrain::Raster;

/// Smooth pseudo-noise in `[0, 1]` used for brightness and relief variation.
#[inline]
pub(crate) fn ripple(px: f32, pz: f32) -> f32 {
    (px + pz + (px * 0.4 - pz * 0.2).sin() + (px * 0.7).cos() - (pz * 0.9).sin()).sin() * 0.5
        + 0.5
}

/// Validate an optional mask against the raster it gates.
pub(crate) fn check_mask<T: Copy>(mask: Option<&Raster<u8>>, map: &Raster<T>) -> Result<()> {
    match mask {
        Some(mask) => map.ensure_dims(mask),
        None => Ok(()),
    }
}

#[inline]
pub(crate) fn is_masked(mask: Option<&Raster<u8>>, x: u32, z: u32) -> bool {
    mask.is_some_and(|m| m.get(x, z) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ripple_range() {
        for i in 0..200 {
            let v = ripple(i as f32 * 0.37, i as f32 * -1.3);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_mask_check() {
        let map = Raster::filled(4, 4, 0u8);
        assert!(check_mask(None, &map).is_ok());
        assert!(check_mask(Some(&Raster::filled(4, 4, 0)), &map).is_ok());
        assert!(check_mask(Some(&Raster::filled(4, 3, 0)), &map).is_err());
        let mut mask = Raster::filled(4, 4, 0u8);
        mask.set(1, 2, 1);
        assert!(is_masked(Some(&mask), 1, 2));
        assert!(!is_masked(Some(&mask), 2, 1));
        assert!(!is_masked(None, 1, 2));
    }
}
