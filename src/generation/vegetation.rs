//! Randomly scattered trees, grass and flowers

use glam::Vec3;

use crate::core::Result;
use crate::terrain::{ElementKind, LandscapeElement, LandscapeStore, Raster};
use super::config::ScatterParams;
use super::rng::PassRng;
use super::{check_mask, is_masked, ripple};

const TREE_DISTANCE: f32 = 200.0;
const TREE_DISTANCE_RAND: f32 = 200.0;
const GRASS_DISTANCE: f32 = 200.0;
const FLOWER_DISTANCE: f32 = 75.0;

/// Height difference across six cells above which grass is not placed
const GRASS_MAX_SLOPE: f32 = 0.5;

impl LandscapeStore {
    /// Scatter trees over the non-zero cells of `map`.
    ///
    /// Every cell draws six random values, masked or not. Trees store
    /// brightness in `p0`, height in `p1` and scale flags in `p2` (bit 7 marks
    /// a big tree, whose trunk sits deeper in the ground).
    pub fn set_trees(
        &mut self,
        mask: Option<&Raster<u8>>,
        map: &Raster<u8>,
        params: &ScatterParams,
    ) -> Result<usize> {
        check_mask(mask, map)?;
        let rect = self.rect();
        let (w, h) = map.dims();
        let modulo = params.random_modulo.max(1);
        let before = self.len();
        let mut rng = PassRng::new();

        for z in 0..h {
            for x in 0..w {
                let r1 = rng.next_u31();
                let _r2 = rng.next_u31();
                let r3 = rng.next_u31();
                let r4 = rng.next_u31();
                let r5 = rng.next_u31();
                let r6 = rng.next_byte();
                if is_masked(mask, x, z) || map.get(x, z) == 0 || r1 % modulo != 0 {
                    continue;
                }

                let px = rect.world_x(x as f32, w);
                let pz = rect.world_z(z as f32, h);
                let big_tree = if r6 >= 220 { 1 } else { 0 };
                let py = self.height(px, pz) - 0.25 - 0.75 * big_tree as f32;
                let size = TREE_DISTANCE + (r5 & 255) as f32 / 255.0 * TREE_DISTANCE_RAND;
                self.push(LandscapeElement::new(
                    ElementKind::Tree,
                    Vec3::new(px, py, pz),
                    [(r3 & 255) as u8, (r4 & 255) as u8, ((r6 & 1) + big_tree * 128) as u8],
                    size * size,
                ));
            }
        }

        let count = self.len() - before;
        log::debug!("set_trees: {} trees from {}x{} raster", count, w, h);
        Ok(count)
    }

    /// Scatter grass tufts over the non-zero cells of `map`, skipping steep ground.
    ///
    /// Every cell draws seven random values. Tufts are jittered inside their
    /// cell and store lightness, overall size and width in `p0..p2`.
    pub fn set_grass(
        &mut self,
        mask: Option<&Raster<u8>>,
        map: &Raster<u8>,
        params: &ScatterParams,
    ) -> Result<usize> {
        check_mask(mask, map)?;
        let rect = self.rect();
        let (w, h) = map.dims();
        let modulo = params.random_modulo.max(1);
        let slope_step = 3.0 * rect.width() / w as f32;
        let before = self.len();
        let mut rng = PassRng::new();

        for z in 0..h {
            for x in 0..w {
                let r1 = rng.next_u31();
                let _r2 = rng.next_u31();
                let r3 = rng.next_u31();
                let r4 = rng.next_u31();
                let r5 = rng.next_u31();
                let r6 = rng.next_u31();
                let r7 = rng.next_u31();
                if is_masked(mask, x, z) || map.get(x, z) == 0 {
                    continue;
                }

                let px0 = rect.world_x(x as f32, w);
                let pz0 = rect.world_z(z as f32, h);
                let dx = self.height(px0 + slope_step, pz0) - self.height(px0 - slope_step, pz0);
                let dz = self.height(px0, pz0 + slope_step) - self.height(px0, pz0 - slope_step);
                let not_steep = (dx * dx + dz * dz).sqrt() < GRASS_MAX_SLOPE;
                if r1 % modulo != 0 || !not_steep {
                    continue;
                }

                let ox = (r6 & 255) as f32 / 255.0;
                let oz = (r7 & 255) as f32 / 255.0;
                let px = rect.world_x(x as f32 + ox, w);
                let pz = rect.world_z(z as f32 + oz, h);
                let py = self.height(px, pz);
                let lightness = ripple(px * 0.25, pz * 0.25) * 8.0 + 22.0;
                let size = GRASS_DISTANCE * ((r5 & 255) as f32 / 255.0 * 0.75 + 0.25);
                self.push(LandscapeElement::new(
                    ElementKind::Grass,
                    Vec3::new(px, py, pz),
                    [lightness as u8, (r3 & 255) as u8, (r4 & 255) as u8],
                    size * size,
                ));
            }
        }

        let count = self.len() - before;
        log::debug!("set_grass: {} tufts from {}x{} raster", count, w, h);
        Ok(count)
    }

    /// Scatter flowers over the non-zero cells of `map`.
    ///
    /// Every cell draws seven random values. Flowers store a colour index
    /// (0..=3) in `p0`, an animation phase in `p1` and their size in `p2`.
    pub fn set_flowers(
        &mut self,
        mask: Option<&Raster<u8>>,
        map: &Raster<u8>,
        params: &ScatterParams,
    ) -> Result<usize> {
        check_mask(mask, map)?;
        let rect = self.rect();
        let (w, h) = map.dims();
        let modulo = params.random_modulo.max(1);
        let before = self.len();
        let mut rng = PassRng::new();

        for z in 0..h {
            for x in 0..w {
                let r1 = rng.next_u31();
                let _r2 = rng.next_u31();
                let r3 = rng.next_u31();
                let r4 = rng.next_u31();
                let r5 = rng.next_u31();
                let _r6 = rng.next_u31();
                let r7 = rng.next_u31();
                if is_masked(mask, x, z) || map.get(x, z) == 0 || r1 % modulo != 0 {
                    continue;
                }

                let px = rect.world_x(x as f32, w);
                let pz = rect.world_z(z as f32, h);
                let py = self.height(px, pz) + 0.5;
                let mut f = ripple(px * 0.5, pz * 0.5);
                if r3 & 7 == 0 {
                    f = (r4 & 7) as f32 / 7.0;
                }
                let colour = ((f * 4.0) as i32 & 3) as u8;
                let phase = (r5 & 255) as u8;
                let scale = (r7 & 255) as u8;
                let size = FLOWER_DISTANCE
                    * ((r5 & 255) as f32 / 255.0 * 0.75 + 0.25)
                    * (scale as f32 / 255.0 * 0.5 + 0.5);
                self.push(LandscapeElement::new(
                    ElementKind::Flower,
                    Vec3::new(px, py, pz),
                    [colour, phase, scale],
                    size * size,
                ));
            }
        }

        let count = self.len() - before;
        log::debug!("set_flowers: {} flowers from {}x{} raster", count, w, h);
        Ok(count)
    }
}
