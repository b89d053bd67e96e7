//! Height vertices from a quantized heightmap

use glam::Vec3;

use crate::core::{Error, Result};
use crate::terrain::{ElementKind, HeightField, LandscapeElement, LandscapeStore, Raster};
use super::config::HeightMapParams;
use super::{check_mask, is_masked};

/// Base appearance distance of a vertex on the coarsest grid level
const COMMON_DISTANCE: f32 = 750.0;

/// Largest power-of-two step (starting at `extent`) that evenly divides `coord`.
fn aligned_step(coord: u32, extent: u32) -> u32 {
    let mut step = extent;
    while step > 1 && coord % step != 0 {
        step >>= 1;
    }
    step.max(1)
}

impl LandscapeStore {
    /// Install the height field and emit height vertices from it.
    ///
    /// Walks the grid at `step_x`/`step_z`. Border cells always emit a vertex.
    /// Interior cells emit only when not masked and when the local curvature
    /// reaches `steep_threshold`. Vertices aligned to coarser power-of-two grid
    /// levels stay visible from further away; roughly one border vertex in
    /// eight is visible from anywhere so the outer hull never opens up.
    ///
    /// Returns the number of emitted elements.
    pub fn set_height_map(
        &mut self,
        mask: Option<&Raster<u8>>,
        heights: Raster<u16>,
        ground: Raster<u8>,
        params: &HeightMapParams,
    ) -> Result<usize> {
        if params.step_x == 0 || params.step_z == 0 {
            return Err(Error::InvalidStride(params.step_x, params.step_z));
        }
        check_mask(mask, &heights)?;
        let field = HeightField::new(*self.bounds(), heights, ground)?;

        let rect = self.rect();
        let (w, h) = field.samples().dims();
        let (step_x, step_z) = (params.step_x, params.step_z);
        let hull_distance = rect.width() + rect.depth();
        let before = self.len();

        let mut emitted = Vec::with_capacity((w / step_x) as usize * (h / step_z) as usize);
        for z in (0..h).step_by(step_z as usize) {
            let tz = aligned_step(z, h);
            for x in (0..w).step_by(step_x as usize) {
                let border = x == 0 || x >= w.saturating_sub(step_x) || z == 0 || z >= h.saturating_sub(step_z);
                if is_masked(mask, x, z) && !border {
                    continue;
                }

                let (c, l, r, u, d) = field.samples().cross(x, z);
                let (c, l, r, u, d) = (c as f32, l as f32, r as f32, u as f32, d as f32);
                let vx = (l + r) * 0.5 - c;
                let vz = (u + d) * 0.5 - c;
                let curvature = (vx * vx + vz * vz).sqrt();
                if curvature < params.steep_threshold && !border {
                    continue;
                }

                let position = Vec3::new(
                    rect.world_x(x as f32, w),
                    field.denormalize(c),
                    rect.world_z(z as f32, h),
                );

                let mut dx = r - l;
                let dz = d - u;
                let len = (dx * dx + dz * dz).sqrt();
                if len != 0.0 {
                    dx /= len;
                }
                let slope = (128.0 + dx * 127.0) as u8;
                let ground_type = field.ground().get(x, z);

                let tx = aligned_step(x, w);
                let mut size = tx as f32 / w as f32;
                if tz < tx {
                    size = tz as f32 / h as f32;
                }
                size *= COMMON_DISTANCE * params.distance_factor;
                if border && (x + z) & 7 == 0 {
                    size = hull_distance;
                }

                emitted.push(LandscapeElement::new(
                    ElementKind::Height,
                    position,
                    [slope, ground_type, 0],
                    size * size,
                ));
            }
        }

        self.elements_mut().extend(emitted);
        self.replace_height_field(field);

        let count = self.len() - before;
        log::debug!("set_height_map: {} height vertices from {}x{} field", count, w, h);
        Ok(count)
    }
}
