//! Quantized heightmap with a parallel ground-type grid

use crate::core::Result;
use crate::math::{WorldBounds, WorldRect};
use super::raster::Raster;

/// Largest quantized height sample
pub const HEIGHT_SAMPLE_MAX: f32 = 65535.0;

/// Keeps clamped reads strictly inside the last cell
const EDGE_EPSILON: f32 = 0.001;

/// Grid of 16-bit height samples mapped linearly onto `[min_y, max_y]`, plus a
/// per-cell ground type.
///
/// World reads clamp to the field (border samples replicate); writes outside
/// the field are dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    rect: WorldRect,
    min_y: f32,
    max_y: f32,
    heights: Raster<u16>,
    ground: Raster<u8>,
}

impl HeightField {
    /// Create a field over `bounds`. `ground` must match the dimensions of `heights`.
    pub fn new(bounds: WorldBounds, heights: Raster<u16>, ground: Raster<u8>) -> Result<Self> {
        heights.ensure_dims(&ground)?;
        Ok(Self {
            rect: bounds.rect(),
            min_y: bounds.min_y,
            max_y: bounds.max_y,
            heights,
            ground,
        })
    }

    /// A flat field at `min_y` with ground type 0
    pub fn flat(bounds: WorldBounds, width: u32, height: u32) -> Self {
        Self {
            rect: bounds.rect(),
            min_y: bounds.min_y,
            max_y: bounds.max_y,
            heights: Raster::filled(width, height, 0),
            ground: Raster::filled(width, height, 0),
        }
    }

    pub fn width(&self) -> u32 {
        self.heights.width()
    }

    pub fn height_cells(&self) -> u32 {
        self.heights.height()
    }

    pub fn rect(&self) -> &WorldRect {
        &self.rect
    }

    pub fn samples(&self) -> &Raster<u16> {
        &self.heights
    }

    pub fn ground(&self) -> &Raster<u8> {
        &self.ground
    }

    /// Convert a quantized sample (may be fractional) to a world height
    #[inline]
    pub fn denormalize(&self, sample: f32) -> f32 {
        sample * (self.max_y - self.min_y) / HEIGHT_SAMPLE_MAX + self.min_y
    }

    /// Convert a world height to a sample, clamped to `[0, 65535]`
    #[inline]
    pub fn quantize(&self, height: f32) -> u16 {
        let k = (height - self.min_y) / (self.max_y - self.min_y) * HEIGHT_SAMPLE_MAX;
        k.clamp(0.0, HEIGHT_SAMPLE_MAX) as u16
    }

    /// Bilinearly interpolated world height at `(x, z)`.
    ///
    /// `(x, z)` is clamped to the field bounds. `extra_col`/`extra_row` shift the
    /// sampled cell for neighbour lookups while keeping the fractional weights of
    /// the unshifted position. Each corner sample is clamped to the grid edge.
    pub fn height(&self, x: f32, z: f32, extra_col: i32, extra_row: i32) -> f32 {
        let r = &self.rect;
        let x = x.max(r.min_x).min(r.max_x - EDGE_EPSILON);
        let z = z.max(r.min_z).min(r.max_z - EDGE_EPSILON);
        let w = self.heights.width();
        let h = self.heights.height();
        let xf = r.grid_x(x, w);
        let zf = r.grid_z(z, h);
        let xi = xf.floor();
        let zi = zf.floor();
        let fx = xf - xi;
        let fz = zf - zi;

        let x0 = (xi as i64 + extra_col as i64).clamp(0, w as i64 - 1);
        let z0 = (zi as i64 + extra_row as i64).clamp(0, h as i64 - 1);
        let x1 = (x0 + 1).min(w as i64 - 1);
        let z1 = (z0 + 1).min(h as i64 - 1);

        let p00 = self.heights.get(x0 as u32, z0 as u32) as f32;
        let p10 = self.heights.get(x1 as u32, z0 as u32) as f32;
        let p11 = self.heights.get(x1 as u32, z1 as u32) as f32;
        let p01 = self.heights.get(x0 as u32, z1 as u32) as f32;
        let top = (p10 - p00) * fx + p00;
        let btm = (p11 - p01) * fx + p01;
        self.denormalize((btm - top) * fz + top)
    }

    /// Box-filtered height: the plain average of `height()` over a
    /// `(2 * radius + 1)^2` window of cell offsets.
    pub fn height_box(&self, x: f32, z: f32, radius: i32) -> f32 {
        let mut sum = 0.0;
        let mut count = 0.0;
        for zi in -radius..=radius {
            for xi in -radius..=radius {
                sum += self.height(x, z, xi, zi);
                count += 1.0;
            }
        }
        if count > 0.0 { sum / count } else { 0.0 }
    }

    /// Write a world height into the cell containing `(x, z)`.
    ///
    /// Positions outside `[min, max)` are ignored, and so is the last row and
    /// column of the grid.
    pub fn put_height(&mut self, x: f32, z: f32, height: f32) {
        let r = self.rect;
        if x < r.min_x || x >= r.max_x || z < r.min_z || z >= r.max_z {
            return;
        }
        let w = self.heights.width();
        let h = self.heights.height();
        let (xi, zi) = r.cell(x, z, w, h);
        if xi < 0 || zi < 0 || xi >= w as i64 - 1 || zi >= h as i64 - 1 {
            return;
        }
        let k = self.quantize(height);
        self.heights.set(xi as u32, zi as u32, k);
    }

    /// Raw sample at a cell, clamped to the border
    #[inline]
    pub fn sample_clamped(&self, x: i64, z: i64) -> u16 {
        self.heights.get_clamped(x, z)
    }

    /// Ground type at a cell, clamped to the border
    #[inline]
    pub fn ground_clamped(&self, x: i64, z: i64) -> u8 {
        self.ground.get_clamped(x, z)
    }

    /// Unit X component of the central-difference sample gradient at a cell,
    /// packed into a byte as `128 + dx * 127`.
    pub fn packed_slope_x(&self, x: i64, z: i64) -> u8 {
        let dx = self.sample_clamped(x + 1, z) as f32 - self.sample_clamped(x - 1, z) as f32;
        let dz = self.sample_clamped(x, z + 1) as f32 - self.sample_clamped(x, z - 1) as f32;
        let d = (dx * dx + dz * dz).sqrt();
        let nx = if d != 0.0 { dx / d } else { dx };
        (128.0 + nx * 127.0) as u8
    }
}
