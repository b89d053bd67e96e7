//! Collision occupancy field with bilinear queries and line marching

use glam::Vec2;

use crate::math::WorldRect;
use crate::terrain::Raster;

/// Occupancy values at or above this are solid
pub const SOLID_THRESHOLD: f32 = 128.0;

/// Returned for positions outside the field
const OUTSIDE_VALUE: f32 = 255.0;

/// Fraction of half a cell advanced per marching step
const STEP_SPEED: f32 = 0.1;

/// Segments shorter than this never collide
const MIN_SEGMENT_LENGTH: f32 = 1e-5;

/// Result of a blocked line march.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineHit {
    /// Last non-solid position along the segment
    pub position: Vec2,
    /// Field normal at `position`, pointing away from the solid area
    pub normal: Vec2,
}

/// A `width x height` grid of 8-bit occupancy values over a world rectangle.
///
/// Independent of the rendering height field; built by stamping circles and
/// masks. Everything outside the grid reads as solid.
#[derive(Clone, Debug)]
pub struct CollisionField {
    rect: WorldRect,
    data: Raster<u8>,
}

impl CollisionField {
    /// An empty (fully walkable) field
    pub fn new(rect: WorldRect, width: u32, height: u32) -> Self {
        Self {
            rect,
            data: Raster::filled(width.max(1), height.max(1), 0),
        }
    }

    pub fn rect(&self) -> &WorldRect {
        &self.rect
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    pub fn data(&self) -> &Raster<u8> {
        &self.data
    }

    /// Cell column containing world `x`, not clamped
    pub fn x_coord(&self, x: f32) -> i64 {
        self.rect.grid_x(x, self.width()).floor() as i64
    }

    /// Cell row containing world `z`, not clamped
    pub fn z_coord(&self, z: f32) -> i64 {
        self.rect.grid_z(z, self.height()).floor() as i64
    }

    /// World X of a cell column
    pub fn x_pos(&self, x: i64) -> f32 {
        self.rect.world_x(x as f32, self.width())
    }

    /// World Z of a cell row
    pub fn z_pos(&self, z: i64) -> f32 {
        self.rect.world_z(z as f32, self.height())
    }

    /// Bilinear occupancy at a world position, 255 outside the field.
    ///
    /// The last row and column count as outside since they have no far
    /// neighbour to interpolate with.
    pub fn point(&self, x: f32, z: f32) -> f32 {
        let (w, h) = self.data.dims();
        let gx = self.rect.grid_x(x, w);
        let gz = self.rect.grid_z(z, h);
        let xp = gx.floor();
        let zp = gz.floor();
        if xp < 0.0 || zp < 0.0 || xp >= (w - 1) as f32 || zp >= (h - 1) as f32 {
            return OUTSIDE_VALUE;
        }
        let fx = gx - xp;
        let fz = gz - zp;
        let (xp, zp) = (xp as u32, zp as u32);
        let v00 = self.data.get(xp, zp) as f32;
        let v10 = self.data.get(xp + 1, zp) as f32;
        let v11 = self.data.get(xp + 1, zp + 1) as f32;
        let v01 = self.data.get(xp, zp + 1) as f32;
        let top = (v10 - v00) * fx + v00;
        let btm = (v11 - v01) * fx + v01;
        (btm - top) * fz + top
    }

    pub fn is_solid(&self, x: f32, z: f32) -> bool {
        self.point(x, z) >= SOLID_THRESHOLD
    }

    /// Unit normal of the occupancy surface at a world position.
    ///
    /// Negated central difference over half a cell; zero where the field is flat.
    pub fn normal(&self, x: f32, z: f32) -> Vec2 {
        let dx = self.rect.width() / self.width() as f32 * 0.5;
        let dz = self.rect.depth() / self.height() as f32 * 0.5;
        let ax = self.point(x + dx, z) - self.point(x - dx, z);
        let az = self.point(x, z + dz) - self.point(x, z - dz);
        -Vec2::new(ax, az).normalize_or_zero()
    }

    /// Replace every cell with the mean of its `(2 * radius + 1)^2` neighbourhood.
    ///
    /// Kernel cells outside the field are left out of the mean.
    pub fn box_blur(&mut self, radius: u32) {
        let src = self.data.clone();
        let (w, h) = src.dims();
        let r = radius as i64;
        for z in 0..h as i64 {
            for x in 0..w as i64 {
                let mut sum = 0.0f32;
                let mut count = 0.0f32;
                for kz in z - r..=z + r {
                    for kx in x - r..=x + r {
                        if let Some(v) = src.get_checked(kx, kz) {
                            sum += v as f32;
                            count += 1.0;
                        }
                    }
                }
                let v = if count > 0.0 { sum / count } else { 0.0 };
                self.data.set(x as u32, z as u32, v as u8);
            }
        }
    }

    /// Stamp a soft disc reaching `2 * radius` around `(x, z)`.
    ///
    /// Occupancy falls off linearly from 255 at the center to 0 at the rim and
    /// is merged with the maximum, so stamping never lowers a cell.
    pub fn place_circle(&mut self, x: f32, z: f32, radius: f32) {
        let reach = radius * 2.0;
        if reach <= 0.0 {
            return;
        }
        let (w, h) = self.data.dims();
        let x0 = self.x_coord(x - reach).max(0);
        let z0 = self.z_coord(z - reach).max(0);
        let x1 = self.x_coord(x + reach).min(w as i64 - 1);
        let z1 = self.z_coord(z + reach).min(h as i64 - 1);
        for zp in z0..=z1 {
            let dz = (self.z_pos(zp) - z) / reach;
            for xp in x0..=x1 {
                let dx = (self.x_pos(xp) - x) / reach;
                let d = 1.0 - (dx * dx + dz * dz).sqrt();
                if d <= 0.0 {
                    continue;
                }
                let k = (d * 256.0).clamp(0.0, 255.0) as u8;
                self.merge(xp as u32, zp as u32, k);
            }
        }
    }

    /// Resample `mask` onto the field and merge it with the maximum.
    ///
    /// Each resampled value becomes `value * scale + add * 256`, clamped to a
    /// byte; `add = 0.5` lifts the whole mask by 128.
    pub fn place_mask(&mut self, mask: &Raster<u8>, scale: f32, add: f32) {
        let (mw, mh) = mask.dims();
        let (w, h) = self.data.dims();
        for z in 0..h {
            for x in 0..w {
                let x3 = x as f32 * mw as f32 / w as f32;
                let z3 = z as f32 * mh as f32 / h as f32;
                let x2 = x3.floor();
                let z2 = z3.floor();
                let fx = x3 - x2;
                let fz = z3 - z2;
                let (x2, z2) = (x2 as i64, z2 as i64);
                let v00 = mask.get_clamped(x2, z2) as f32;
                let v10 = mask.get_clamped(x2 + 1, z2) as f32;
                let v11 = mask.get_clamped(x2 + 1, z2 + 1) as f32;
                let v01 = mask.get_clamped(x2, z2 + 1) as f32;
                let top = (v10 - v00) * fx + v00;
                let btm = (v11 - v01) * fx + v01;
                let t = (btm - top) * fz + top;
                let k = (t * scale + add * 256.0).clamp(0.0, 255.0) as u8;
                self.merge(x, z, k);
            }
        }
    }

    #[inline]
    fn merge(&mut self, x: u32, z: u32, value: u8) {
        if value > self.data.get(x, z) {
            self.data.set(x, z, value);
        }
    }

    /// Distance advanced per step by [`collide_line`](Self::collide_line)
    pub fn march_step(&self) -> f32 {
        let step_x = self.rect.width() / self.width() as f32;
        let step_z = self.rect.depth() / self.height() as f32;
        step_x.min(step_z) * 0.5 * STEP_SPEED
    }

    /// March from `from` towards `to` and report the first blocked step.
    ///
    /// A start inside solid ground never collides. The march may overshoot
    /// `to` by less than one step and still report a hit there. Steps are
    /// taken in double precision from a step counter, so the march always
    /// ends even when a step is below the f32 spacing of the coordinates.
    pub fn collide_line(&self, from: Vec2, to: Vec2) -> Option<LineHit> {
        if self.is_solid(from.x, from.y) {
            return None;
        }
        let start = from.as_dvec2();
        let delta = to.as_dvec2() - start;
        let length = delta.length();
        if length < MIN_SEGMENT_LENGTH as f64 {
            return None;
        }
        let dir = delta / length;
        let step = self.march_step() as f64;
        if step <= 0.0 {
            return None;
        }

        let max_steps = (length / step).ceil() as u64 + 1;
        let mut last = from;
        for i in 1..=max_steps {
            let travelled = step * i as f64;
            let pos = (start + dir * travelled).as_vec2();
            if self.is_solid(pos.x, pos.y) {
                return Some(LineHit {
                    position: last,
                    normal: self.normal(last.x, last.y),
                });
            }
            if travelled > length {
                return None;
            }
            last = pos;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(size: u32) -> CollisionField {
        CollisionField::new(WorldRect::new(0.0, 0.0, size as f32, size as f32), size, size)
    }

    /// 100x100 field, solid for x >= 50
    fn wall() -> CollisionField {
        let mut f = field(100);
        let mut mask = Raster::filled(100, 100, 0u8);
        for z in 0..100 {
            for x in 50..100 {
                mask.set(x, z, 255);
            }
        }
        f.place_mask(&mask, 1.0, 0.0);
        f
    }

    #[test]
    fn test_outside_is_solid() {
        let f = field(16);
        assert_eq!(f.point(4.0, 4.0), 0.0);
        assert!(!f.is_solid(4.0, 4.0));
        assert_eq!(f.point(-0.5, 4.0), 255.0);
        assert_eq!(f.point(4.0, 15.5), 255.0);
        assert!(f.is_solid(100.0, 100.0));
    }

    #[test]
    fn test_coord_helpers() {
        let f = CollisionField::new(WorldRect::new(-250.0, -250.0, 250.0, 250.0), 1000, 500);
        assert_eq!(f.x_coord(0.0), 500);
        assert_eq!(f.z_coord(0.0), 250);
        assert_eq!(f.x_coord(-251.0), -2);
        assert_eq!(f.x_pos(500), 0.0);
        assert_eq!(f.z_pos(0), -250.0);
    }

    #[test]
    fn test_place_circle_monotonic() {
        let mut f = field(32);
        f.place_circle(20.0, 20.0, 1.0);
        let before = f.data().clone();
        f.place_circle(16.0, 16.0, 3.0);

        assert_eq!(f.data().get(16, 16), 255);
        for (a, b) in before.data().iter().zip(f.data().data()) {
            assert!(b >= a);
        }
        // cells beyond twice the radius are untouched
        assert_eq!(f.data().get(16, 23), 0);
        assert_eq!(f.data().get(9, 16), 0);
        assert!(f.data().get(16, 19) > 0);
    }

    #[test]
    fn test_place_circle_clips_at_border() {
        let mut f = field(8);
        f.place_circle(0.0, 0.0, 2.0);
        assert_eq!(f.data().get(0, 0), 255);
        f.place_circle(0.0, 0.0, 0.0);
    }

    #[test]
    fn test_box_blur_averages_in_bounds_cells() {
        let mut f = field(5);
        f.data.set(2, 2, 255);
        f.box_blur(1);
        assert_eq!(f.data().get(2, 2), 28);
        assert_eq!(f.data().get(1, 1), 28);
        assert_eq!(f.data().get(0, 0), 0);

        let mut f = field(5);
        f.data.set(0, 0, 200);
        f.box_blur(1);
        // the corner kernel only holds four in-bounds cells
        assert_eq!(f.data().get(0, 0), 50);
    }

    #[test]
    fn test_place_mask_resamples() {
        let mut f = field(4);
        let mask = Raster::new(2, 2, vec![0, 255, 0, 255]).unwrap();
        f.place_mask(&mask, 1.0, 0.0);
        let row: Vec<u8> = (0..4).map(|x| f.data().get(x, 0)).collect();
        assert_eq!(row, vec![0, 127, 255, 255]);

        // offset lifts every cell, merged with the max
        f.place_mask(&mask, 0.0, 0.5);
        let row: Vec<u8> = (0..4).map(|x| f.data().get(x, 1)).collect();
        assert_eq!(row, vec![128, 128, 255, 255]);
    }

    #[test]
    fn test_normal_points_away_from_solid() {
        let f = wall();
        let n = f.normal(49.0, 30.0);
        assert!(n.x < -0.99);
        assert!(n.y.abs() < 1e-6);
        assert_eq!(field(8).normal(3.0, 3.0), Vec2::ZERO);
    }

    #[test]
    fn test_collide_line_hits_wall() {
        let f = wall();
        let hit = f.collide_line(Vec2::new(10.0, 30.0), Vec2::new(90.0, 30.0)).unwrap();
        assert!(!f.is_solid(hit.position.x, hit.position.y));
        let next = hit.position + Vec2::X * f.march_step();
        assert!(f.is_solid(next.x, next.y));
        assert!((hit.position.x - 49.5).abs() < 0.1);
        assert!(hit.normal.x < -0.99);
    }

    #[test]
    fn test_collide_line_misses() {
        let f = wall();
        // entirely in open space
        assert!(f.collide_line(Vec2::new(10.0, 30.0), Vec2::new(20.0, 40.0)).is_none());
        // starting inside the wall
        assert!(f.collide_line(Vec2::new(60.0, 30.0), Vec2::new(10.0, 30.0)).is_none());
        // degenerate segment
        assert!(f.collide_line(Vec2::new(10.0, 30.0), Vec2::new(10.0, 30.0)).is_none());
    }

    #[test]
    fn test_collide_line_terminates_on_fine_grid_far_from_origin() {
        // each step is far below the f32 spacing around x = 10000
        let rect = WorldRect::new(10000.0, 0.0, 10001.0, 1.0);
        let open = CollisionField::new(rect, 1000, 1000);
        assert!(open.march_step() < 1e-4);
        assert!(open
            .collide_line(Vec2::new(10000.2, 0.5), Vec2::new(10000.8, 0.5))
            .is_none());

        let mut walled = CollisionField::new(rect, 1000, 1000);
        let mut mask = Raster::filled(1000, 1000, 0u8);
        for z in 0..1000 {
            for x in 500..1000 {
                mask.set(x, z, 255);
            }
        }
        walled.place_mask(&mask, 1.0, 0.0);
        let hit = walled
            .collide_line(Vec2::new(10000.2, 0.5), Vec2::new(10000.8, 0.5))
            .unwrap();
        assert!(!walled.is_solid(hit.position.x, hit.position.y));
        assert!((hit.position.x - 10000.5).abs() < 0.01);
    }
}
