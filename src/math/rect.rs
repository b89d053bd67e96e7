//! World-space extents and the affine world <-> grid mapping

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle on the XZ ground plane.
///
/// Grids covering the rectangle map `[min_x, max_x) x [min_z, max_z)` linearly
/// onto `[0, w) x [0, h)` cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    pub min_x: f32,
    pub min_z: f32,
    pub max_x: f32,
    pub max_z: f32,
}

impl WorldRect {
    pub fn new(min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Self {
        Self { min_x, min_z, max_x, max_z }
    }

    /// Extent along X
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Extent along Z
    pub fn depth(&self) -> f32 {
        self.max_z - self.min_z
    }

    /// Fractional grid X coordinate of a world X for a grid `w` cells wide
    pub fn grid_x(&self, x: f32, w: u32) -> f32 {
        (x - self.min_x) * w as f32 / self.width()
    }

    /// Fractional grid Z coordinate of a world Z for a grid `h` cells deep
    pub fn grid_z(&self, z: f32, h: u32) -> f32 {
        (z - self.min_z) * h as f32 / self.depth()
    }

    /// World X of a (possibly fractional) grid X coordinate
    pub fn world_x(&self, gx: f32, w: u32) -> f32 {
        self.width() * gx / w as f32 + self.min_x
    }

    /// World Z of a (possibly fractional) grid Z coordinate
    pub fn world_z(&self, gz: f32, h: u32) -> f32 {
        self.depth() * gz / h as f32 + self.min_z
    }

    /// Integer cell containing a world position, unclamped.
    pub fn cell(&self, x: f32, z: f32, w: u32, h: u32) -> (i64, i64) {
        (
            self.grid_x(x, w).floor() as i64,
            self.grid_z(z, h).floor() as i64,
        )
    }

    /// Integer cell containing a world position, or `None` outside the grid.
    pub fn cell_checked(&self, x: f32, z: f32, w: u32, h: u32) -> Option<(u32, u32)> {
        let (cx, cz) = self.cell(x, z, w, h);
        if cx < 0 || cz < 0 || cx >= w as i64 || cz >= h as i64 {
            return None;
        }
        Some((cx as u32, cz as u32))
    }
}

/// Full landscape extents: the ground rectangle plus the height range that
/// quantized height samples are mapped onto.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min_x: -250.0,
            max_x: 250.0,
            min_y: 0.0,
            max_y: 1000.0,
            min_z: -250.0,
            max_z: 250.0,
        }
    }
}

impl WorldBounds {
    pub fn new(min_x: f32, min_z: f32, max_x: f32, max_z: f32, min_y: f32, max_y: f32) -> Self {
        Self { min_x, max_x, min_y, max_y, min_z, max_z }
    }

    /// Ground-plane rectangle
    pub fn rect(&self) -> WorldRect {
        WorldRect::new(self.min_x, self.min_z, self.max_x, self.max_z)
    }

    /// Height range
    pub fn height_range(&self) -> f32 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_mapping_roundtrip() {
        let rect = WorldRect::new(-10.0, 0.0, 10.0, 40.0);
        assert_eq!(rect.grid_x(0.0, 20), 10.0);
        assert_eq!(rect.grid_z(20.0, 8), 4.0);
        assert_eq!(rect.world_x(10.0, 20), 0.0);
        assert_eq!(rect.world_z(4.0, 8), 20.0);
    }

    #[test]
    fn test_cell_checked() {
        let rect = WorldRect::new(0.0, 0.0, 4.0, 4.0);
        assert_eq!(rect.cell_checked(2.5, 3.9, 4, 4), Some((2, 3)));
        assert_eq!(rect.cell_checked(4.0, 1.0, 4, 4), None);
        assert_eq!(rect.cell_checked(-0.1, 1.0, 4, 4), None);
    }

    #[test]
    fn test_bounds_rect() {
        let bounds = WorldBounds::new(0.0, 1.0, 2.0, 3.0, -5.0, 5.0);
        assert_eq!(bounds.rect(), WorldRect::new(0.0, 1.0, 2.0, 3.0));
        assert_eq!(bounds.height_range(), 10.0);
    }
}
