//! Row-major 2D rasters used as generator inputs and as the object-placement layer

use crate::core::{Error, Result};

/// A `width x height` row-major grid of samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Copy> Raster<T> {
    /// Wrap an existing buffer, which must hold exactly `width * height` samples.
    pub fn new(width: u32, height: u32, data: Vec<T>) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize {
            return Err(Error::RasterSize { width, height, len: data.len() });
        }
        Ok(Self { width, height, data })
    }

    /// A raster with every sample set to `value`. Zero dimensions become 1.
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    #[inline]
    fn index(&self, x: u32, z: u32) -> usize {
        x as usize + z as usize * self.width as usize
    }

    /// Sample at an in-bounds cell. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: u32, z: u32) -> T {
        self.data[self.index(x, z)]
    }

    /// Sample with coordinates clamped to the border (edge values replicate)
    #[inline]
    pub fn get_clamped(&self, x: i64, z: i64) -> T {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let z = z.clamp(0, self.height as i64 - 1) as u32;
        self.get(x, z)
    }

    /// Sample at a signed cell, `None` outside the raster
    #[inline]
    pub fn get_checked(&self, x: i64, z: i64) -> Option<T> {
        if x < 0 || z < 0 || x >= self.width as i64 || z >= self.height as i64 {
            return None;
        }
        Some(self.get(x as u32, z as u32))
    }

    #[inline]
    pub fn set(&mut self, x: u32, z: u32, value: T) {
        let i = self.index(x, z);
        self.data[i] = value;
    }

    /// The four axis neighbours of a cell plus the cell itself, clamped to the border.
    ///
    /// Returned as `(center, left, right, up, down)` where left/right step along X
    /// and up/down step along Z.
    #[inline]
    pub fn cross(&self, x: u32, z: u32) -> (T, T, T, T, T) {
        let (x, z) = (x as i64, z as i64);
        (
            self.get_clamped(x, z),
            self.get_clamped(x - 1, z),
            self.get_clamped(x + 1, z),
            self.get_clamped(x, z - 1),
            self.get_clamped(x, z + 1),
        )
    }

    /// Fails with `DimensionMismatch` unless `other` has the same dimensions.
    pub fn ensure_dims<U>(&self, other: &Raster<U>) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(Error::DimensionMismatch {
                expected: self.dims(),
                actual: (other.width, other.height),
            });
        }
        Ok(())
    }
}

impl Raster<u8> {
    /// Downsample by `div` using area averaging.
    ///
    /// Every output sample averages the source samples its footprint covers,
    /// weighted by overlap. Factors below 1 upscale with nearest-neighbour lookup.
    pub fn downsample(&self, div: f32) -> Raster<u8> {
        let new_w = ((self.width as f32 / div).floor() as u32).max(1);
        let new_h = ((self.height as f32 / div).floor() as u32).max(1);
        let mut out = Raster::filled(new_w, new_h, 0u8);

        if div < 1.0 {
            for z in 0..new_h {
                let sz = ((z as f32 * div).floor() as u32).min(self.height - 1);
                for x in 0..new_w {
                    let sx = ((x as f32 * div).floor() as u32).min(self.width - 1);
                    out.set(x, z, self.get(sx, sz));
                }
            }
            return out;
        }

        for z in 0..new_h {
            let z0 = z as f32 * div;
            let z1 = z0 + div;
            for x in 0..new_w {
                let x0 = x as f32 * div;
                let x1 = x0 + div;
                let mut sum = 0.0f32;
                let mut weight = 0.0f32;
                let mut sz = z0.floor() as u32;
                while (sz as f32) < z1 && sz < self.height {
                    let wz = z1.min(sz as f32 + 1.0) - z0.max(sz as f32);
                    let mut sx = x0.floor() as u32;
                    while (sx as f32) < x1 && sx < self.width {
                        let wx = x1.min(sx as f32 + 1.0) - x0.max(sx as f32);
                        let w = wx * wz;
                        sum += self.get(sx, sz) as f32 * w;
                        weight += w;
                        sx += 1;
                    }
                    sz += 1;
                }
                let v = if weight > 0.0 { sum / weight } else { 0.0 };
                out.set(x, z, v.round().clamp(0.0, 255.0) as u8);
            }
        }
        out
    }
}

impl Raster<u32> {
    /// Extract one 8-bit channel (0 = red ... 3 = alpha) of a packed RGBA raster
    pub fn channel(&self, channel: usize) -> Raster<u8> {
        let data = self.data.iter().map(|&p| unpack_rgba(p)[channel]).collect();
        Raster { width: self.width, height: self.height, data }
    }
}

/// Pack `[r, g, b, a]` into a pixel with red in the lowest byte.
#[inline]
pub fn pack_rgba(rgba: [u8; 4]) -> u32 {
    u32::from_le_bytes(rgba)
}

/// Unpack a pixel into `[r, g, b, a]`.
#[inline]
pub fn unpack_rgba(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(Raster::new(2, 2, vec![0u8; 3]).is_err());
        assert!(Raster::new(0, 2, Vec::<u8>::new()).is_err());
        assert!(Raster::new(2, 2, vec![0u8; 4]).is_ok());
    }

    #[test]
    fn test_filled_never_empty() {
        let r = Raster::filled(0, 0, 7u8);
        assert_eq!(r.dims(), (1, 1));
        assert_eq!(r.get_checked(0, 0), Some(7));
        assert_eq!(Raster::filled(3, 0, 0u16).dims(), (3, 1));
    }

    #[test]
    fn test_clamped_access_replicates_border() {
        let r = Raster::new(2, 2, vec![1u8, 2, 3, 4]).unwrap();
        assert_eq!(r.get_clamped(-5, -5), 1);
        assert_eq!(r.get_clamped(9, 0), 2);
        assert_eq!(r.get_clamped(0, 9), 3);
        assert_eq!(r.get_clamped(9, 9), 4);
        assert_eq!(r.get_checked(2, 0), None);
    }

    #[test]
    fn test_cross() {
        let r = Raster::new(3, 3, (0u8..9).collect()).unwrap();
        assert_eq!(r.cross(1, 1), (4, 3, 5, 1, 7));
        assert_eq!(r.cross(0, 0), (0, 0, 1, 0, 3));
    }

    #[test]
    fn test_downsample_by_two_averages() {
        let r = Raster::new(4, 2, vec![0u8, 100, 200, 200, 100, 200, 200, 200]).unwrap();
        let d = r.downsample(2.0);
        assert_eq!(d.dims(), (2, 1));
        assert_eq!(d.get(0, 0), 100);
        assert_eq!(d.get(1, 0), 200);
    }

    #[test]
    fn test_downsample_below_one_upscales() {
        let r = Raster::new(2, 1, vec![10u8, 20]).unwrap();
        let d = r.downsample(0.5);
        assert_eq!(d.dims(), (4, 2));
        assert_eq!(d.data(), &[10, 10, 20, 20, 10, 10, 20, 20]);
    }

    #[test]
    fn test_pack_unpack() {
        let p = pack_rgba([1, 2, 3, 4]);
        assert_eq!(p, 1 | (2 << 8) | (3 << 16) | (4 << 24));
        assert_eq!(unpack_rgba(p), [1, 2, 3, 4]);
    }

    #[test]
    fn test_channel_extracts_one_byte() {
        let r = Raster::new(2, 1, vec![pack_rgba([38, 1, 2, 3]), pack_rgba([0, 9, 8, 7])]).unwrap();
        assert_eq!(r.channel(0).data(), &[38, 0]);
        assert_eq!(r.channel(3).data(), &[3, 7]);
        assert_eq!(r.channel(0).dims(), (2, 1));
    }
}
