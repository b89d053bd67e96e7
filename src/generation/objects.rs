//! Placed objects from the object-placement raster

use glam::Vec3;

use crate::terrain::raster::unpack_rgba;
use crate::terrain::{ElementKind, LandscapeElement, LandscapeStore, Raster};

/// Object id of a portal
pub const PORTAL_OBJECT_ID: u8 = 4;
/// Object id of a dragon
pub const DRAGON_OBJECT_ID: u8 = 5;

/// Share of the world extent at which placed objects appear
const OBJECT_DISTANCE_FACTOR: f32 = 0.05;

/// Large objects stay visible three times further away
fn is_large_object(id: u8) -> bool {
    id == PORTAL_OBJECT_ID || id == DRAGON_OBJECT_ID
}

impl LandscapeStore {
    /// Emit an Object element for every pixel of the RGBA raster whose red
    /// channel encodes a non-zero object id.
    ///
    /// Channels are divided by 4: red gives the object id, green the rotation
    /// and blue a free parameter. Objects sit on the ground at the pixel corner.
    pub fn set_objects(&mut self, rgba: &Raster<u32>) -> usize {
        let rect = self.rect();
        let (w, h) = rgba.dims();
        let base_size = (rect.width() + rect.depth()) * OBJECT_DISTANCE_FACTOR;
        let before = self.len();

        for z in 0..h {
            for x in 0..w {
                let [r, g, b, _] = unpack_rgba(rgba.get(x, z));
                let id = r / 4;
                if id == 0 {
                    continue;
                }
                let px = rect.world_x(x as f32, w);
                let pz = rect.world_z(z as f32, h);
                let py = self.height(px, pz);
                let size = if is_large_object(id) { base_size * 3.0 } else { base_size };
                self.push(LandscapeElement::new(
                    ElementKind::Object,
                    Vec3::new(px, py, pz),
                    [id, g / 4, b / 4],
                    size * size,
                ));
            }
        }

        let count = self.len() - before;
        log::debug!("set_objects: {} objects from {}x{} raster", count, w, h);
        count
    }
}
