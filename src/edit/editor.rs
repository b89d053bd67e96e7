//! Object placement editing

use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::core::Result;
use crate::terrain::raster::{pack_rgba, unpack_rgba};
use crate::terrain::{ElementKind, LandscapeStore, Raster};
use crate::view::ViewTriangulator;
use super::codec::{PngCodec, RasterCodec};

/// Half size of the pixel box touched by rotate and erase
pub const EDIT_BOX_RADIUS: i64 = 2;

/// Encode an object id into the red channel
#[inline]
fn encode_id(object_id: u8) -> u8 {
    (object_id & 63) * 4 + 2
}

/// Keeps the object-placement raster, its file and the generated Object
/// elements in sync.
///
/// Every edit is saved immediately and followed by a [`refresh`](Self::refresh).
pub struct TerrainEditor<C: RasterCodec = PngCodec> {
    codec: C,
    path: PathBuf,
    objects: Raster<u32>,
    camera: Vec3,
    detail_scale: f32,
}

impl<C: RasterCodec> TerrainEditor<C> {
    /// Load the object raster at `path`, or start from a blank raster of the
    /// given size when the file is missing or unreadable.
    pub fn bind_object_raster(
        codec: C,
        path: impl Into<PathBuf>,
        default_width: u32,
        default_height: u32,
    ) -> Result<Self> {
        let path = path.into();
        let objects = match codec.load(&path)? {
            Some(raster) => {
                log::info!("Loaded object raster {} ({}x{})", path.display(), raster.width(), raster.height());
                raster
            }
            None => {
                log::info!(
                    "No object raster at {}, starting blank {}x{}",
                    path.display(),
                    default_width,
                    default_height
                );
                Raster::filled(default_width.max(1), default_height.max(1), 0)
            }
        };
        Ok(Self {
            codec,
            path,
            objects,
            camera: Vec3::ZERO,
            detail_scale: 1.0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn objects(&self) -> &Raster<u32> {
        &self.objects
    }

    /// Camera and detail scale used by the next refresh
    pub fn set_view(&mut self, camera: Vec3, detail_scale: f32) {
        self.camera = camera;
        self.detail_scale = detail_scale;
    }

    /// Regenerate the Object elements from the raster and re-triangulate.
    pub fn refresh(&self, store: &mut LandscapeStore, view: &mut ViewTriangulator) {
        let removed = store.remove_elements_of_kind(ElementKind::Object);
        let added = store.set_objects(&self.objects);
        view.update(store, self.camera, self.detail_scale);
        log::debug!("refresh: {} objects removed, {} placed", removed, added);
    }

    /// Place object `object_id` at the pixel under `pos`. Positions outside
    /// the raster are ignored.
    pub fn place(
        &mut self,
        store: &mut LandscapeStore,
        view: &mut ViewTriangulator,
        pos: Vec3,
        object_id: u8,
    ) -> Result<()> {
        let (w, h) = self.objects.dims();
        let Some((x, z)) = store.rect().cell_checked(pos.x, pos.z, w, h) else {
            return Ok(());
        };
        self.objects.set(x, z, pack_rgba([encode_id(object_id), 0, 0, 0]));
        self.commit(store, view)
    }

    /// Set the facing of every object within the edit box around `pos`.
    ///
    /// Nothing is saved when the box holds no objects.
    pub fn rotate(
        &mut self,
        store: &mut LandscapeStore,
        view: &mut ViewTriangulator,
        pos: Vec3,
        facing: u8,
    ) -> Result<()> {
        let g = (facing & 63) * 4 + 2;
        let mut touched = false;
        for (x, z) in self.edit_box(store, pos) {
            let [r, _, b, a] = unpack_rgba(self.objects.get(x, z));
            if r != 0 {
                self.objects.set(x, z, pack_rgba([r, g, b, a]));
                touched = true;
            }
        }
        if !touched {
            return Ok(());
        }
        self.commit(store, view)
    }

    /// Clear every pixel within the edit box around `pos`.
    pub fn erase(
        &mut self,
        store: &mut LandscapeStore,
        view: &mut ViewTriangulator,
        pos: Vec3,
    ) -> Result<()> {
        for (x, z) in self.edit_box(store, pos) {
            self.objects.set(x, z, 0);
        }
        self.commit(store, view)
    }

    /// In-bounds pixels of the box centred on the pixel under `pos`
    fn edit_box(&self, store: &LandscapeStore, pos: Vec3) -> Vec<(u32, u32)> {
        let (w, h) = self.objects.dims();
        let (cx, cz) = store.rect().cell(pos.x, pos.z, w, h);
        let mut cells = Vec::with_capacity(((2 * EDIT_BOX_RADIUS + 1) * (2 * EDIT_BOX_RADIUS + 1)) as usize);
        for z in cz - EDIT_BOX_RADIUS..=cz + EDIT_BOX_RADIUS {
            for x in cx - EDIT_BOX_RADIUS..=cx + EDIT_BOX_RADIUS {
                if x >= 0 && z >= 0 && x < w as i64 && z < h as i64 {
                    cells.push((x as u32, z as u32));
                }
            }
        }
        cells
    }

    fn commit(&self, store: &mut LandscapeStore, view: &mut ViewTriangulator) -> Result<()> {
        self.codec.save(&self.path, &self.objects)?;
        self.refresh(store, view);
        Ok(())
    }
}
