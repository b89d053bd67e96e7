//! Raster image I/O

use std::path::Path;

use crate::core::{Error, Result};
use crate::terrain::raster::{pack_rgba, unpack_rgba};
use crate::terrain::Raster;

/// Loads and stores packed RGBA rasters.
pub trait RasterCodec {
    /// Load a raster. A missing or unreadable file is `Ok(None)`.
    fn load(&self, path: &Path) -> Result<Option<Raster<u32>>>;

    /// Persist a raster, replacing any existing file.
    fn save(&self, path: &Path, raster: &Raster<u32>) -> Result<()>;
}

/// Lossless PNG storage through the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngCodec;

impl RasterCodec for PngCodec {
    fn load(&self, path: &Path) -> Result<Option<Raster<u32>>> {
        if !path.exists() {
            return Ok(None);
        }
        let img = match image::open(path) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                log::warn!("Could not decode {}: {}", path.display(), e);
                return Ok(None);
            }
        };
        let (w, h) = img.dimensions();
        let pixels = img
            .as_raw()
            .chunks_exact(4)
            .map(|p| pack_rgba([p[0], p[1], p[2], p[3]]))
            .collect();
        Ok(Some(Raster::new(w, h, pixels)?))
    }

    fn save(&self, path: &Path, raster: &Raster<u32>) -> Result<()> {
        let (w, h) = raster.dims();
        let bytes: Vec<u8> = raster.data().iter().flat_map(|&p| unpack_rgba(p)).collect();
        let len = bytes.len();
        let img = image::RgbaImage::from_raw(w, h, bytes)
            .ok_or(Error::RasterSize { width: w, height: h, len })?;
        img.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Load an 8-bit grayscale raster (masks, feature maps). Colour images are
/// converted to luma.
pub fn load_luma8(path: impl AsRef<Path>) -> Result<Raster<u8>> {
    let img = image::open(path.as_ref())?.to_luma8();
    let (w, h) = img.dimensions();
    Raster::new(w, h, img.into_raw())
}

/// Load a 16-bit grayscale raster (heightmaps). 8-bit sources are widened.
pub fn load_luma16(path: impl AsRef<Path>) -> Result<Raster<u16>> {
    let img = image::open(path.as_ref())?.to_luma16();
    let (w, h) = img.dimensions();
    Raster::new(w, h, img.into_raw())
}
