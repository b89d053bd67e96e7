//! Interactive object placement backed by a persisted RGBA raster

pub mod codec;
pub mod editor;

pub use codec::{load_luma16, load_luma8, PngCodec, RasterCodec};
pub use editor::{TerrainEditor, EDIT_BOX_RADIUS};
