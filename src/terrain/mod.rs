//! Landscape elements, rasters and the height field

pub mod element;
pub mod raster;
pub mod height_field;
pub mod store;

pub use element::{ElementKind, LandscapeElement};
pub use raster::Raster;
pub use height_field::HeightField;
pub use store::{hit_thresh, ElementIndex, LandscapeStore};
