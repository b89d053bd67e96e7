//! Occupancy grid for movement collision

pub mod field;

pub use field::{CollisionField, LineHit, SOLID_THRESHOLD};
