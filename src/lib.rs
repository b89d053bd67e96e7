//! Terrascape - procedural landscape elements, view triangulation and
//! collision fields for an interactive 3D world

pub mod core;
pub mod math;
pub mod terrain;
pub mod generation;
pub mod view;
pub mod collision;
pub mod edit;
