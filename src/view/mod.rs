//! Per-frame ground mesh from the visible landscape elements

pub mod triangulator;

pub use triangulator::{Triangle, ViewTriangulator};
