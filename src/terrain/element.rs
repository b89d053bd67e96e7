//! Landscape element records

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What a landscape element represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ElementKind {
    /// Heightmap vertex; also carries the ground type of its cell
    Height = 0,
    /// Road vertex
    Road = 1,
    /// A single tree
    Tree = 2,
    /// A single grass tuft sprite
    Grass = 3,
    /// A single flower sprite
    Flower = 4,
    /// Raised stone structure vertex
    Stone = 5,
    /// Water vertex
    Water = 6,
    /// A placed 3D object, positioned at its center
    Object = 7,
}

impl ElementKind {
    /// Ground-like kinds are the ones fed to the ground triangulation.
    pub fn is_ground(self) -> bool {
        matches!(
            self,
            ElementKind::Height | ElementKind::Road | ElementKind::Stone | ElementKind::Water
        )
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Height),
            1 => Some(Self::Road),
            2 => Some(Self::Tree),
            3 => Some(Self::Grass),
            4 => Some(Self::Flower),
            5 => Some(Self::Stone),
            6 => Some(Self::Water),
            7 => Some(Self::Object),
            _ => None,
        }
    }
}

/// A single typed point sample of the landscape.
///
/// The meaning of `params` depends on `kind` (brightness, size, rotation, ground type...).
/// The element becomes visible once the squared camera distance drops below
/// `distance_sq` (scaled by the caller's detail factor).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandscapeElement {
    pub kind: ElementKind,
    pub params: [u8; 3],
    pub distance_sq: f32,
    pub position: Vec3,
}

impl LandscapeElement {
    pub fn new(kind: ElementKind, position: Vec3, params: [u8; 3], distance_sq: f32) -> Self {
        Self { kind, params, distance_sq, position }
    }

    /// Whether this element is visible from `camera` at the given detail scale
    #[inline]
    pub fn is_visible_from(&self, camera: Vec3, detail_scale: f32) -> bool {
        self.position.distance_squared(camera) < self.distance_sq * detail_scale
    }

    /// Parameters normalized to `[0, 1]`
    pub fn normalized_params(&self) -> Vec3 {
        Vec3::new(
            self.params[0] as f32 / 255.0,
            self.params[1] as f32 / 255.0,
            self.params[2] as f32 / 255.0,
        )
    }
}
