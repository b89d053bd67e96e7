//! The landscape element collection and the height field it was derived from

use glam::Vec3;

use crate::math::{WorldBounds, WorldRect};
use super::element::{ElementKind, LandscapeElement};
use super::height_field::HeightField;

/// Index of an element inside a [`LandscapeStore`].
///
/// Indices are only meaningful for the [`LandscapeStore::revision`] they were
/// taken at; any mutation may shift or invalidate them.
pub type ElementIndex = u32;

/// Owns every landscape element plus the height field.
///
/// Elements keep insertion order. Procedural generators (see `crate::generation`)
/// append to the collection and may adjust the height field.
#[derive(Clone, Debug)]
pub struct LandscapeStore {
    bounds: WorldBounds,
    elements: Vec<LandscapeElement>,
    height_field: Option<HeightField>,
    revision: u64,
}

impl LandscapeStore {
    /// Create an empty store covering `bounds`.
    ///
    /// Height queries return `bounds.min_y` until a height field is set.
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            elements: Vec::new(),
            height_field: None,
            revision: 0,
        }
    }

    pub fn bounds(&self) -> &WorldBounds {
        &self.bounds
    }

    pub fn rect(&self) -> WorldRect {
        self.bounds.rect()
    }

    pub fn elements(&self) -> &[LandscapeElement] {
        &self.elements
    }

    /// Element at `index`. Panics when out of range; see [`get`](Self::get).
    pub fn element(&self, index: ElementIndex) -> &LandscapeElement {
        &self.elements[index as usize]
    }

    pub fn get(&self, index: ElementIndex) -> Option<&LandscapeElement> {
        self.elements.get(index as usize)
    }

    /// Bumped by every mutation of the elements or the height field
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append a single element (interactive placement, tests)
    pub fn push(&mut self, element: LandscapeElement) {
        self.touch();
        self.elements.push(element);
    }

    pub fn height_field(&self) -> Option<&HeightField> {
        self.height_field.as_ref()
    }

    pub fn height_field_mut(&mut self) -> Option<&mut HeightField> {
        self.touch();
        self.height_field.as_mut()
    }

    /// Install a height field without emitting any elements
    pub fn set_height_field(&mut self, field: HeightField) {
        self.touch();
        self.height_field = Some(field);
    }

    /// Count of elements of a given kind
    pub fn count_of(&self, kind: ElementKind) -> usize {
        self.elements.iter().filter(|e| e.kind == kind).count()
    }

    /// Collect the indices of every element visible from `camera`.
    ///
    /// An element is visible when its squared distance to the camera is below
    /// `distance_sq * detail_scale`. `out` is cleared first and keeps its
    /// capacity, so a buffer reused every frame does not reallocate.
    pub fn collect(&self, camera: Vec3, detail_scale: f32, out: &mut Vec<ElementIndex>) {
        out.clear();
        for (i, e) in self.elements.iter().enumerate() {
            if e.is_visible_from(camera, detail_scale) {
                out.push(i as ElementIndex);
            }
        }
    }

    /// Delete every element of `kind`, keeping the order of the rest.
    /// Returns the number of removed elements.
    pub fn remove_elements_of_kind(&mut self, kind: ElementKind) -> usize {
        self.touch();
        let before = self.elements.len();
        self.elements.retain(|e| e.kind != kind);
        before - self.elements.len()
    }

    /// Interpolated world height at `(x, z)`, clamped to the field bounds
    pub fn height(&self, x: f32, z: f32) -> f32 {
        self.height_offset(x, z, 0, 0)
    }

    /// Interpolated world height with an integer cell offset applied to the lookup
    pub fn height_offset(&self, x: f32, z: f32, extra_col: i32, extra_row: i32) -> f32 {
        match &self.height_field {
            Some(field) => field.height(x, z, extra_col, extra_row),
            None => self.bounds.min_y,
        }
    }

    /// Box-filtered world height over a `(2 * radius + 1)^2` cell window
    pub fn height_box(&self, x: f32, z: f32, radius: i32) -> f32 {
        match &self.height_field {
            Some(field) => field.height_box(x, z, radius),
            None => self.bounds.min_y,
        }
    }

    /// Write a single height sample; out-of-bounds positions are ignored
    pub fn put_height(&mut self, x: f32, z: f32, height: f32) {
        self.touch();
        if let Some(field) = self.height_field.as_mut() {
            field.put_height(x, z, height);
        }
    }

    pub(crate) fn elements_mut(&mut self) -> &mut Vec<LandscapeElement> {
        self.touch();
        &mut self.elements
    }

    pub(crate) fn replace_height_field(&mut self, field: HeightField) {
        self.touch();
        self.height_field = Some(field);
    }

    /// Insert a bare height vertex at raster position `(x2, z2)` of a `w x h` raster.
    ///
    /// Used to force extra triangulation vertices around feature boundaries.
    /// The slope and ground parameters are read from the height field cell at
    /// the same integer coordinates, clamped to the field.
    pub fn insert_empty(&mut self, x2: f32, z2: f32, w: u32, h: u32, distance_sq: f32) {
        let rect = self.rect();
        let x = rect.world_x(x2, w);
        let z = rect.world_z(z2, h);
        let y = self.height(x, z);
        let cx = (x2.floor() as i64).clamp(0, w as i64 - 1);
        let cz = (z2.floor() as i64).clamp(0, h as i64 - 1);
        let (slope, ground) = match &self.height_field {
            Some(field) => (field.packed_slope_x(cx, cz), field.ground_clamped(cx, cz)),
            None => (128, 0),
        };
        self.push(LandscapeElement::new(
            ElementKind::Height,
            Vec3::new(x, y, z),
            [slope, ground, 0],
            distance_sq,
        ));
    }
}

/// Sub-cell position where a threshold is crossed.
///
/// `center` is on the inside (`>= thresh`) of the threshold; `left` and `right`
/// are its neighbours along one axis. Returns the crossing offset in `[-1, 1]`
/// relative to the center sample, or `0` when neither neighbour is below the
/// threshold or the two relevant samples are equal.
///
/// `hit_thresh(256.0, 128.0, 512.0, 192.0) == -0.5`
pub fn hit_thresh(center: f32, left: f32, right: f32, thresh: f32) -> f32 {
    if left < thresh {
        let dist0 = left - thresh;
        let dist1 = center - thresh;
        let k = dist1 - dist0;
        if k == 0.0 {
            return 0.0;
        }
        return -dist0 / k - 1.0;
    }
    if right < thresh {
        let dist0 = center - thresh;
        let dist1 = right - thresh;
        let k = dist1 - dist0;
        if k == 0.0 {
            return 0.0;
        }
        return -dist0 / k;
    }
    0.0
}
