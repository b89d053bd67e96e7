//! Visible element collection and Delaunay triangulation of the ground

use bytemuck::{Pod, Zeroable};
use delaunator::Point;
use glam::Vec3;

use crate::terrain::{ElementIndex, ElementKind, LandscapeStore};

/// Index triple into [`ViewTriangulator::vertices`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Triangle {
    pub indices: [u32; 3],
}

impl Triangle {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { indices: [a, b, c] }
    }
}

/// Turns the elements visible from a camera into a renderable ground mesh.
///
/// Output buffers are reused between updates and fully overwritten each time.
/// Collected indices are tied to the store revision they were taken at;
/// triangulating a store that changed since re-collects from the last view.
#[derive(Default)]
pub struct ViewTriangulator {
    /// Visible elements, farthest first
    elements: Vec<ElementIndex>,
    /// Store revision, camera and detail scale of the last collection
    collected: Option<(u64, Vec3, f32)>,
    /// Sort keys: (distance squared, element index)
    sort_keys: Vec<(f32, ElementIndex)>,
    /// 2D projections fed to the triangulation
    points: Vec<Point>,
    kinds: Vec<ElementKind>,
    vertices: Vec<Vec3>,
    parameters: Vec<Vec3>,
    triangles: Vec<Triangle>,
}

impl ViewTriangulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect elements visible from `camera` and order them farthest first.
    pub fn collect_elements(&mut self, store: &LandscapeStore, camera: Vec3, detail_scale: f32) {
        store.collect(camera, detail_scale, &mut self.elements);

        self.sort_keys.clear();
        self.sort_keys.extend(
            self.elements
                .iter()
                .map(|&i| (store.element(i).position.distance_squared(camera), i)),
        );
        // Stable, so equidistant elements keep insertion order
        self.sort_keys.sort_by(|a, b| b.0.total_cmp(&a.0));

        self.elements.clear();
        self.elements.extend(self.sort_keys.iter().map(|&(_, i)| i));
        self.collected = Some((store.revision(), camera, detail_scale));
    }

    /// Triangulate the ground-like subset of the collected elements.
    ///
    /// Fewer than three ground vertices, or a degenerate (collinear) set,
    /// leaves the triangle list empty.
    pub fn triangulate(&mut self, store: &LandscapeStore) {
        self.points.clear();
        self.kinds.clear();
        self.vertices.clear();
        self.parameters.clear();
        self.triangles.clear();

        match self.collected {
            Some((revision, camera, detail_scale)) if revision != store.revision() => {
                log::debug!("triangulate: store changed since collection, collecting again");
                self.collect_elements(store, camera, detail_scale);
            }
            None => self.elements.clear(),
            _ => {}
        }

        for &i in &self.elements {
            let e = store.element(i);
            if !e.kind.is_ground() {
                continue;
            }
            self.points.push(Point {
                x: e.position.x as f64,
                y: e.position.z as f64,
            });
            self.kinds.push(e.kind);
            self.vertices.push(e.position);
            self.parameters.push(e.normalized_params());
        }

        if self.points.len() < 3 {
            log::trace!("triangulate: {} ground vertices, nothing to do", self.points.len());
            return;
        }

        let result = delaunator::triangulate(&self.points);
        self.triangles.extend(
            result
                .triangles
                .chunks_exact(3)
                .map(|t| Triangle::new(t[0] as u32, t[1] as u32, t[2] as u32)),
        );
        self.triangles.sort_by_key(|t| t.indices[0]);

        log::trace!(
            "triangulate: {} vertices, {} triangles",
            self.vertices.len(),
            self.triangles.len()
        );
    }

    /// Collect and triangulate; the per-frame (or per-edit) entry point.
    pub fn update(&mut self, store: &LandscapeStore, camera: Vec3, detail_scale: f32) {
        self.collect_elements(store, camera, detail_scale);
        self.triangulate(store);
    }

    /// Visible element indices from the last collection, farthest first
    pub fn elements(&self) -> &[ElementIndex] {
        &self.elements
    }

    pub fn kinds(&self) -> &[ElementKind] {
        &self.kinds
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Element parameters normalized to `[0, 1]`, parallel to `vertices`
    pub fn parameters(&self) -> &[Vec3] {
        &self.parameters
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Flat index buffer for upload
    pub fn index_data(&self) -> &[u32] {
        bytemuck::cast_slice(&self.triangles)
    }
}
