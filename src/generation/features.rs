//! Thresholded raster features: stones, water and roads.
//!
//! Each feature raster is edge-detected against one or more thresholds. A cell
//! at or above a threshold with at least one axis neighbour below it emits a
//! vertex at the interpolated crossing point. The wider cleanup threshold emits
//! plain height vertices so triangles do not bridge across the feature border.

use glam::Vec3;

use crate::core::{Error, Result};
use crate::terrain::{hit_thresh, ElementKind, LandscapeElement, LandscapeStore, Raster};
use super::config::{FeatureThresholds, RoadThresholds};
use super::rng::PassRng;
use super::ripple;

const STONE_DISTANCE: f32 = 250.0;
const WATER_DISTANCE: f32 = 400.0;
const ROAD_DISTANCE: f32 = 500.0;
const ROAD_GRASS_DISTANCE: f32 = 200.0;
const ROAD_DEPTH: f32 = 0.25;

/// A raster cell and its four axis neighbours, clamped to the border
#[derive(Clone, Copy, Debug)]
struct Cross {
    center: f32,
    left: f32,
    right: f32,
    up: f32,
    down: f32,
}

impl Cross {
    fn at(map: &Raster<u8>, x: u32, z: u32) -> Self {
        let (c, l, r, u, d) = map.cross(x, z);
        Self {
            center: c as f32,
            left: l as f32,
            right: r as f32,
            up: u as f32,
            down: d as f32,
        }
    }

    /// Inside the threshold with at least one neighbour outside it
    fn is_edge(&self, thresh: u8) -> bool {
        let t = thresh as f32;
        self.center >= t && (self.left < t || self.right < t || self.up < t || self.down < t)
    }

    /// Sub-cell offset of the threshold crossing along X and Z
    fn crossing(&self, thresh: u8) -> (f32, f32) {
        let t = thresh as f32;
        (
            hit_thresh(self.center, self.left, self.right, t),
            hit_thresh(self.center, self.up, self.down, t),
        )
    }

    /// Central-difference gradient magnitude, in units of full raster range
    fn gradient(&self) -> f32 {
        let gx = (self.right - self.left) / 255.0;
        let gz = (self.down - self.up) / 255.0;
        (gx * gx + gz * gz).sqrt()
    }
}

/// Sharpen a gradient so only steep borders get large visibility distances
#[inline]
fn sharpen(grad: f32) -> f32 {
    grad * grad * 9.0
}

impl LandscapeStore {
    fn field_dims(&self) -> Result<(u32, u32)> {
        self.height_field()
            .map(|f| f.samples().dims())
            .ok_or(Error::MissingHeightField)
    }

    /// World position on the ground at a fractional raster coordinate
    fn ground_point(&self, gx: f32, gz: f32, w: u32, h: u32) -> Vec3 {
        let rect = self.rect();
        let x = rect.world_x(gx, w);
        let z = rect.world_z(gz, h);
        Vec3::new(x, self.height(x, z), z)
    }

    /// Raise stone structures out of the height field and outline them.
    ///
    /// The relief pass walks the height field and lifts every cell whose
    /// corresponding raster value reaches `outer`, drawing one random value per
    /// cell. The edge pass restarts the sequence and draws one value per raster
    /// cell; outer edges emit Stone vertices carrying that value in `p0`.
    pub fn set_stones(&mut self, map: &Raster<u8>, thresholds: &FeatureThresholds) -> Result<usize> {
        let (fw, fh) = self.field_dims()?;
        let rect = self.rect();
        let (w, h) = map.dims();
        let before = self.len();

        let mut rng = PassRng::new();
        for z in 0..fh {
            for x in 0..fw {
                let r2 = rng.next_byte();
                let rx = (x as u64 * w as u64 / fw as u64) as u32;
                let rz = (z as u64 * h as u64 / fh as u64) as u32;
                if map.get(rx, rz) < thresholds.outer {
                    continue;
                }
                // the height field cell is mapped with the raster stride
                let ex = rect.world_x(x as f32, w);
                let ez = rect.world_z(z as f32, h);
                let px = ex * 0.1;
                let pz = ez * 0.1;
                let lift = ((px + pz + px.sin() + pz.cos()).sin() * 0.5 + 0.5 + 0.2)
                    * 3.0
                    * (1.0 + r2 as f32 / 255.0 * 0.25);
                let y = self.height(ex, ez) + lift;
                self.put_height(ex, ez, y);
            }
        }

        let mut rng = PassRng::new();
        for z in 0..h {
            for x in 0..w {
                let r1 = rng.next_byte();
                let cross = Cross::at(map, x, z);
                let size = STONE_DISTANCE * (sharpen(cross.gradient()) * 2.0 + 0.01);
                let distance_sq = size * size;

                if cross.is_edge(thresholds.outer) {
                    let (xd, zd) = cross.crossing(thresholds.outer);
                    let position = self.ground_point(x as f32 + xd, z as f32 + zd, w, h);
                    self.push(LandscapeElement::new(
                        ElementKind::Stone,
                        position,
                        [r1 as u8, 0, 0],
                        distance_sq,
                    ));
                }
                if cross.is_edge(thresholds.cleanup) {
                    let (xd, zd) = cross.crossing(thresholds.cleanup);
                    self.insert_empty(x as f32 + xd, z as f32 + zd, w, h, distance_sq);
                }
            }
        }

        let count = self.len() - before;
        log::debug!("set_stones: {} vertices from {}x{} raster", count, w, h);
        Ok(count)
    }

    /// Outline water bodies.
    ///
    /// Water leaves the height field untouched; the surface is expected to be
    /// masked out of the height map beforehand. Only edges are emitted, so large
    /// lakes stay cheap to triangulate.
    pub fn set_water(&mut self, map: &Raster<u8>, thresholds: &FeatureThresholds) -> Result<usize> {
        self.field_dims()?;
        let (w, h) = map.dims();
        let before = self.len();

        for z in 0..h {
            for x in 0..w {
                let cross = Cross::at(map, x, z);
                let grad = sharpen(sharpen(sharpen(cross.gradient())));
                let size = WATER_DISTANCE * (grad * 3.0 + 0.01);
                let distance_sq = size * size;

                if cross.is_edge(thresholds.outer) {
                    let (xd, zd) = cross.crossing(thresholds.outer);
                    let position = self.ground_point(x as f32 + xd, z as f32 + zd, w, h);
                    self.push(LandscapeElement::new(ElementKind::Water, position, [0; 3], distance_sq));
                }
                if cross.is_edge(thresholds.cleanup) {
                    let (xd, zd) = cross.crossing(thresholds.cleanup);
                    self.insert_empty(x as f32 + xd, z as f32 + zd, w, h, distance_sq);
                }
            }
        }

        let count = self.len() - before;
        log::debug!("set_water: {} vertices from {}x{} raster", count, w, h);
        Ok(count)
    }

    /// Sink roads into the height field and outline both road margins.
    ///
    /// Outer edges get plain Road vertices (`p0 = 0`), inner edges carry a
    /// smooth brightness in `p0`. Some edge vertices get a small grass tuft
    /// next to them: one in eight on the outer margin, one in sixteen on the
    /// inner one.
    pub fn set_roads(&mut self, map: &Raster<u8>, thresholds: &RoadThresholds) -> Result<usize> {
        let (fw, fh) = self.field_dims()?;
        let rect = self.rect();
        let (w, h) = map.dims();
        let before = self.len();

        for z in 0..fh {
            for x in 0..fw {
                let px = rect.world_x(x as f32, w);
                let pz = rect.world_z(z as f32, h);
                let rx = (x as u64 * w as u64 / fw as u64) as u32;
                let rz = (z as u64 * h as u64 / fh as u64) as u32;
                if map.get(rx, rz) < thresholds.outer {
                    continue;
                }
                let f = ripple(px, pz) * 0.5 + 0.5;
                let y = self.height(px, pz) - f * ROAD_DEPTH;
                self.put_height(px, pz, y);
            }
        }

        let mut rng = PassRng::new();
        for z in 0..h {
            for x in 0..w {
                let cross = Cross::at(map, x, z);
                let size = ROAD_DISTANCE * (sharpen(cross.gradient()) * 3.0 + 0.01);
                let distance_sq = size * size;

                if cross.is_edge(thresholds.outer) {
                    let (xd, zd) = cross.crossing(thresholds.outer);
                    let position = self.ground_point(x as f32 + xd, z as f32 + zd, w, h);
                    self.push(LandscapeElement::new(ElementKind::Road, position, [0; 3], distance_sq));
                    if rng.next_u31() & 7 == 0 {
                        self.push_road_grass(&mut rng, position, 200);
                    }
                }
                if cross.is_edge(thresholds.inner) {
                    let (xd, zd) = cross.crossing(thresholds.inner);
                    let position = self.ground_point(x as f32 + xd, z as f32 + zd, w, h);
                    let brightness = (ripple(position.x, position.z) * 0.5 + 0.5) * 255.0;
                    self.push(LandscapeElement::new(
                        ElementKind::Road,
                        position,
                        [brightness as u8, 0, 0],
                        distance_sq,
                    ));
                    if rng.next_u31() & 15 == 0 {
                        self.push_road_grass(&mut rng, position, 100);
                    }
                }
                if cross.is_edge(thresholds.cleanup) {
                    let (xd, zd) = cross.crossing(thresholds.cleanup);
                    self.insert_empty(x as f32 + xd, z as f32 + zd, w, h, distance_sq);
                }
            }
        }

        let count = self.len() - before;
        log::debug!("set_roads: {} vertices from {}x{} raster", count, w, h);
        Ok(count)
    }

    fn push_road_grass(&mut self, rng: &mut PassRng, position: Vec3, tuft_size: u8) {
        let lightness = (rng.next_u31() % 4 + 16) as u8;
        let size = ROAD_GRASS_DISTANCE * (rng.next_byte() as f32 / 255.0 * 0.75 + 0.25);
        self.push(LandscapeElement::new(
            ElementKind::Grass,
            position,
            [lightness, tuft_size, 0],
            size * size,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::WorldBounds;
    use crate::terrain::HeightField;

    fn bounds() -> WorldBounds {
        WorldBounds::new(0.0, 0.0, 16.0, 16.0, -50.0, 50.0)
    }

    /// 16x16 store with a level field at y = 0
    fn level_store() -> LandscapeStore {
        let mut store = LandscapeStore::new(bounds());
        let field = HeightField::new(bounds(), Raster::filled(16, 16, 32768), Raster::filled(16, 16, 3))
            .unwrap();
        store.set_height_field(field);
        store
    }

    /// 255 inside the 8x8 block `4..12`, 0 elsewhere
    fn block() -> Raster<u8> {
        let mut map = Raster::filled(16, 16, 0u8);
        for z in 4..12 {
            for x in 4..12 {
                map.set(x, z, 255);
            }
        }
        map
    }

    /// Cone peaking at 255 in the middle of a 32x32 raster, so every
    /// threshold traces its own ring
    fn cone() -> Raster<u8> {
        let mut map = Raster::filled(32, 32, 0u8);
        for z in 0..32 {
            for x in 0..32 {
                let dx = x as f32 - 16.0;
                let dz = z as f32 - 16.0;
                let v = 255.0 - (dx * dx + dz * dz).sqrt() * 16.0;
                map.set(x, z, v.max(0.0) as u8);
            }
        }
        map
    }

    #[test]
    fn test_cross_edge_detection() {
        let map = block();
        assert!(Cross::at(&map, 4, 4).is_edge(128));
        assert!(Cross::at(&map, 11, 7).is_edge(128));
        assert!(!Cross::at(&map, 7, 7).is_edge(128));
        assert!(!Cross::at(&map, 2, 2).is_edge(128));

        let (xd, zd) = Cross::at(&map, 4, 7).crossing(128);
        assert!((xd - (128.0 / 255.0 - 1.0)).abs() < 1e-6);
        assert_eq!(zd, 0.0);
        assert_eq!(Cross::at(&map, 4, 7).gradient(), 1.0);
    }

    #[test]
    fn test_feature_needs_height_field() {
        let mut store = LandscapeStore::new(bounds());
        let map = block();
        assert!(matches!(
            store.set_stones(&map, &FeatureThresholds::default()),
            Err(Error::MissingHeightField)
        ));
        assert!(matches!(
            store.set_water(&map, &FeatureThresholds::default()),
            Err(Error::MissingHeightField)
        ));
        assert!(matches!(
            store.set_roads(&map, &RoadThresholds::default()),
            Err(Error::MissingHeightField)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_stones_outline_and_relief() {
        let mut store = level_store();
        let n = store.set_stones(&block(), &FeatureThresholds::default()).unwrap();

        // the block border ring has 28 cells, each an edge at both thresholds
        assert_eq!(store.count_of(ElementKind::Stone), 28);
        assert_eq!(store.count_of(ElementKind::Height), 28);
        assert_eq!(n, 56);

        assert!(store.height(8.0, 8.0) >= 0.6 - 0.01);
        assert!(store.height(1.0, 1.0).abs() < 0.01);

        // crossings sit inside the block's outer cells
        for e in store.elements() {
            assert!(e.position.x > 3.0 && e.position.x < 12.0);
            assert!(e.position.z > 3.0 && e.position.z < 12.0);
        }
    }

    #[test]
    fn test_stones_are_deterministic() {
        let mut a = level_store();
        let mut b = level_store();
        a.set_stones(&block(), &FeatureThresholds::default()).unwrap();
        b.set_stones(&block(), &FeatureThresholds::default()).unwrap();
        assert_eq!(a.elements(), b.elements());
        assert_eq!(a.height_field(), b.height_field());
    }

    #[test]
    fn test_water_keeps_height_field() {
        let mut store = level_store();
        let before = store.height_field().cloned();
        let n = store.set_water(&block(), &FeatureThresholds::default()).unwrap();
        assert_eq!(n, 56);
        assert_eq!(store.count_of(ElementKind::Water), 28);
        assert_eq!(store.height_field().cloned(), before);
        assert!(store
            .elements()
            .iter()
            .filter(|e| e.kind == ElementKind::Water)
            .all(|e| e.params == [0, 0, 0]));
    }

    #[test]
    fn test_roads_sink_into_height_field() {
        let mut store = level_store();
        store.set_roads(&block(), &RoadThresholds::default()).unwrap();

        // outer and inner margins coincide on a hard-edged raster
        assert_eq!(store.count_of(ElementKind::Road), 56);
        assert_eq!(store.count_of(ElementKind::Height), 28);
        assert!(store.height(8.0, 8.0) <= -0.125 + 0.01);
        assert!(store.height(1.0, 1.0).abs() < 0.01);
    }

    #[test]
    fn test_roads_scatter_grass_along_edges() {
        let mut store = level_store();
        store.set_roads(&cone(), &RoadThresholds::default()).unwrap();

        let tufts: Vec<_> = store
            .elements()
            .iter()
            .filter(|e| e.kind == ElementKind::Grass)
            .collect();
        assert!(!tufts.is_empty());
        assert!(store.count_of(ElementKind::Grass) > 0);
        for e in tufts {
            assert!((16..20).contains(&e.params[0]));
            assert!(e.params[1] == 200 || e.params[1] == 100);
            assert_eq!(e.params[2], 0);
        }
        // inner edges carry a brightness of at least half scale
        assert!(store
            .elements()
            .iter()
            .filter(|e| e.kind == ElementKind::Road && e.params[0] != 0)
            .all(|e| e.params[0] >= 127));
    }

    #[test]
    fn test_water_and_roads_are_deterministic() {
        let mut a = level_store();
        let mut b = level_store();
        let wa = a.set_water(&cone(), &FeatureThresholds::default()).unwrap();
        let wb = b.set_water(&cone(), &FeatureThresholds::default()).unwrap();
        assert!(wa > 0);
        assert_eq!(wa, wb);

        // distinct outer and inner rings share one random sequence
        let thresholds = RoadThresholds { outer: 90, inner: 150, cleanup: 40 };
        let ra = a.set_roads(&cone(), &thresholds).unwrap();
        let rb = b.set_roads(&cone(), &thresholds).unwrap();
        assert!(ra > 0);
        assert_eq!(ra, rb);
        assert_eq!(a.elements(), b.elements());
        assert_eq!(a.height_field(), b.height_field());
    }

    #[test]
    fn test_cleanup_vertices_carry_ground_type() {
        let mut store = level_store();
        store.set_water(&block(), &FeatureThresholds::default()).unwrap();
        assert!(store
            .elements()
            .iter()
            .filter(|e| e.kind == ElementKind::Height)
            .all(|e| e.params[1] == 3));
    }

    #[test]
    fn test_coarse_height_field() {
        let mut store = LandscapeStore::new(bounds());
        store.set_height_field(HeightField::flat(bounds(), 8, 8));
        store.set_stones(&block(), &FeatureThresholds::default()).unwrap();
        assert_eq!(store.count_of(ElementKind::Stone), 28);
    }
}
