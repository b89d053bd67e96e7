use criterion::{criterion_group, criterion_main, Criterion, black_box};

use terrascape::collision::CollisionField;
use terrascape::generation::{HeightMapParams, ScatterParams};
use terrascape::math::WorldBounds;
use terrascape::terrain::{LandscapeStore, Raster};
use terrascape::view::ViewTriangulator;

use glam::{Vec2, Vec3};

/// Rolling hills heightmap of `size x size` samples
fn hills(size: u32) -> Raster<u16> {
    let mut data = Vec::with_capacity((size * size) as usize);
    for z in 0..size {
        for x in 0..size {
            let fx = x as f32 * 0.05;
            let fz = z as f32 * 0.07;
            let v = (fx.sin() * fz.cos() * 0.5 + 0.5) * 40000.0 + (fx * 3.1).sin() * 2000.0 + 4000.0;
            data.push(v as u16);
        }
    }
    Raster::new(size, size, data).unwrap()
}

fn landscape(size: u32) -> LandscapeStore {
    let mut store = LandscapeStore::new(WorldBounds::default());
    let params = HeightMapParams { steep_threshold: 200.0, ..Default::default() };
    store
        .set_height_map(None, hills(size), Raster::filled(size, size, 0), &params)
        .unwrap();
    store
        .set_trees(None, &Raster::filled(size, size, 1), &ScatterParams { random_modulo: 32 })
        .unwrap();
    store
}

fn bench_set_height_map_256(c: &mut Criterion) {
    let heights = hills(256);
    let params = HeightMapParams { steep_threshold: 200.0, ..Default::default() };

    c.bench_function("set_height_map_256", |b| {
        b.iter(|| {
            let mut store = LandscapeStore::new(WorldBounds::default());
            store
                .set_height_map(None, black_box(heights.clone()), Raster::filled(256, 256, 0), &params)
                .unwrap()
        });
    });
}

fn bench_view_update(c: &mut Criterion) {
    let store = landscape(256);
    let mut view = ViewTriangulator::new();

    c.bench_function("view_update_256", |b| {
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            let camera = Vec3::new(
                (frame as f32 * 0.1).sin() * 100.0,
                50.0,
                (frame as f32 * 0.1).cos() * 100.0,
            );
            view.update(&store, black_box(camera), 1.0);
            view.triangles().len()
        });
    });
}

fn bench_collide_line(c: &mut Criterion) {
    let store = landscape(256);
    let mut field = CollisionField::new(store.rect(), 1024, 1024);
    for e in store.elements() {
        field.place_circle(e.position.x, e.position.z, 0.5);
    }
    field.box_blur(3);

    c.bench_function("collide_line_20m", |b| {
        b.iter(|| {
            field.collide_line(black_box(Vec2::new(-10.0, 3.0)), black_box(Vec2::new(10.0, -3.0)))
        });
    });
}

criterion_group!(benches, bench_set_height_map_256, bench_view_update, bench_collide_line);
criterion_main!(benches);
