//! Landscape generator binary: builds a landscape from raster layers and
//! reports what a camera would see.
//!
//! Usage: cargo run --release --bin generate_landscape -- --heights <PNG> [OPTIONS]
//!
//! Options:
//!   --heights <PNG>    16-bit (or 8-bit) grayscale heightmap (required)
//!   --ground <PNG>     Ground type raster (default: all 0)
//!   --mask <PNG>       Height vertex mask, non-zero skips interior vertices
//!   --trees <PNG>      Tree density raster
//!   --grass <PNG>      Grass raster
//!   --flowers <PNG>    Flower raster
//!   --stones <PNG>     Stone feature raster
//!   --water <PNG>      Water feature raster
//!   --roads <PNG>      Road feature raster
//!   --objects <PNG>    Object-placement raster (RGBA)
//!   --blocking <PNG>   Collision mask merged into the collision field
//!   --config <JSON>    Generation config (default: built-in defaults)
//!   --camera-x <X>     Camera X (default: 0)
//!   --camera-z <Z>     Camera Z (default: 0)
//!   --detail <S>       Detail scale (default: 1.0)
//!   --summary <JSON>   Write a JSON summary of the run

use std::path::Path;
use std::time::Instant;

use glam::{Vec2, Vec3};
use serde_json::json;

use terrascape::collision::CollisionField;
use terrascape::core::Result;
use terrascape::edit::{load_luma16, load_luma8, PngCodec, RasterCodec};
use terrascape::generation::GenerationConfig;
use terrascape::terrain::{ElementKind, LandscapeStore, Raster};
use terrascape::view::ViewTriangulator;

/// Collision footprint of a tree trunk in world units
const TREE_COLLISION_RADIUS: f32 = 0.5;

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let Some(heights_path) = parse_str_arg(args, "--heights") else {
        eprintln!("usage: generate_landscape --heights <PNG> [OPTIONS]");
        std::process::exit(2);
    };
    let config = match parse_str_arg(args, "--config") {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::default(),
    };
    let camera = Vec3::new(
        parse_f32_arg(args, "--camera-x").unwrap_or(0.0),
        0.0,
        parse_f32_arg(args, "--camera-z").unwrap_or(0.0),
    );
    let detail = parse_f32_arg(args, "--detail").unwrap_or(1.0);

    println!("=== Terrascape Landscape Generator ===");
    println!("Heights: {}", heights_path);
    println!(
        "Bounds:  x {}..{}, z {}..{}, y {}..{}",
        config.bounds.min_x,
        config.bounds.max_x,
        config.bounds.min_z,
        config.bounds.max_z,
        config.bounds.min_y,
        config.bounds.max_y
    );
    println!();

    let start = Instant::now();
    let mut store = LandscapeStore::new(config.bounds);

    let heights = load_luma16(&heights_path)?;
    let (w, h) = heights.dims();
    let ground = match parse_str_arg(args, "--ground") {
        Some(path) => load_luma8(path)?,
        None => Raster::filled(w, h, 0),
    };
    let mask = optional_luma8(args, "--mask")?;
    store.set_height_map(mask.as_ref(), heights, ground, &config.height_map)?;

    if let Some(map) = optional_luma8(args, "--stones")? {
        store.set_stones(&map, &config.stones)?;
    }
    if let Some(map) = optional_luma8(args, "--water")? {
        store.set_water(&map, &config.water)?;
    }
    if let Some(map) = optional_luma8(args, "--roads")? {
        store.set_roads(&map, &config.roads)?;
    }
    if let Some(map) = optional_luma8(args, "--trees")? {
        store.set_trees(None, &map, &config.trees)?;
    }
    if let Some(map) = optional_luma8(args, "--grass")? {
        store.set_grass(None, &map, &config.grass)?;
    }
    if let Some(map) = optional_luma8(args, "--flowers")? {
        store.set_flowers(None, &map, &config.flowers)?;
    }
    let mut object_ids = Vec::new();
    if let Some(path) = parse_str_arg(args, "--objects") {
        match PngCodec.load(Path::new(&path))? {
            Some(objects) => {
                object_ids = distinct_object_ids(&objects);
                store.set_objects(&objects);
            }
            None => log::warn!("Object raster {} not found, skipping", path),
        }
    }
    let generation_time = start.elapsed();

    // Ground height under the camera
    let camera = Vec3::new(camera.x, store.height(camera.x, camera.z) + 2.0, camera.z);
    let tri_start = Instant::now();
    let mut view = ViewTriangulator::new();
    view.update(&store, camera, detail);
    let triangulation_time = tri_start.elapsed();

    let collision = build_collision(args, &store, &config)?;
    let solid = collision.data().data().iter().filter(|&&v| v >= 128).count();
    let sight_to = Vec2::new(camera.x + 50.0, camera.z);
    let sight = collision.collide_line(Vec2::new(camera.x, camera.z), sight_to);

    let kinds = [
        ElementKind::Height,
        ElementKind::Road,
        ElementKind::Tree,
        ElementKind::Grass,
        ElementKind::Flower,
        ElementKind::Stone,
        ElementKind::Water,
        ElementKind::Object,
    ];
    println!("Elements: {} total", store.len());
    for kind in kinds {
        println!("  {:<8} {}", format!("{:?}", kind), store.count_of(kind));
    }
    if !object_ids.is_empty() {
        println!("  object ids: {:?}", object_ids);
    }
    println!();
    println!("Camera ({:.1}, {:.1}, {:.1}), detail {}", camera.x, camera.y, camera.z, detail);
    println!("  visible:   {}", view.elements().len());
    println!("  vertices:  {}", view.vertices().len());
    println!("  triangles: {}", view.triangles().len());
    println!();
    println!(
        "Collision: {}x{}, {} solid cells ({:.1}%)",
        collision.width(),
        collision.height(),
        solid,
        solid as f64 * 100.0 / (collision.width() as f64 * collision.height() as f64)
    );
    match sight {
        Some(hit) => println!(
            "  sight line +X hit at ({:.2}, {:.2}), normal ({:.2}, {:.2})",
            hit.position.x, hit.position.y, hit.normal.x, hit.normal.y
        ),
        None => println!("  sight line +X clear"),
    }
    println!();
    println!(
        "Timing: generation {:.1} ms, triangulation {:.1} ms",
        generation_time.as_secs_f64() * 1000.0,
        triangulation_time.as_secs_f64() * 1000.0
    );

    if let Some(path) = parse_str_arg(args, "--summary") {
        let summary = json!({
            "heights": heights_path,
            "elements": kinds.iter().map(|&k| {
                json!({"kind": format!("{:?}", k), "count": store.count_of(k)})
            }).collect::<Vec<_>>(),
            "camera": [camera.x, camera.y, camera.z],
            "detail": detail,
            "visible": view.elements().len(),
            "vertices": view.vertices().len(),
            "triangles": view.triangles().len(),
            "object_ids": object_ids,
            "solid_cells": solid,
            "config": config,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
        log::info!("Wrote summary to {}", path);
    }

    Ok(())
}

/// Stamp tree trunks and the optional blocking mask into a collision field.
fn build_collision(
    args: &[String],
    store: &LandscapeStore,
    config: &GenerationConfig,
) -> Result<CollisionField> {
    let params = &config.collision;
    let mut field = CollisionField::new(store.rect(), params.width, params.height);
    for tree in store.elements().iter().filter(|e| e.kind == ElementKind::Tree) {
        field.place_circle(tree.position.x, tree.position.z, TREE_COLLISION_RADIUS);
    }
    if let Some(mut mask) = optional_luma8(args, "--blocking")? {
        // Average masks finer than the field so thin walls are not skipped
        let div = mask.width() as f32 / field.width() as f32;
        if div > 1.0 {
            mask = mask.downsample(div);
        }
        field.place_mask(&mask, 1.0, 0.0);
    }
    if params.blur_radius > 0 {
        field.box_blur(params.blur_radius);
    }
    Ok(field)
}

/// Sorted object ids present in an RGBA object raster (red channel, 6 bits).
fn distinct_object_ids(objects: &Raster<u32>) -> Vec<u8> {
    let red = objects.channel(0);
    let mut seen = [false; 64];
    for &r in red.data() {
        if r != 0 {
            seen[(r / 4) as usize] = true;
        }
    }
    (0u8..64).filter(|&id| seen[id as usize]).collect()
}

fn optional_luma8(args: &[String], flag: &str) -> Result<Option<Raster<u8>>> {
    parse_str_arg(args, flag).map(load_luma8).transpose()
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
