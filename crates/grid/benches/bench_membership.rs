use std::hint::black_box;
use std::time::Instant;

use glam::DVec3;
use tileslicer_common::Aabb;
use tileslicer_grid::{GridPlanner, ObjectBoundsTable};

/// A square field of unit-ish boxes spread `spacing` apart on the XY plane.
fn make_table(object_count: usize, spacing: f64) -> ObjectBoundsTable<usize> {
    let side = (object_count as f64).sqrt().ceil() as usize;
    let entries = (0..object_count)
        .map(|i| {
            let min = DVec3::new((i % side) as f64 * spacing, (i / side) as f64 * spacing, 0.0);
            (i, Aabb::new(min, min + DVec3::new(1.5, 1.5, 3.0)))
        })
        .collect();
    ObjectBoundsTable::from_entries(entries)
}

fn bench_plan(object_count: usize, iterations: usize) {
    let table = make_table(object_count, 4.0);

    let start = Instant::now();
    for _ in 0..iterations {
        let bounds = black_box(&table).collection_bounds().map(|b| b.aabb());
        if let Some(bounds) = bounds {
            let _ = black_box(GridPlanner::plan(&bounds, DVec3::splat(16.0)));
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  bounds + plan ({object_count} objects, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_full_traversal(object_count: usize, tile: f64, iterations: usize) {
    let table = make_table(object_count, 4.0);
    let bounds = table.collection_bounds().map(|b| b.aabb());
    let Some(bounds) = bounds else { return };
    let Ok(grid) = GridPlanner::plan(&bounds, DVec3::splat(tile)) else {
        return;
    };

    let start = Instant::now();
    let mut placements = 0;
    for _ in 0..iterations {
        for index in grid.indices() {
            let t = grid.tile_bounds(index);
            placements += black_box(&table).count_in_tile(t.min, t.max);
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  traversal ({object_count} objects, {} tiles, {iterations} iters): {per_iter:?}/iter, {} placements",
        grid.tile_count(),
        placements / iterations
    );
}

fn main() {
    println!("=== Tile Membership Benchmarks ===\n");

    println!("Bounds aggregation and grid planning:");
    bench_plan(100, 1000);
    bench_plan(1000, 100);
    bench_plan(10000, 10);

    println!("\nFull traversal, 16m tiles:");
    bench_full_traversal(100, 16.0, 100);
    bench_full_traversal(1000, 16.0, 10);
    bench_full_traversal(10000, 16.0, 1);

    println!("\nFull traversal, 8m tiles:");
    bench_full_traversal(1000, 8.0, 10);

    println!("\n=== Done ===");
}
