use criterion::{Criterion, black_box, criterion_group, criterion_main};

use glam::DVec3;
use octoserve::config::ServerConfig;
use octoserve::map::{MapBounds, OccupiedVoxel};
use octoserve::viz::{build, classify};

const RESOLUTION: f64 = 0.05;

/// Deterministic synthetic map: a grid of finest-level voxels with coarser
/// cubes mixed in at the level distribution the classifier's capacity
/// heuristic assumes.
fn synthetic_map(per_side: usize) -> (Vec<OccupiedVoxel>, MapBounds) {
    let mut voxels = Vec::with_capacity(per_side * per_side * per_side);
    let mut bounds = MapBounds::EMPTY;

    for x in 0..per_side {
        for y in 0..per_side {
            for z in 0..per_side {
                let i = (x * per_side + y) * per_side + z;
                let level = match i % 8 {
                    0..=3 => 0,
                    4 | 5 => 1,
                    6 => 2,
                    _ => 3,
                };
                let size = RESOLUTION * f64::from(1u32 << level);
                let center = DVec3::new(
                    x as f64 * RESOLUTION * 8.0,
                    y as f64 * RESOLUTION * 8.0,
                    z as f64 * RESOLUTION * 8.0,
                );
                bounds.enclose(center, size);
                voxels.push(OccupiedVoxel::new(center, size));
            }
        }
    }

    (voxels, bounds)
}

fn bench_classify_32k(c: &mut Criterion) {
    let (voxels, _) = synthetic_map(32);

    c.bench_function("classify_32k", |b| {
        b.iter(|| classify(black_box(&voxels), RESOLUTION, 16).unwrap());
    });
}

fn bench_build_height_colored_32k(c: &mut Criterion) {
    let (voxels, bounds) = synthetic_map(32);
    let config = ServerConfig::default();

    c.bench_function("build_height_colored_32k", |b| {
        b.iter(|| build(black_box(&voxels), &bounds, RESOLUTION, &config).unwrap());
    });
}

fn bench_build_fixed_color_32k(c: &mut Criterion) {
    let (voxels, bounds) = synthetic_map(32);
    let config = ServerConfig {
        use_height_map: false,
        ..ServerConfig::default()
    };

    c.bench_function("build_fixed_color_32k", |b| {
        b.iter(|| build(black_box(&voxels), &bounds, RESOLUTION, &config).unwrap());
    });
}

criterion_group!(
    benches,
    bench_classify_32k,
    bench_build_height_colored_32k,
    bench_build_fixed_color_32k
);
criterion_main!(benches);
