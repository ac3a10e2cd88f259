//! Classification of occupied voxels into per-level buckets.

use glam::DVec3;

use super::color::Rgba;
use crate::core::{Error, Result};
use crate::map::OccupiedVoxel;

/// Upper bound on configurable level counts. Level 15 cubes are already
/// 2^15 times the base resolution; real maps never prune coarser.
pub const MAX_LEVELS: usize = 16;

/// Relative tolerance when checking a recovered level's nominal size
/// against the voxel's actual size.
const SIZE_TOLERANCE: f64 = 1e-6;

/// Accumulation bucket for one level of detail.
///
/// `colors` stays parallel to `points` whenever height coloring fills it;
/// the classifier itself only appends points.
#[derive(Clone, Debug)]
pub struct LevelBucket {
    pub level: usize,
    /// Nominal cube edge length at this level.
    pub voxel_size: f64,
    pub points: Vec<DVec3>,
    pub colors: Vec<Rgba>,
}

/// Cube edge length at `level`: doubling per level from the base.
pub fn voxel_size_at_level(base_resolution: f64, level: usize) -> f64 {
    base_resolution * (1u64 << level) as f64
}

/// Partition occupied voxels into per-level buckets.
///
/// The level index is recovered from the size ratio:
/// `round(log2(size / base_resolution))`. Rounding tolerates float drift
/// from repeated halving; the recovered level must still reproduce the
/// voxel's size within a small relative epsilon, else the map's resolution
/// metadata is inconsistent and the build aborts.
///
/// Always returns exactly `level_count` buckets in ascending level order.
/// Empty buckets are retained; they tell a renderer to clear that level.
/// Within a bucket, points follow input order (stable, unsorted).
pub fn classify(
    voxels: &[OccupiedVoxel],
    base_resolution: f64,
    level_count: usize,
) -> Result<Vec<LevelBucket>> {
    let mut buckets: Vec<LevelBucket> = (0..level_count)
        .map(|level| LevelBucket {
            level,
            voxel_size: voxel_size_at_level(base_resolution, level),
            points: Vec::with_capacity(expected_points(voxels.len(), level)),
            colors: Vec::new(),
        })
        .collect();

    for voxel in voxels {
        let level = level_for_size(voxel, base_resolution, level_count)?;
        buckets[level].points.push(voxel.center);
    }

    Ok(buckets)
}

/// Expected bucket sizes: most occupied volume lives at the finest levels.
/// Allocation hint only; buckets that outgrow it reallocate normally.
fn expected_points(total: usize, level: usize) -> usize {
    match level {
        0 => total,
        1 => total / 2,
        2 | 3 => total / 4,
        _ => 0,
    }
}

fn level_for_size(
    voxel: &OccupiedVoxel,
    base_resolution: f64,
    level_count: usize,
) -> Result<usize> {
    let idx = (voxel.size / base_resolution).log2().round() as i32;
    if idx < 0 || idx as usize >= level_count {
        return Err(Error::OutOfRangeLevel {
            center: voxel.center,
            size: voxel.size,
            level: idx,
            level_count,
        });
    }

    let level = idx as usize;
    let nominal = voxel_size_at_level(base_resolution, level);
    if (nominal - voxel.size).abs() > nominal * SIZE_TOLERANCE {
        return Err(Error::InconsistentVoxelSize {
            center: voxel.center,
            size: voxel.size,
            level,
            nominal,
        });
    }

    Ok(level)
}
