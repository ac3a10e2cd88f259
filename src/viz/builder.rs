//! Builds the finalized per-level visualization from a voxel set.

use std::time::SystemTime;

use glam::DVec3;
use serde::Serialize;

use super::classifier::classify;
use super::color::{Rgba, height_color};
use crate::config::ServerConfig;
use crate::core::Result;
use crate::map::{MapBounds, OccupiedVoxel};

/// Finalized cube list for one level of detail.
#[derive(Clone, Debug, Serialize)]
pub struct CubeList {
    pub level: usize,
    /// Cube edge length at this level.
    pub voxel_size: f64,
    /// Coordinate frame of the points.
    pub frame_id: String,
    /// Creation time of the build this record belongs to.
    pub stamp: SystemTime,
    /// Cube centers.
    pub points: Vec<DVec3>,
    /// Per-point colors, parallel to `points`; empty when height coloring
    /// is disabled.
    pub colors: Vec<Rgba>,
    /// Uniform color applied when `colors` is empty.
    pub color: Rgba,
    /// False means "clear whatever a previous map drew at this level".
    pub populated: bool,
}

/// The full cached visualization: exactly `level_count` cube lists in
/// ascending level order, so a renderer can diff and replace by fixed
/// index. Built once per map load, immutable afterward.
#[derive(Clone, Debug, Serialize)]
pub struct Visualization {
    pub levels: Vec<CubeList>,
}

impl Visualization {
    /// Total number of cubes across all levels.
    pub fn occupied_count(&self) -> usize {
        self.levels.iter().map(|list| list.points.len()).sum()
    }
}

/// Height fraction for a point at height `z` within the map's vertical
/// extent: the top of the map maps to 0 and the bottom to `color_factor`,
/// which compresses the hue range so the color wheel does not wrap within
/// one map.
///
/// Degenerate bounds (`max.z <= min.z`, including the empty-map extent)
/// yield 0.0 for every point.
pub fn height_fraction(z: f64, bounds: &MapBounds, color_factor: f64) -> f64 {
    let span = bounds.z_span();
    if !(span > 0.0) {
        return 0.0;
    }
    (1.0 - ((z - bounds.min.z) / span).clamp(0.0, 1.0)) * color_factor
}

/// Classify, color, and finalize the voxel set into a [`Visualization`].
///
/// One-shot and side-effect free: no I/O, no input mutation, and identical
/// inputs produce identical output apart from the creation stamp.
pub fn build(
    voxels: &[OccupiedVoxel],
    bounds: &MapBounds,
    base_resolution: f64,
    config: &ServerConfig,
) -> Result<Visualization> {
    build_with_stamp(voxels, bounds, base_resolution, config, SystemTime::now())
}

/// [`build`] with an injected creation stamp, for deterministic comparison.
pub fn build_with_stamp(
    voxels: &[OccupiedVoxel],
    bounds: &MapBounds,
    base_resolution: f64,
    config: &ServerConfig,
    stamp: SystemTime,
) -> Result<Visualization> {
    config.validate()?;

    let mut buckets = classify(voxels, base_resolution, config.level_count)?;

    if config.use_height_map {
        for bucket in &mut buckets {
            bucket.colors.reserve(bucket.points.len());
            for point in &bucket.points {
                let h = height_fraction(point.z, bounds, config.color_factor);
                bucket.colors.push(height_color(h));
            }
            debug_assert_eq!(bucket.points.len(), bucket.colors.len());
        }
    }

    let levels = buckets
        .into_iter()
        .map(|bucket| CubeList {
            level: bucket.level,
            voxel_size: bucket.voxel_size,
            frame_id: config.frame_id.clone(),
            stamp,
            populated: !bucket.points.is_empty(),
            color: config.fixed_color,
            points: bucket.points,
            colors: bucket.colors,
        })
        .collect();

    Ok(Visualization { levels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viz::classifier::voxel_size_at_level;

    fn voxel(z: f64, size: f64) -> OccupiedVoxel {
        OccupiedVoxel::new(DVec3::new(0.0, 0.0, z), size)
    }

    fn bounds(min_z: f64, max_z: f64) -> MapBounds {
        MapBounds::new(
            DVec3::new(-1.0, -1.0, min_z),
            DVec3::new(1.0, 1.0, max_z),
        )
    }

    fn build_det(
        voxels: &[OccupiedVoxel],
        bounds: &MapBounds,
        base_resolution: f64,
        config: &ServerConfig,
    ) -> Visualization {
        build_with_stamp(voxels, bounds, base_resolution, config, SystemTime::UNIX_EPOCH)
            .expect("build failed")
    }

    #[test]
    fn test_height_fraction_extremes() {
        let b = bounds(0.0, 10.0);
        assert_eq!(height_fraction(0.0, &b, 0.8), 0.8);
        assert_eq!(height_fraction(10.0, &b, 0.8), 0.0);
        // Out-of-extent heights clamp.
        assert_eq!(height_fraction(-5.0, &b, 0.8), 0.8);
        assert_eq!(height_fraction(20.0, &b, 0.8), 0.0);
    }

    #[test]
    fn test_height_fraction_degenerate_bounds() {
        let flat = bounds(3.0, 3.0);
        assert_eq!(height_fraction(3.0, &flat, 0.8), 0.0);
        assert_eq!(height_fraction(99.0, &flat, 0.8), 0.0);
        assert_eq!(height_fraction(0.0, &MapBounds::EMPTY, 0.8), 0.0);
    }

    #[test]
    fn test_colors_parallel_to_points() {
        let r = 0.1;
        let voxels = [
            voxel(0.0, r),
            voxel(1.0, r),
            voxel(2.0, 2.0 * r),
            voxel(3.0, 4.0 * r),
        ];
        let viz = build_det(&voxels, &bounds(0.0, 3.0), r, &ServerConfig::default());

        assert_eq!(viz.levels.len(), 16);
        for list in &viz.levels {
            assert_eq!(list.points.len(), list.colors.len(), "level {}", list.level);
        }
        assert_eq!(viz.occupied_count(), 4);
    }

    #[test]
    fn test_fixed_color_mode() {
        let config = ServerConfig {
            use_height_map: false,
            ..ServerConfig::default()
        };
        let viz = build_det(&[voxel(1.0, 0.1)], &bounds(0.0, 2.0), 0.1, &config);

        for list in &viz.levels {
            assert!(list.colors.is_empty());
            assert_eq!(list.color, Rgba::new(0.0, 0.0, 1.0, 1.0));
        }
    }

    #[test]
    fn test_distinct_colors_across_extent() {
        // bounds 0..10, factor 0.8: z=0 -> h=0.8, z=10 -> h=0.
        let r = 0.1;
        let viz = build_det(
            &[voxel(0.0, r), voxel(10.0, r)],
            &bounds(0.0, 10.0),
            r,
            &ServerConfig::default(),
        );

        let colors = &viz.levels[0].colors;
        assert_eq!(colors.len(), 2);
        assert_ne!(colors[0], colors[1]);
        assert_eq!(colors[0], height_color(0.8));
        assert_eq!(colors[1], height_color(0.0));
    }

    #[test]
    fn test_populated_flags() {
        let r = 0.1;
        let viz = build_det(
            &[voxel(0.0, 2.0 * r)],
            &bounds(0.0, 1.0),
            r,
            &ServerConfig::default(),
        );

        for list in &viz.levels {
            assert_eq!(list.populated, list.level == 1, "level {}", list.level);
        }
    }

    #[test]
    fn test_empty_map() {
        let viz = build_det(&[], &MapBounds::EMPTY, 0.1, &ServerConfig::default());

        assert_eq!(viz.levels.len(), 16);
        for (i, list) in viz.levels.iter().enumerate() {
            assert!(!list.populated);
            assert!(list.points.is_empty());
            assert_eq!(list.level, i);
            assert_eq!(list.voxel_size, voxel_size_at_level(0.1, i));
        }
    }

    #[test]
    fn test_finalization_metadata() {
        let config = ServerConfig {
            frame_id: "/odom".to_string(),
            level_count: 4,
            ..ServerConfig::default()
        };
        let viz = build_det(&[voxel(0.5, 0.2)], &bounds(0.0, 1.0), 0.2, &config);

        assert_eq!(viz.levels.len(), 4);
        for list in &viz.levels {
            assert_eq!(list.frame_id, "/odom");
            assert_eq!(list.stamp, SystemTime::UNIX_EPOCH);
        }
    }

    #[test]
    fn test_idempotent_apart_from_stamp() {
        let r = 0.1;
        let voxels = [voxel(0.2, r), voxel(0.7, 2.0 * r)];
        let b = bounds(0.0, 1.0);
        let config = ServerConfig::default();

        let a = build_det(&voxels, &b, r, &config);
        let c = build_det(&voxels, &b, r, &config);

        let a_json = serde_json::to_string(&a).expect("serialize failed");
        let c_json = serde_json::to_string(&c).expect("serialize failed");
        assert_eq!(a_json, c_json);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ServerConfig {
            level_count: 0,
            ..ServerConfig::default()
        };
        assert!(build(&[], &MapBounds::EMPTY, 0.1, &config).is_err());
    }
}
