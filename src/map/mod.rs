//! Occupancy map data model and on-disk format handling

pub mod bt;
pub mod snapshot;

use glam::DVec3;

/// One occupied octree leaf: a cube of space marked occupied, at whatever
/// depth the tree pruned it to. Edge length is always a power-of-two
/// multiple of the map's base resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OccupiedVoxel {
    /// Cube center in map coordinates.
    pub center: DVec3,
    /// Cube edge length.
    pub size: f64,
}

impl OccupiedVoxel {
    pub fn new(center: DVec3, size: f64) -> Self {
        Self { center, size }
    }
}

/// Global metric extent of a loaded map.
///
/// Only the z components feed height coloring; the rest is kept for
/// consumers that want the full extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapBounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl MapBounds {
    /// Inverted extent that encloses nothing; `enclose` grows it.
    pub const EMPTY: Self = Self {
        min: DVec3::INFINITY,
        max: DVec3::NEG_INFINITY,
    };

    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Grow to enclose a cube of edge `size` centered at `center`.
    pub fn enclose(&mut self, center: DVec3, size: f64) {
        let half = size / 2.0;
        self.min = self.min.min(center - half);
        self.max = self.max.max(center + half);
    }

    /// Vertical extent; non-positive (or non-finite) for degenerate bounds.
    pub fn z_span(&self) -> f64 {
        self.max.z - self.min.z
    }
}

impl Default for MapBounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A fully parsed occupancy map, ready for visualization and snapshotting.
#[derive(Clone, Debug)]
pub struct MapData {
    /// Tree type identifier from the file header.
    pub id: String,
    /// Finest (base) resolution in meters.
    pub resolution: f64,
    /// Total tree node count per the file header.
    pub node_count: usize,
    /// Occupied leaves, in file stream order.
    pub voxels: Vec<OccupiedVoxel>,
    /// Metric extent of the occupied leaves.
    pub bounds: MapBounds,
    /// Raw depth-first child-record stream, kept verbatim for snapshots.
    pub tree_bytes: Vec<u8>,
}
