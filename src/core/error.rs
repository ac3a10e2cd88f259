//! Error types for the map server

use std::path::PathBuf;

use glam::DVec3;
use thiserror::Error;

/// Main error type for the map server
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read map file {path}: {source}")]
    MapRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupt map file: {0}")]
    MapFormat(String),

    #[error(
        "voxel at {center:?} (size {size}) classifies to level {level}, outside 0..{level_count}"
    )]
    OutOfRangeLevel {
        center: DVec3,
        size: f64,
        level: i32,
        level_count: usize,
    },

    #[error(
        "voxel at {center:?} has size {size}, but level {level} implies size {nominal} \
         (inconsistent resolution metadata)"
    )]
    InconsistentVoxelSize {
        center: DVec3,
        size: f64,
        level: usize,
        nominal: f64,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Standard Result type for the map server
pub type Result<T> = std::result::Result<T, Error>;
