//! Level-of-detail visualization of the occupied-voxel set

pub mod builder;
pub mod classifier;
pub mod color;

pub use builder::{CubeList, Visualization, build, build_with_stamp, height_fraction};
pub use classifier::{LevelBucket, MAX_LEVELS, classify, voxel_size_at_level};
pub use color::{Rgba, height_color};
