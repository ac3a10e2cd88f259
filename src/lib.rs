//! Octoserve - serves persisted 3D occupancy octree maps

pub mod config;
pub mod core;
pub mod map;
pub mod server;
pub mod viz;
