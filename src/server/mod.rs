//! Cached map serving: load once, answer forever.

use std::path::Path;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::Result;
use crate::map::{self, snapshot::MapSnapshot};
use crate::viz::{self, Visualization};

/// Holds the results of one map load, immutable after construction.
///
/// Both cached values live behind `Arc`s, so any number of responders can
/// hand them out concurrently without locking or rebuilding. Loading a new
/// map means constructing a new `MapServer`; readers still holding the old
/// `Arc`s keep a consistent view and never observe a partial build.
#[derive(Debug)]
pub struct MapServer {
    config: ServerConfig,
    visualization: Arc<Visualization>,
    snapshot: Arc<MapSnapshot>,
    node_count: usize,
    occupied_count: usize,
}

impl MapServer {
    /// Read a map file and build both cached outputs.
    ///
    /// Any failure propagates without leaving servable state behind.
    pub fn load(path: &Path, config: ServerConfig) -> Result<Self> {
        config.validate()?;

        let map = map::bt::load(path)?;
        let visualization =
            viz::builder::build(&map.voxels, &map.bounds, map.resolution, &config)?;
        let snapshot = MapSnapshot::encode(&map, &config.frame_id)?;

        let occupied_count = map.voxels.len();
        log::info!(
            "map {} loaded ({} nodes, {} occupied voxels visualized, snapshot {} bytes)",
            path.display(),
            map.node_count,
            occupied_count,
            snapshot.len()
        );

        Ok(Self {
            config,
            visualization: Arc::new(visualization),
            snapshot: Arc::new(snapshot),
            node_count: map.node_count,
            occupied_count,
        })
    }

    /// The latched visualization: the same value on every call, never
    /// rebuilt.
    pub fn visualization(&self) -> Arc<Visualization> {
        Arc::clone(&self.visualization)
    }

    /// The cached binary map, returned verbatim on every request.
    pub fn snapshot(&self) -> Arc<MapSnapshot> {
        log::debug!("sending cached map snapshot");
        Arc::clone(&self.snapshot)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied_count
    }
}
