//! Binary snapshot of a loaded map, cached for verbatim delivery.

use rkyv::{Archive, Deserialize, Serialize};

use super::MapData;
use crate::core::{Error, Result};

/// Serializable snapshot payload: the raw octree stream plus the metadata a
/// consumer needs to interpret it.
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq)]
pub struct SnapshotData {
    /// Coordinate frame the map is expressed in.
    pub frame_id: String,
    /// Tree type identifier from the map file.
    pub id: String,
    /// Finest resolution in meters.
    pub resolution: f64,
    /// Total tree node count.
    pub node_count: u64,
    /// Raw depth-first child-record stream, byte-identical to the file.
    pub tree: Vec<u8>,
}

/// Compressed binary snapshot of the full octree.
///
/// Encoded exactly once per map load; every query afterwards gets the same
/// bytes back without re-encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct MapSnapshot {
    bytes: Vec<u8>,
}

impl MapSnapshot {
    /// Serialize and compress a parsed map.
    pub fn encode(map: &MapData, frame_id: &str) -> Result<Self> {
        let data = SnapshotData {
            frame_id: frame_id.to_string(),
            id: map.id.clone(),
            resolution: map.resolution,
            node_count: map.node_count as u64,
            tree: map.tree_bytes.clone(),
        };

        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data)
            .map_err(|e| Error::Snapshot(e.to_string()))?;

        Ok(Self {
            bytes: lz4_flex::compress_prepend_size(&bytes),
        })
    }

    /// Decompress and deserialize the snapshot payload.
    pub fn decode(&self) -> Result<SnapshotData> {
        let raw = lz4_flex::decompress_size_prepended(&self.bytes)
            .map_err(|e| Error::Snapshot(format!("LZ4 decompression failed: {e}")))?;

        let archived = rkyv::access::<ArchivedSnapshotData, rkyv::rancor::Error>(&raw)
            .map_err(|e| Error::Snapshot(e.to_string()))?;
        rkyv::deserialize::<SnapshotData, rkyv::rancor::Error>(archived)
            .map_err(|e| Error::Snapshot(e.to_string()))
    }

    /// The compressed wire bytes, returned verbatim on every request.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
