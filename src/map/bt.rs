//! Parser for the binary octree (`.bt`) map file format.
//!
//! A file is an ASCII header followed by a binary node stream:
//!
//! ```text
//! # Octomap OcTree binary file
//! id OcTree
//! size 4
//! res 0.05
//! data
//! <binary>
//! ```
//!
//! The stream holds one two-byte record per node that has children, in
//! depth-first order. Each record packs 2 bits per child (children 0-3 in
//! the first byte, 4-7 in the second): `00` no child, `01` free leaf,
//! `10` occupied leaf, `11` inner child with its own record following.
//!
//! Geometry is implicit: the tree is 16 levels deep, the root cube is
//! centered at the origin with edge `res * 2^16`, and child `i` of a node
//! at `(center, size)` has edge `size / 2` centered at `center ± size/4`
//! per axis (x from bit 0, y from bit 1, z from bit 2).

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::DVec3;

use super::{MapBounds, MapData, OccupiedVoxel};
use crate::core::{Error, Result};

/// Fixed depth of the key space; leaves exist at depths 1..=16.
const TREE_DEPTH: u32 = 16;

const MAGIC: &str = "# Octomap OcTree binary file";

/// Read and parse a `.bt` map file.
pub fn load(path: &Path) -> Result<MapData> {
    let file = fs::File::open(path).map_err(|source| Error::MapRead {
        path: path.to_path_buf(),
        source,
    })?;
    let map = parse(BufReader::new(file))?;

    log::info!(
        "map file {} parsed: {} nodes, {} occupied leaves, resolution {}",
        path.display(),
        map.node_count,
        map.voxels.len(),
        map.resolution
    );
    Ok(map)
}

/// Parse a `.bt` byte stream.
pub fn parse<R: BufRead>(mut reader: R) -> Result<MapData> {
    let header = read_header(&mut reader)?;

    let mut tree_bytes = Vec::new();
    reader.read_to_end(&mut tree_bytes)?;

    let mut decoder = Decoder {
        bytes: &tree_bytes,
        pos: 0,
        voxels: Vec::new(),
        bounds: MapBounds::EMPTY,
        node_count: 1,
    };

    // A single-node tree is just the (leaf) root and carries no records.
    if !tree_bytes.is_empty() {
        let root_size = header.resolution * f64::from(1u32 << TREE_DEPTH);
        decoder.decode_node(DVec3::ZERO, root_size, TREE_DEPTH)?;
    }

    if decoder.pos != tree_bytes.len() {
        return Err(Error::MapFormat(format!(
            "{} trailing bytes after the node stream",
            tree_bytes.len() - decoder.pos
        )));
    }
    if decoder.node_count != header.node_count {
        return Err(Error::MapFormat(format!(
            "header declares {} nodes but the stream holds {}",
            header.node_count, decoder.node_count
        )));
    }

    Ok(MapData {
        id: header.id,
        resolution: header.resolution,
        node_count: header.node_count,
        voxels: decoder.voxels,
        bounds: decoder.bounds,
        tree_bytes,
    })
}

struct Header {
    id: String,
    node_count: usize,
    resolution: f64,
}

fn read_header<R: BufRead>(reader: &mut R) -> Result<Header> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.trim_end() != MAGIC {
        return Err(Error::MapFormat(format!(
            "bad magic line {:?}, expected {:?}",
            line.trim_end(),
            MAGIC
        )));
    }

    let mut id = "OcTree".to_string();
    let mut node_count: Option<usize> = None;
    let mut resolution: Option<f64> = None;

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::MapFormat("header ends before 'data' line".into()));
        }
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "data" {
            break;
        }

        match line.split_once(' ') {
            Some(("id", value)) => id = value.to_string(),
            Some(("size", value)) => {
                node_count = Some(value.parse().map_err(|_| {
                    Error::MapFormat(format!("unparsable node count {value:?}"))
                })?);
            }
            Some(("res", value)) => {
                let res: f64 = value.parse().map_err(|_| {
                    Error::MapFormat(format!("unparsable resolution {value:?}"))
                })?;
                if !(res > 0.0) {
                    return Err(Error::MapFormat(format!("non-positive resolution {res}")));
                }
                resolution = Some(res);
            }
            _ => {
                return Err(Error::MapFormat(format!("unrecognized header line {line:?}")));
            }
        }
    }

    Ok(Header {
        id,
        node_count: node_count
            .ok_or_else(|| Error::MapFormat("header missing 'size' line".into()))?,
        resolution: resolution
            .ok_or_else(|| Error::MapFormat("header missing 'res' line".into()))?,
    })
}

const CHILD_NONE: u16 = 0b00;
const CHILD_FREE: u16 = 0b01;
const CHILD_OCCUPIED: u16 = 0b10;
const CHILD_INNER: u16 = 0b11;

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    voxels: Vec<OccupiedVoxel>,
    bounds: MapBounds,
    /// Nodes seen so far; starts at 1 for the root.
    node_count: usize,
}

impl Decoder<'_> {
    /// Decode the record of one node with children, then its inner
    /// children's subtrees in ascending child order.
    ///
    /// `remaining` counts the levels below this node; the finest leaves sit
    /// at `remaining == 0`.
    fn decode_node(&mut self, center: DVec3, size: f64, remaining: u32) -> Result<()> {
        let bits = self.read_record()?;

        for child in 0..8 {
            match (bits >> (2 * child)) & 0b11 {
                CHILD_NONE => {}
                // free leaves contribute no geometry
                CHILD_FREE | CHILD_INNER => self.node_count += 1,
                CHILD_OCCUPIED => {
                    self.node_count += 1;
                    let child_center = child_center(center, size, child);
                    let child_size = size / 2.0;
                    self.bounds.enclose(child_center, child_size);
                    self.voxels.push(OccupiedVoxel::new(child_center, child_size));
                }
                _ => unreachable!(),
            }
        }

        for child in 0..8 {
            if (bits >> (2 * child)) & 0b11 == CHILD_INNER {
                if remaining <= 1 {
                    return Err(Error::MapFormat(format!(
                        "node stream descends below the {TREE_DEPTH}-level tree depth"
                    )));
                }
                self.decode_node(child_center(center, size, child), size / 2.0, remaining - 1)?;
            }
        }

        Ok(())
    }

    fn read_record(&mut self) -> Result<u16> {
        let Some(record) = self.bytes.get(self.pos..self.pos + 2) else {
            return Err(Error::MapFormat(format!(
                "node stream truncated at byte {}",
                self.pos
            )));
        };
        self.pos += 2;
        Ok(u16::from(record[0]) | u16::from(record[1]) << 8)
    }
}

/// Center of child `i` of a node at `(center, size)`.
fn child_center(center: DVec3, size: f64, i: usize) -> DVec3 {
    let q = size / 4.0;
    DVec3::new(
        if i & 1 != 0 { center.x + q } else { center.x - q },
        if i & 2 != 0 { center.y + q } else { center.y - q },
        if i & 4 != 0 { center.z + q } else { center.z - q },
    )
}
