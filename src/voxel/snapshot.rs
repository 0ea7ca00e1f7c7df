//! Versioned grid snapshots.
//!
//! Persists `{coord -> (type, weight, last_size, material)}` as a JSON
//! document with an explicit format version. `age` and `affector_value`
//! are transient and deliberately not persisted.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Result;
use crate::core::Error;
use crate::render::{MaterialId, RenderBackend};
use super::grid::{GridCoord, VoxelGrid};

/// Current snapshot format version.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotDoc {
    version: u32,
    grid_extent: i32,
    voxel_size: f32,
    snap_step: i32,
    voxels: Vec<VoxelEntry>,
}

#[derive(Serialize, Deserialize)]
struct VoxelEntry {
    x: i32,
    y: i32,
    z: i32,
    voxel_type: i32,
    weight: f32,
    last_size: f32,
    material: MaterialId,
}

/// Write a snapshot of the grid to `path`.
pub fn save(grid: &VoxelGrid, path: impl AsRef<Path>) -> Result<()> {
    let mut voxels: Vec<VoxelEntry> = grid
        .iter()
        .map(|(coord, record)| VoxelEntry {
            x: coord.x,
            y: coord.y,
            z: coord.z,
            voxel_type: record.voxel_type(),
            weight: record.weight(),
            last_size: record.last_size(),
            material: record.material(),
        })
        .collect();
    // Stable output regardless of map iteration order.
    voxels.sort_by_key(|v| (v.x, v.y, v.z));

    let doc = SnapshotDoc {
        version: SNAPSHOT_VERSION,
        grid_extent: grid.extent(),
        voxel_size: grid.voxel_size(),
        snap_step: grid.snap_step(),
        voxels,
    };

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &doc)?;
    writer.flush()?;
    Ok(())
}

/// Load a snapshot, rebuilding the grid and re-requesting renderables.
///
/// Rejects unknown format versions, out-of-bounds entries, and duplicate
/// cells before any renderable is created. Each voxel's renderable is then
/// recreated through the backend; a persisted scale other than 1.0 is
/// restored with a rescale request.
pub fn load(path: impl AsRef<Path>, renderer: &mut dyn RenderBackend) -> Result<VoxelGrid> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let doc: SnapshotDoc = serde_json::from_reader(reader)?;

    if doc.version != SNAPSHOT_VERSION {
        return Err(Error::Snapshot(format!(
            "unsupported snapshot version: {}",
            doc.version
        )));
    }

    // Validate every entry before asking the backend for anything, so a
    // malformed document cannot leave orphaned renderables behind.
    let mut seen = HashSet::new();
    for entry in &doc.voxels {
        let coord = GridCoord::new(entry.x, entry.y, entry.z);
        if !coord.in_bounds(doc.grid_extent) {
            return Err(Error::Snapshot(format!(
                "entry {coord} outside grid extent {}",
                doc.grid_extent
            )));
        }
        if !seen.insert(coord) {
            return Err(Error::Snapshot(format!("duplicate entry at {coord}")));
        }
    }

    let mut grid = VoxelGrid::new(doc.grid_extent, doc.voxel_size).with_snap_step(doc.snap_step);
    for entry in &doc.voxels {
        let coord = GridCoord::new(entry.x, entry.y, entry.z);
        grid.place(
            coord,
            entry.voxel_type,
            entry.weight,
            entry.material,
            renderer,
        )?;
        if entry.last_size != 1.0 {
            grid.rescale(coord, entry.last_size, renderer)?;
        }
    }
    Ok(grid)
}
