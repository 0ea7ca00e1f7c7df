//! Voxel data structures and grid operations

pub mod grid;
pub mod record;
pub mod snapshot;

pub use grid::{GridCoord, GridError, VoxelGrid, VoxelTarget};
pub use record::VoxelRecord;
