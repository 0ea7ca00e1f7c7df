//! Editor configuration

use std::time::Duration;

use crate::render::MaterialId;

/// Configuration for an editing session
#[derive(Clone, Debug)]
pub struct EditorConfig {
    /// Cubic bound of addressable coordinates, per axis
    pub grid_extent: i32,
    /// Edge length of one voxel in world units
    pub voxel_size: f32,
    /// Snap quantization step for cell resolution (>= 1; 1 disables)
    pub snap_step: i32,
    /// Minimum time between repeated actions on the same cell;
    /// zero disables the debounce
    pub min_repeat_interval: Duration,
    /// Material bound to newly placed voxels until a pick changes it
    pub default_material: MaterialId,
    /// Type tag assigned to newly placed voxels
    pub default_voxel_type: i32,
    /// Weight assigned to newly placed voxels
    pub default_weight: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_extent: 10,
            voxel_size: 1.0,
            snap_step: 1,
            min_repeat_interval: Duration::ZERO, // no debounce
            default_material: MaterialId(0),
            default_voxel_type: 0,
            default_weight: 1.0,
        }
    }
}
