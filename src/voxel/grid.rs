//! Sparse voxel grid: placement, removal, and lifecycle of voxel records.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::core::types::Vec3;
use crate::render::{MaterialId, RenderBackend, RenderableHandle};
use super::record::VoxelRecord;

/// Integer coordinate of a cell in the editing grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    /// Create a new grid coordinate
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Whether every axis lies in `[0, extent)`.
    pub fn in_bounds(&self, extent: i32) -> bool {
        (0..extent).contains(&self.x) && (0..extent).contains(&self.y) && (0..extent).contains(&self.z)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Recoverable grid operation failures.
///
/// All of these are local conditions returned to the dispatch layer;
/// none is fatal.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("coordinate {coord} outside grid extent {extent}")]
    OutOfBounds { coord: GridCoord, extent: i32 },

    #[error("cell {0} is already occupied")]
    AlreadyOccupied(GridCoord),

    #[error("no voxel at the given target")]
    NotFound,
}

/// Addressing for operations that accept either a cell or a renderable.
///
/// The coordinate map is canonical; handle targets are resolved through the
/// reverse index.
#[derive(Clone, Copy, Debug)]
pub enum VoxelTarget {
    Cell(GridCoord),
    Renderable(RenderableHandle),
}

impl From<GridCoord> for VoxelTarget {
    fn from(coord: GridCoord) -> Self {
        VoxelTarget::Cell(coord)
    }
}

impl From<RenderableHandle> for VoxelTarget {
    fn from(handle: RenderableHandle) -> Self {
        VoxelTarget::Renderable(handle)
    }
}

/// Bounded sparse grid mapping occupied cells to voxel records.
///
/// Exclusively owns all [`VoxelRecord`]s. Renderables are created and
/// destroyed in lock-step with record creation and destruction, so no
/// handle stored here outlives its renderable.
#[derive(Debug)]
pub struct VoxelGrid {
    /// Cubic bound of addressable coordinates, per axis.
    extent: i32,
    /// Edge length of one voxel in world units.
    voxel_size: f32,
    /// Quantization step for cell resolution; 1 is the identity.
    snap_step: i32,
    /// Canonical store: occupied cells only.
    cells: HashMap<GridCoord, VoxelRecord>,
    /// Reverse index for collision-hit paths that arrive with a handle.
    by_handle: HashMap<RenderableHandle, GridCoord>,
}

impl VoxelGrid {
    /// Create an empty grid with the given extent and voxel size.
    pub fn new(extent: i32, voxel_size: f32) -> Self {
        Self {
            extent,
            voxel_size,
            snap_step: 1,
            cells: HashMap::new(),
            by_handle: HashMap::new(),
        }
    }

    /// Set the snap quantization step (clamped to >= 1).
    pub fn with_snap_step(mut self, step: i32) -> Self {
        self.snap_step = step.max(1);
        self
    }

    pub fn extent(&self) -> i32 {
        self.extent
    }

    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    pub fn snap_step(&self) -> i32 {
        self.snap_step
    }

    /// Number of placed voxels.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn get(&self, coord: GridCoord) -> Option<&VoxelRecord> {
        self.cells.get(&coord)
    }

    pub fn get_mut(&mut self, coord: GridCoord) -> Option<&mut VoxelRecord> {
        self.cells.get_mut(&coord)
    }

    /// Cell occupied by the given renderable, if any.
    pub fn coord_of(&self, handle: RenderableHandle) -> Option<GridCoord> {
        self.by_handle.get(&handle).copied()
    }

    /// Iterate occupied cells.
    pub fn iter(&self) -> impl Iterator<Item = (&GridCoord, &VoxelRecord)> {
        self.cells.iter()
    }

    /// Mutable iteration hook for external per-voxel simulations
    /// (aging, affector updates). Nothing in this crate drives it.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&GridCoord, &mut VoxelRecord)> {
        self.cells.iter_mut()
    }

    /// Convert a continuous world-space hit point into a grid coordinate.
    ///
    /// `round(world / voxel_size) + extent/2` per axis, then quantized down
    /// to the snap step. Deterministic; the result carries no bounds
    /// guarantee — callers bounds-check (place does so itself).
    pub fn resolve_cell(&self, world: Vec3) -> GridCoord {
        let half = self.extent / 2;
        let cell = |v: f32| (v / self.voxel_size).round() as i32 + half;
        let snap = |c: i32| c - c.rem_euclid(self.snap_step);
        GridCoord::new(snap(cell(world.x)), snap(cell(world.y)), snap(cell(world.z)))
    }

    /// World-space center of a cell; exact inverse of [`Self::resolve_cell`]
    /// (with snap step 1).
    pub fn cell_to_world(&self, coord: GridCoord) -> Vec3 {
        let half = (self.extent / 2) as f32;
        Vec3::new(
            (coord.x as f32 - half) * self.voxel_size,
            (coord.y as f32 - half) * self.voxel_size,
            (coord.z as f32 - half) * self.voxel_size,
        )
    }

    /// Place a voxel at a free cell (fail-closed).
    ///
    /// Errors with `OutOfBounds` if any axis of `coord` is outside
    /// `[0, extent)`, and `AlreadyOccupied` if the cell holds a record.
    /// On success a renderable is requested at the cell's world position
    /// and the new record is returned.
    pub fn place(
        &mut self,
        coord: GridCoord,
        voxel_type: i32,
        weight: f32,
        material: MaterialId,
        renderer: &mut dyn RenderBackend,
    ) -> Result<&VoxelRecord, GridError> {
        if !coord.in_bounds(self.extent) {
            return Err(GridError::OutOfBounds { coord, extent: self.extent });
        }
        if self.cells.contains_key(&coord) {
            return Err(GridError::AlreadyOccupied(coord));
        }
        Ok(self.insert(coord, voxel_type, weight, material, renderer))
    }

    /// Place a voxel, replacing any existing record at the cell.
    ///
    /// The permissive prototype policy, explicit: only `OutOfBounds` is
    /// possible, and exactly one record is left at `coord`.
    pub fn place_or_replace(
        &mut self,
        coord: GridCoord,
        voxel_type: i32,
        weight: f32,
        material: MaterialId,
        renderer: &mut dyn RenderBackend,
    ) -> Result<&VoxelRecord, GridError> {
        if !coord.in_bounds(self.extent) {
            return Err(GridError::OutOfBounds { coord, extent: self.extent });
        }
        if let Some(old) = self.cells.remove(&coord) {
            self.by_handle.remove(&old.handle());
            renderer.destroy_renderable(old.handle());
        }
        Ok(self.insert(coord, voxel_type, weight, material, renderer))
    }

    fn insert(
        &mut self,
        coord: GridCoord,
        voxel_type: i32,
        weight: f32,
        material: MaterialId,
        renderer: &mut dyn RenderBackend,
    ) -> &VoxelRecord {
        let handle = renderer.create_renderable(self.cell_to_world(coord), material);
        self.by_handle.insert(handle, coord);
        self.cells
            .entry(coord)
            .or_insert_with(|| VoxelRecord::new(handle, voxel_type, weight, material))
    }

    /// Remove the voxel at a cell or behind a handle.
    ///
    /// Errors with `NotFound` if nothing is there; absence is reportable,
    /// not a silent no-op. On success the renderable is destroyed and both
    /// index entries erased.
    pub fn remove(
        &mut self,
        target: impl Into<VoxelTarget>,
        renderer: &mut dyn RenderBackend,
    ) -> Result<(), GridError> {
        let coord = self.target_coord(target.into()).ok_or(GridError::NotFound)?;
        let record = self.cells.remove(&coord).ok_or(GridError::NotFound)?;
        self.by_handle.remove(&record.handle());
        renderer.destroy_renderable(record.handle());
        Ok(())
    }

    /// Update `last_size` and request a renderable scale update together.
    ///
    /// The scale request is issued on every call, never deduplicated. The
    /// factor is passed through unvalidated; zero or negative scales reach
    /// the backend as-is.
    pub fn rescale(
        &mut self,
        target: impl Into<VoxelTarget>,
        scale: f32,
        renderer: &mut dyn RenderBackend,
    ) -> Result<(), GridError> {
        let coord = self.target_coord(target.into()).ok_or(GridError::NotFound)?;
        let record = self.cells.get_mut(&coord).ok_or(GridError::NotFound)?;
        record.set_last_size(scale);
        renderer.set_renderable_scale(record.handle(), scale);
        Ok(())
    }

    /// Bind a material to a voxel's renderable.
    ///
    /// Reapplying the current material is not an error; the backend is
    /// re-asked to bind it each call.
    pub fn retexture(
        &mut self,
        target: impl Into<VoxelTarget>,
        material: MaterialId,
        renderer: &mut dyn RenderBackend,
    ) -> Result<(), GridError> {
        let coord = self.target_coord(target.into()).ok_or(GridError::NotFound)?;
        let record = self.cells.get_mut(&coord).ok_or(GridError::NotFound)?;
        record.set_material(material);
        renderer.set_renderable_material(record.handle(), material);
        Ok(())
    }

    /// Resolve a target to the occupied cell it names, if any.
    fn target_coord(&self, target: VoxelTarget) -> Option<GridCoord> {
        match target {
            VoxelTarget::Cell(coord) => self.cells.contains_key(&coord).then_some(coord),
            VoxelTarget::Renderable(handle) => self.by_handle.get(&handle).copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::{RecordingRenderer, RenderCall};

    fn grid() -> VoxelGrid {
        VoxelGrid::new(10, 1.0)
    }

    #[test]
    fn test_resolve_cell_origin() {
        let grid = grid();
        assert_eq!(grid.resolve_cell(Vec3::ZERO), GridCoord::new(5, 5, 5));
    }

    #[test]
    fn test_resolve_cell_deterministic() {
        let grid = grid();
        let world = Vec3::new(1.4, -2.6, 3.5);
        assert_eq!(grid.resolve_cell(world), grid.resolve_cell(world));
    }

    #[test]
    fn test_resolve_cell_inverts_cell_to_world() {
        let grid = grid();
        for coord in [GridCoord::new(0, 0, 0), GridCoord::new(5, 5, 5), GridCoord::new(9, 3, 7)] {
            assert_eq!(grid.resolve_cell(grid.cell_to_world(coord)), coord);
        }
    }

    #[test]
    fn test_resolve_cell_snap_quantization() {
        let grid = VoxelGrid::new(10, 1.0).with_snap_step(2);
        // Cell (5,5,5) quantizes down to (4,4,4) with step 2.
        assert_eq!(grid.resolve_cell(Vec3::ZERO), GridCoord::new(4, 4, 4));
        assert_eq!(grid.resolve_cell(Vec3::new(-1.0, -1.0, -1.0)), GridCoord::new(4, 4, 4));
    }

    #[test]
    fn test_place_then_remove_restores_state() {
        let mut grid = grid();
        let mut renderer = RecordingRenderer::new();
        let coord = GridCoord::new(5, 5, 5);

        let record = grid.place(coord, 0, 1.0, MaterialId(0), &mut renderer).unwrap();
        assert_eq!(record.age(), 0);
        assert_eq!(record.last_size(), 1.0);
        let handle = record.handle();
        assert_eq!(grid.coord_of(handle), Some(coord));

        grid.remove(coord, &mut renderer).unwrap();
        assert!(!grid.is_occupied(coord));
        assert_eq!(grid.coord_of(handle), None);
        assert!(grid.is_empty());
        assert_eq!(renderer.calls.last(), Some(&RenderCall::Destroy(handle)));
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut grid = grid();
        let mut renderer = RecordingRenderer::new();
        let coord = GridCoord::new(-1, 0, 0);

        let err = grid.place(coord, 0, 1.0, MaterialId(0), &mut renderer).unwrap_err();
        assert_eq!(err, GridError::OutOfBounds { coord, extent: 10 });
        assert!(renderer.calls.is_empty());
    }

    #[test]
    fn test_place_occupied_fails_closed() {
        let mut grid = grid();
        let mut renderer = RecordingRenderer::new();
        let coord = GridCoord::new(1, 2, 3);

        grid.place(coord, 0, 1.0, MaterialId(0), &mut renderer).unwrap();
        let err = grid.place(coord, 1, 2.0, MaterialId(1), &mut renderer).unwrap_err();
        assert_eq!(err, GridError::AlreadyOccupied(coord));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_place_or_replace_leaves_one_record() {
        let mut grid = grid();
        let mut renderer = RecordingRenderer::new();
        let coord = GridCoord::new(1, 2, 3);

        let first = grid.place(coord, 0, 1.0, MaterialId(0), &mut renderer).unwrap().handle();
        let second = grid
            .place_or_replace(coord, 7, 2.0, MaterialId(3), &mut renderer)
            .unwrap()
            .handle();

        assert_ne!(first, second);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.get(coord).map(|r| r.voxel_type()), Some(7));
        // Old renderable destroyed, old handle unindexed.
        assert!(renderer.calls.contains(&RenderCall::Destroy(first)));
        assert_eq!(grid.coord_of(first), None);
        assert_eq!(grid.coord_of(second), Some(coord));
    }

    #[test]
    fn test_remove_absent_is_reported() {
        let mut grid = grid();
        let mut renderer = RecordingRenderer::new();
        let coord = GridCoord::new(5, 5, 5);

        assert_eq!(grid.remove(coord, &mut renderer), Err(GridError::NotFound));

        grid.place(coord, 0, 1.0, MaterialId(0), &mut renderer).unwrap();
        grid.remove(coord, &mut renderer).unwrap();
        assert_eq!(grid.remove(coord, &mut renderer), Err(GridError::NotFound));
    }

    #[test]
    fn test_remove_by_handle() {
        let mut grid = grid();
        let mut renderer = RecordingRenderer::new();
        let coord = GridCoord::new(4, 4, 4);

        let handle = grid.place(coord, 0, 1.0, MaterialId(0), &mut renderer).unwrap().handle();
        grid.remove(handle, &mut renderer).unwrap();
        assert!(!grid.is_occupied(coord));

        assert_eq!(grid.remove(handle, &mut renderer), Err(GridError::NotFound));
    }

    #[test]
    fn test_external_mutation_keeps_reverse_index() {
        let mut grid = grid();
        let mut renderer = RecordingRenderer::new();
        let coord = GridCoord::new(6, 1, 2);

        let handle = grid.place(coord, 0, 1.0, MaterialId(0), &mut renderer).unwrap().handle();

        // An external simulation may touch age/affector through iter_mut,
        // but records expose no way to reassign the handle, so the reverse
        // index stays authoritative.
        for (_, record) in grid.iter_mut() {
            record.set_age(record.age() + 1);
            record.set_affector_value(0.25);
        }

        assert_eq!(grid.coord_of(handle), Some(coord));
        assert_eq!(grid.get(coord).map(|r| r.age()), Some(1));
        grid.remove(handle, &mut renderer).unwrap();
        assert_eq!(grid.coord_of(handle), None);
    }

    #[test]
    fn test_rescale_updates_both_every_call() {
        let mut grid = grid();
        let mut renderer = RecordingRenderer::new();
        let coord = GridCoord::new(2, 2, 2);

        grid.place(coord, 0, 1.0, MaterialId(0), &mut renderer).unwrap();
        grid.rescale(coord, 0.5, &mut renderer).unwrap();
        grid.rescale(coord, 0.5, &mut renderer).unwrap();

        assert_eq!(grid.get(coord).map(|r| r.last_size()), Some(0.5));
        // One backend call per invocation, not deduplicated.
        assert_eq!(renderer.scale_calls(), 2);
    }

    #[test]
    fn test_rescale_passes_through_any_factor() {
        let mut grid = grid();
        let mut renderer = RecordingRenderer::new();
        let coord = GridCoord::new(2, 2, 2);

        let handle = grid.place(coord, 0, 1.0, MaterialId(0), &mut renderer).unwrap().handle();
        grid.rescale(coord, -2.0, &mut renderer).unwrap();

        assert_eq!(grid.get(coord).map(|r| r.last_size()), Some(-2.0));
        assert_eq!(renderer.calls.last(), Some(&RenderCall::SetScale(handle, -2.0)));
    }

    #[test]
    fn test_retexture_reapplication_rebinds() {
        let mut grid = grid();
        let mut renderer = RecordingRenderer::new();
        let coord = GridCoord::new(3, 3, 3);

        let handle = grid.place(coord, 0, 1.0, MaterialId(1), &mut renderer).unwrap().handle();
        grid.retexture(coord, MaterialId(1), &mut renderer).unwrap();

        assert_eq!(grid.get(coord).map(|r| r.material()), Some(MaterialId(1)));
        assert_eq!(
            renderer.calls.last(),
            Some(&RenderCall::SetMaterial(handle, MaterialId(1)))
        );
    }

    #[test]
    fn test_retexture_missing_target() {
        let mut grid = grid();
        let mut renderer = RecordingRenderer::new();
        assert_eq!(
            grid.retexture(GridCoord::new(0, 0, 0), MaterialId(2), &mut renderer),
            Err(GridError::NotFound)
        );
    }
}
