//! Hit-test dispatch: turns resolved pointer events into grid operations.
//!
//! The dispatch method takes an already-resolved `(action, hit)` pair, so
//! the policy is independent of whether the pair came from a mouse, touch,
//! or a scripted test. Drags arrive as one call per movement sample; each
//! call is an independent, idempotence-checked operation.

use std::time::Instant;

use log::{debug, warn};

use crate::core::types::Vec3;
use crate::render::{MaterialId, MaterialPicker, RenderBackend, RenderableHandle};
use crate::voxel::grid::{GridCoord, GridError, VoxelGrid};
use super::config::EditorConfig;

/// Resolved pointer action, independent of the input device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerAction {
    /// Left button / first press: place a voxel.
    Primary,
    /// Right button: remove a voxel.
    Secondary,
}

/// Result of casting a ray into the scene, produced by the excluded
/// camera/viewport collaborator.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    /// World-space hit point.
    pub position: Vec3,
    /// Handle of the voxel struck, if the ray hit one.
    pub handle: Option<RenderableHandle>,
}

/// What a dispatch call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Placed(GridCoord),
    Removed(GridCoord),
    /// Nothing to do: ray miss, out of bounds, occupied cell, stale
    /// handle, or a debounced repeat.
    NoOp,
}

/// Owns the grid, the current material selection, and the dispatch policy.
pub struct Editor {
    grid: VoxelGrid,
    config: EditorConfig,
    current_material: MaterialId,
    /// Cell and time of the last applied action, for the repeat debounce.
    last_action: Option<(GridCoord, Instant)>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let grid = VoxelGrid::new(config.grid_extent, config.voxel_size)
            .with_snap_step(config.snap_step);
        let current_material = config.default_material;
        Self {
            grid,
            config,
            current_material,
            last_action: None,
        }
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut VoxelGrid {
        &mut self.grid
    }

    pub fn current_material(&self) -> MaterialId {
        self.current_material
    }

    /// Prompt the picker for a material; a cancelled pick keeps the
    /// current selection.
    pub fn pick_material(&mut self, picker: &mut dyn MaterialPicker) -> MaterialId {
        if let Some(material) = picker.select_material() {
            self.current_material = material;
        }
        self.current_material
    }

    /// Apply one resolved pointer event to the grid.
    ///
    /// Primary places at the free cell nearest the hit point and never
    /// replaces; secondary removes the hit voxel. Grid errors are policy,
    /// not failures: out-of-bounds and stale targets are ignored, an
    /// occupied cell is surfaced as a non-blocking notice. All of them
    /// yield [`EditOutcome::NoOp`].
    pub fn dispatch(
        &mut self,
        action: PointerAction,
        hit: Option<RayHit>,
        renderer: &mut dyn RenderBackend,
    ) -> EditOutcome {
        let Some(hit) = hit else {
            return EditOutcome::NoOp;
        };

        match action {
            PointerAction::Primary => {
                // Place only resolves against empty space.
                if hit.handle.is_some() {
                    return EditOutcome::NoOp;
                }
                let coord = self.grid.resolve_cell(hit.position);
                if self.debounced(coord) {
                    return EditOutcome::NoOp;
                }
                match self.grid.place(
                    coord,
                    self.config.default_voxel_type,
                    self.config.default_weight,
                    self.current_material,
                    renderer,
                ) {
                    Ok(_) => {
                        self.note_action(coord);
                        EditOutcome::Placed(coord)
                    }
                    Err(err @ GridError::AlreadyOccupied(_)) => {
                        warn!("place ignored: {err}");
                        EditOutcome::NoOp
                    }
                    Err(err) => {
                        debug!("place ignored: {err}");
                        EditOutcome::NoOp
                    }
                }
            }
            PointerAction::Secondary => {
                let Some(handle) = hit.handle else {
                    return EditOutcome::NoOp;
                };
                let Some(coord) = self.grid.coord_of(handle) else {
                    debug!("remove ignored: unknown renderable {handle:?}");
                    return EditOutcome::NoOp;
                };
                if self.debounced(coord) {
                    return EditOutcome::NoOp;
                }
                match self.grid.remove(handle, renderer) {
                    Ok(()) => {
                        self.note_action(coord);
                        EditOutcome::Removed(coord)
                    }
                    Err(err) => {
                        debug!("remove ignored: {err}");
                        EditOutcome::NoOp
                    }
                }
            }
        }
    }

    /// Whether an action on `coord` falls inside the repeat interval.
    /// Suppressed repeats do not refresh the timestamp.
    fn debounced(&self, coord: GridCoord) -> bool {
        if self.config.min_repeat_interval.is_zero() {
            return false;
        }
        matches!(
            self.last_action,
            Some((last, at)) if last == coord && at.elapsed() < self.config.min_repeat_interval
        )
    }

    fn note_action(&mut self, coord: GridCoord) {
        self.last_action = Some((coord, Instant::now()));
    }
}
