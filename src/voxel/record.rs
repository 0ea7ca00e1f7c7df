//! Per-voxel attribute record.

use crate::render::{MaterialId, RenderableHandle};

/// Attribute bundle for one placed voxel.
///
/// Pure value holder; all mutation happens through the grid operations or,
/// for `age` and `affector_value`, through an external update collaborator.
/// No validation is performed on `voxel_type` or `weight` — any value is
/// accepted.
#[derive(Clone, Copy, Debug)]
pub struct VoxelRecord {
    /// Non-owning foreign key into the render backend.
    handle: RenderableHandle,
    /// Ticks since creation. Advanced externally; never driven here.
    age: u32,
    /// Material/behavior class tag.
    voxel_type: i32,
    /// Last scale applied by a rescale request.
    last_size: f32,
    /// Set at creation, intended for physical simulation.
    weight: f32,
    /// Scratch value for an external per-voxel simulation.
    affector_value: f32,
    /// Material currently bound to the renderable.
    material: MaterialId,
}

impl VoxelRecord {
    /// New record: age 0, scale 1.0, affector value 0.
    pub fn new(handle: RenderableHandle, voxel_type: i32, weight: f32, material: MaterialId) -> Self {
        Self {
            handle,
            age: 0,
            voxel_type,
            last_size: 1.0,
            weight,
            affector_value: 0.0,
            material,
        }
    }

    pub fn handle(&self) -> RenderableHandle {
        self.handle
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn set_age(&mut self, age: u32) {
        self.age = age;
    }

    pub fn voxel_type(&self) -> i32 {
        self.voxel_type
    }

    pub fn set_voxel_type(&mut self, voxel_type: i32) {
        self.voxel_type = voxel_type;
    }

    pub fn last_size(&self) -> f32 {
        self.last_size
    }

    pub(crate) fn set_last_size(&mut self, size: f32) {
        self.last_size = size;
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    pub fn affector_value(&self) -> f32 {
        self.affector_value
    }

    pub fn set_affector_value(&mut self, value: f32) {
        self.affector_value = value;
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub(crate) fn set_material(&mut self, material: MaterialId) {
        self.material = material;
    }
}
