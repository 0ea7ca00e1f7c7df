//! Rendering collaborator interface.
//!
//! The grid never talks to an engine directly; it issues create/destroy/
//! update requests through [`RenderBackend`] and holds only opaque handles.
//! The backend owns renderable lifetime.

use crate::core::types::Vec3;

/// Opaque handle to a backend-owned drawable unit cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderableHandle(pub u64);

/// Identifier of a texture/material known to the render backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MaterialId(pub u32);

/// Requests the grid makes of the rendering layer.
///
/// Implementations must keep handles valid until `destroy_renderable`;
/// the grid guarantees it never uses a handle after requesting destruction.
pub trait RenderBackend {
    /// Instantiate a displayable unit cube at a world position.
    fn create_renderable(&mut self, position: Vec3, material: MaterialId) -> RenderableHandle;

    /// Remove a displayable unit cube.
    fn destroy_renderable(&mut self, handle: RenderableHandle);

    /// Apply a uniform scale to a renderable.
    fn set_renderable_scale(&mut self, handle: RenderableHandle, scale: f32);

    /// Bind a material to a renderable.
    fn set_renderable_material(&mut self, handle: RenderableHandle, material: MaterialId);
}

/// Material selection collaborator (file dialog or similar).
pub trait MaterialPicker {
    /// Prompt the user for a material. `None` means the pick was cancelled.
    fn select_material(&mut self) -> Option<MaterialId>;
}

/// Backend that allocates sequential handles and logs every request.
///
/// Useful for headless runs and the demo binary; nothing is drawn.
#[derive(Debug, Default)]
pub struct LogRenderer {
    next_handle: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self { next_handle: 0 }
    }
}

impl RenderBackend for LogRenderer {
    fn create_renderable(&mut self, position: Vec3, material: MaterialId) -> RenderableHandle {
        let handle = RenderableHandle(self.next_handle);
        self.next_handle += 1;
        log::debug!("create renderable {:?} at {:?} with {:?}", handle, position, material);
        handle
    }

    fn destroy_renderable(&mut self, handle: RenderableHandle) {
        log::debug!("destroy renderable {:?}", handle);
    }

    fn set_renderable_scale(&mut self, handle: RenderableHandle, scale: f32) {
        log::debug!("scale renderable {:?} to {}", handle, scale);
    }

    fn set_renderable_material(&mut self, handle: RenderableHandle, material: MaterialId) {
        log::debug!("rebind renderable {:?} to {:?}", handle, material);
    }
}
