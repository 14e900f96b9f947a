//! Boundary between CPU meshes and whatever owns drawable GPU resources.

use crate::common::Mesh;
use crate::error::MeshError;

/// A drawable produced by a [`MeshUpload`]. Released explicitly, exactly once.
pub trait MeshHandle {
    fn vertex_count(&self) -> u32;

    fn index_count(&self) -> u32;

    fn destroy(self);
}

pub trait MeshUpload {
    type Handle: MeshHandle;

    /// Validates `mesh` and copies it into a new handle. The mesh is not retained.
    fn upload(&mut self, mesh: &Mesh) -> Result<Self::Handle, MeshError>;
}
