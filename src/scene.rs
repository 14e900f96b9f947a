//scene.rs

use glam::Vec3;
use crate::common::Mesh;
use crate::error::MeshError;
use crate::transform::Transform;
use crate::upload::{MeshHandle, MeshUpload};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub colour: Vec3,
    pub diffuse: f32,
    pub specular: f32,
    pub specular_power: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self { colour: Vec3::ONE, diffuse: 1.0, specular: 0.0, specular_power: 32.0 }
    }
}

impl Material {
    pub fn with_colour(mut self, colour: Vec3) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_specular(mut self, specular: f32, power: f32) -> Self {
        self.specular = specular;
        self.specular_power = power;
        self
    }
}

pub struct Model<H> {
    pub mesh: H,
    pub transform: Transform,
    pub material: Material,
}

/// Owns every uploaded mesh and releases them together.
pub struct Scene<H: MeshHandle> {
    models: Vec<Model<H>>,
}

impl<H: MeshHandle> Default for Scene<H> {
    fn default() -> Self {
        Self { models: Vec::new() }
    }
}

impl<H: MeshHandle> Scene<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: H, transform: Transform, material: Material) -> usize {
        self.models.push(Model { mesh, transform, material });
        self.models.len() - 1
    }

    /// Uploads `mesh` and adds it. On failure the scene is left unchanged.
    pub fn upload<U>(&mut self, uploader: &mut U, mesh: &Mesh, transform: Transform, material: Material) -> Result<usize, MeshError>
    where
        U: MeshUpload<Handle = H>,
    {
        let handle = uploader.upload(mesh)?;
        Ok(self.add(handle, transform, material))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model<H>> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn triangle_count(&self) -> u32 {
        self.models.iter().map(|m| m.mesh.index_count() / 3).sum()
    }

    pub fn destroy(self) {
        for model in self.models {
            model.mesh.destroy();
        }
    }
}
