//! Height-field graphs: a scalar field over a bounded XZ rectangle, plus an optional colouring.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assembler;
use crate::common::{Bounds, Mesh, ParametricPoint};
use crate::error::MeshError;
use crate::strategy::SamplingStrategy;

pub type ScalarField = dyn Fn(Vec2) -> f32 + Send + Sync;
pub type ColourField = dyn Fn(Vec3) -> Vec3 + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Shading {
    #[default]
    Faceted,
    Smooth,
}

pub struct Graph {
    field: Box<ScalarField>,
    colouring: Option<Box<ColourField>>,
    bounds: Bounds,
}

impl Graph {
    pub fn new(field: impl Fn(Vec2) -> f32 + Send + Sync + 'static) -> Self {
        Self {
            field: Box::new(field),
            colouring: None,
            bounds: Bounds::default(),
        }
    }

    pub fn with_bounds(mut self, min: Vec2, max: Vec2) -> Self {
        self.bounds = Bounds::new(min, max);
        self
    }

    pub fn with_colouring(mut self, colouring: impl Fn(Vec3) -> Vec3 + Send + Sync + 'static) -> Self {
        self.colouring = Some(Box::new(colouring));
        self
    }

    /// World position of a parametric point: bounds-mapped XZ with the field value as Y.
    pub fn eval(&self, p: ParametricPoint) -> Vec3 {
        let pos = self.bounds.map(p);
        Vec3::new(pos.x, (self.field)(pos), pos.y)
    }

    pub fn elevation(&self, p: ParametricPoint) -> f32 {
        (self.field)(self.bounds.map(p))
    }

    pub fn colour_at(&self, position: Vec3) -> Vec3 {
        match &self.colouring {
            Some(colouring) => colouring(position),
            None => Vec3::ONE,
        }
    }

    pub fn faceted_mesh(&self, strategy: &dyn SamplingStrategy) -> Result<Mesh, MeshError> {
        self.mesh(strategy, Shading::Faceted)
    }

    pub fn smooth_mesh(&self, strategy: &dyn SamplingStrategy) -> Result<Mesh, MeshError> {
        self.mesh(strategy, Shading::Smooth)
    }

    pub fn mesh(&self, strategy: &dyn SamplingStrategy, shading: Shading) -> Result<Mesh, MeshError> {
        let triangles = strategy.generate_triangles(self)?;
        let mesh = match shading {
            Shading::Faceted => assembler::assemble_faceted(self, &triangles),
            Shading::Smooth => assembler::assemble_smooth(self, &triangles),
        };

        debug!(
            strategy = strategy.name(),
            resolution = strategy.resolution(),
            ?shading,
            triangles = triangles.len(),
            vertices = mesh.vertex_count(),
            "generated graph mesh"
        );
        Ok(mesh)
    }
}
