//common.rs

use std::hash::{Hash, Hasher};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use crate::error::MeshError;

// --- PARAMETRIC SPACE ---

/// A sample location in the normalized [-0.5, 0.5] square.
///
/// Equality and hashing compare the raw bits of both coordinates, so `0.0` and `-0.0`
/// are different points. Two points are the same mesh vertex only if the strategy
/// produced the exact same floats.
#[derive(Clone, Copy, Debug)]
pub struct ParametricPoint {
    pub u: f32,
    pub v: f32,
}

impl ParametricPoint {
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.u, self.v)
    }

    fn bits(self) -> (u32, u32) {
        (self.u.to_bits(), self.v.to_bits())
    }
}

impl PartialEq for ParametricPoint {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for ParametricPoint {}

impl Hash for ParametricPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

/// Three parametric points in winding order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Triangle {
    pub points: [ParametricPoint; 3],
}

impl Triangle {
    pub const fn new(a: ParametricPoint, b: ParametricPoint, c: ParametricPoint) -> Self {
        Self { points: [a, b, c] }
    }
}

// --- BOUNDS ---

/// World-space rectangle (on the XZ plane) that the parametric square maps onto.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self { min: Vec2::new(-1.0, -1.0), max: Vec2::new(1.0, 1.0) }
    }
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn map(&self, p: ParametricPoint) -> Vec2 {
        self.min + (self.max - self.min) * (p.to_vec2() + Vec2::splat(0.5))
    }
}

// --- MESH ---

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// CPU-side mesh: parallel vertex attributes plus a triangle index list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colours: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks the attribute length, index range and triangle-list invariants.
    pub fn validate(&self) -> Result<(), MeshError> {
        let expected = self.positions.len();
        let check = |attribute: &'static str, actual: usize| {
            if actual == expected {
                Ok(())
            } else {
                Err(MeshError::AttributeLength { attribute, expected, actual })
            }
        };

        check("normals", self.normals.len())?;
        if let Some(colours) = &self.colours {
            check("colours", colours.len())?;
        }
        if let Some(uvs) = &self.uvs {
            check("uvs", uvs.len())?;
        }

        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle(self.indices.len()));
        }

        if let Some(offset) = self.indices.iter().position(|&i| i as usize >= expected) {
            let index = self.indices[offset];
            return Err(MeshError::IndexOutOfRange { offset, index, vertex_count: expected });
        }

        Ok(())
    }

    /// Interleaves the attributes for upload. Missing colours default to white, missing UVs to zero.
    pub fn to_vertices(&self) -> Vec<Vertex> {
        (0..self.positions.len())
            .map(|i| Vertex {
                pos: self.positions[i].to_array(),
                color: self.colours.as_ref().map_or([1.0; 3], |c| c[i].to_array()),
                normal: self.normals[i].to_array(),
                uv: self.uvs.as_ref().map_or([0.0; 2], |uv| uv[i].to_array()),
            })
            .collect()
    }
}
