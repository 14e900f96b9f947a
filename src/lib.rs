//! Procedural surface meshes: graphs of scalar fields over the xz plane and a
//! set of closed primitives, with a wgpu viewer on top.

pub mod assembler;
pub mod common;
pub mod config;
pub mod controller;
pub mod demo;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod noise;
pub mod primitives;
pub mod renderer;
pub mod resolver;
pub mod scene;
pub mod strategy;
pub mod transform;
pub mod upload;

pub use common::{Bounds, Mesh, ParametricPoint, Triangle, Vertex};
pub use error::{ConfigError, MeshError, RenderError};
pub use graph::{Graph, Shading};
pub use primitives::MeshGen;
pub use strategy::{GradientPull, SamplingStrategy, UniformGrid};
