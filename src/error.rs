//! Error types for mesh generation, upload, configuration and rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while generating or validating a mesh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// A primitive generator was asked for fewer segments than it can close.
    #[error("detail is too low for {shape} construction ({detail}, minimum {min})")]
    InvalidDetail {
        shape: &'static str,
        detail: u32,
        min: u32,
    },

    /// A sampling strategy was built with a resolution it cannot triangulate.
    #[error("sampling resolution must be at least {min} (got {resolution})")]
    InvalidResolution { resolution: u32, min: u32 },

    /// The lattice would need more vertices or indices than a `u32` index buffer can address.
    #[error("sampling resolution {resolution} exceeds the maximum of {max}")]
    ResolutionTooLarge { resolution: u32, max: u32 },

    #[error("{attribute} has {actual} entries but the mesh has {expected} positions")]
    AttributeLength {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("index {index} at offset {offset} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        offset: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),
}

impl MeshError {
    /// True for errors caused by bad construction parameters rather than bad mesh data.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            MeshError::InvalidDetail { .. }
                | MeshError::InvalidResolution { .. }
                | MeshError::ResolutionTooLarge { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create window surface")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter found")]
    NoAdapter,

    #[error("failed to acquire graphics device")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by the selected adapter")]
    UnsupportedSurface,

    #[error("graphics device ran out of memory")]
    OutOfMemory,
}
