//strategy.rs

use rayon::prelude::*;
use crate::common::{ParametricPoint, Triangle};
use crate::error::MeshError;
use crate::graph::Graph;

pub const MIN_RESOLUTION: u32 = 1;
// faceted meshes index 6r² vertices, which must stay addressable as u32
pub const MAX_RESOLUTION: u32 = 16384;

// largest parametric displacement of a pulled point, in cells
const MAX_PULL_CELLS: f32 = 0.4;

/// Turns a graph into parametric triangles. Implementations must be deterministic.
pub trait SamplingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolution(&self) -> u32;

    fn generate_triangles(&self, graph: &Graph) -> Result<Vec<Triangle>, MeshError>;
}

fn check_resolution(resolution: u32) -> Result<u32, MeshError> {
    if resolution < MIN_RESOLUTION {
        return Err(MeshError::InvalidResolution { resolution, min: MIN_RESOLUTION });
    }
    if resolution > MAX_RESOLUTION {
        return Err(MeshError::ResolutionTooLarge { resolution, max: MAX_RESOLUTION });
    }
    Ok(resolution)
}

// --- LATTICE ---

/// `(resolution + 1)²` parametric points, stored x-major (`xi * (resolution + 1) + zi`).
#[derive(Clone, Debug, PartialEq)]
pub struct Lattice {
    resolution: u32,
    points: Vec<ParametricPoint>,
}

impl Lattice {
    pub fn uniform(resolution: u32) -> Self {
        let side = resolution + 1;
        let step = |i: u32| i as f32 / resolution as f32 - 0.5;

        let mut points = Vec::with_capacity(side as usize * side as usize);
        for xi in 0..side {
            for zi in 0..side {
                points.push(ParametricPoint::new(step(xi), step(zi)));
            }
        }

        Self { resolution, points }
    }

    pub fn points(&self) -> &[ParametricPoint] {
        &self.points
    }

    fn index(&self, xi: u32, zi: u32) -> usize {
        xi as usize * (self.resolution as usize + 1) + zi as usize
    }

    pub fn get(&self, xi: u32, zi: u32) -> ParametricPoint {
        self.points[self.index(xi, zi)]
    }

    pub fn is_boundary(&self, xi: u32, zi: u32) -> bool {
        xi == 0 || zi == 0 || xi == self.resolution || zi == self.resolution
    }

    /// Two triangles per cell, `(a, b, c)` and `(a, c, d)`, counter-clockwise seen from +Y.
    pub fn triangulate(&self) -> Vec<Triangle> {
        let r = self.resolution;
        let mut triangles = Vec::with_capacity(2 * r as usize * r as usize);

        for xi in 0..r {
            for zi in 0..r {
                let a = self.get(xi, zi);
                let b = self.get(xi, zi + 1);
                let c = self.get(xi + 1, zi + 1);
                let d = self.get(xi + 1, zi);

                triangles.push(Triangle::new(a, b, c));
                triangles.push(Triangle::new(a, c, d));
            }
        }

        triangles
    }
}

// --- UNIFORM GRID ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformGrid {
    resolution: u32,
}

impl UniformGrid {
    pub fn new(resolution: u32) -> Result<Self, MeshError> {
        Ok(Self { resolution: check_resolution(resolution)? })
    }
}

impl SamplingStrategy for UniformGrid {
    fn name(&self) -> &'static str {
        "uniform-grid"
    }

    fn resolution(&self) -> u32 {
        self.resolution
    }

    fn generate_triangles(&self, _graph: &Graph) -> Result<Vec<Triangle>, MeshError> {
        Ok(Lattice::uniform(self.resolution).triangulate())
    }
}

// --- GRADIENT PULL ---

/// Uniform lattice with interior points nudged along the elevation gradient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GradientPull {
    resolution: u32,
}

impl GradientPull {
    pub fn new(resolution: u32) -> Result<Self, MeshError> {
        Ok(Self { resolution: check_resolution(resolution)? })
    }

    pub fn max_pull(&self) -> f32 {
        MAX_PULL_CELLS / self.resolution as f32
    }

    pub fn perturbed_lattice(&self, graph: &Graph) -> Lattice {
        let uniform = Lattice::uniform(self.resolution);
        let r = self.resolution;
        let k = 2.0 / r as f32;
        let max_pull = self.max_pull();

        // one evaluation per lattice point, reused by every neighbour's central difference
        let elevations: Vec<f32> = uniform.points.par_iter().map(|&p| graph.elevation(p)).collect();
        let elevation = |xi: u32, zi: u32| elevations[uniform.index(xi, zi)];
        let pull = |delta: f32| (delta * k).clamp(-max_pull, max_pull);

        let mut points = uniform.points.clone();
        for xi in 1..r {
            for zi in 1..r {
                let grad_x = pull(elevation(xi + 1, zi) - elevation(xi - 1, zi));
                let grad_z = pull(elevation(xi, zi + 1) - elevation(xi, zi - 1));

                let p = uniform.get(xi, zi);
                points[uniform.index(xi, zi)] = ParametricPoint::new(p.u + grad_x, p.v + grad_z);
            }
        }

        Lattice { resolution: r, points }
    }
}

impl SamplingStrategy for GradientPull {
    fn name(&self) -> &'static str {
        "gradient-pull"
    }

    fn resolution(&self) -> u32 {
        self.resolution
    }

    fn generate_triangles(&self, graph: &Graph) -> Result<Vec<Triangle>, MeshError> {
        Ok(self.perturbed_lattice(graph).triangulate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn steep() -> Graph {
        Graph::new(|p: Vec2| 40.0 * p.x * p.x + (p.y * 7.0).sin() * 3.0)
    }

    #[test]
    fn zero_resolution_is_rejected() {
        assert_eq!(UniformGrid::new(0), Err(MeshError::InvalidResolution { resolution: 0, min: 1 }));
        let err = GradientPull::new(0).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn oversized_resolution_is_rejected() {
        assert!(UniformGrid::new(MAX_RESOLUTION).is_ok());
        assert_eq!(
            UniformGrid::new(MAX_RESOLUTION + 1),
            Err(MeshError::ResolutionTooLarge { resolution: MAX_RESOLUTION + 1, max: MAX_RESOLUTION })
        );
        let err = GradientPull::new(u32::MAX).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn uniform_lattice_spans_parametric_square() {
        let lattice = Lattice::uniform(4);
        assert_eq!(lattice.points().len(), 25);
        assert_eq!(lattice.get(0, 0), ParametricPoint::new(-0.5, -0.5));
        assert_eq!(lattice.get(4, 4), ParametricPoint::new(0.5, 0.5));
        assert_eq!(lattice.get(2, 1), ParametricPoint::new(0.0, -0.25));
    }

    #[test]
    fn uniform_grid_emits_two_triangles_per_cell() {
        let graph = Graph::new(|_| 0.0);
        for r in [1, 2, 5, 16] {
            let triangles = UniformGrid::new(r).unwrap().generate_triangles(&graph).unwrap();
            assert_eq!(triangles.len(), 2 * (r * r) as usize);
        }
    }

    #[test]
    fn single_cell_winding() {
        let graph = Graph::new(|_| 0.0);
        let triangles = UniformGrid::new(1).unwrap().generate_triangles(&graph).unwrap();
        let a = ParametricPoint::new(-0.5, -0.5);
        let b = ParametricPoint::new(-0.5, 0.5);
        let c = ParametricPoint::new(0.5, 0.5);
        let d = ParametricPoint::new(0.5, -0.5);
        assert_eq!(triangles, vec![Triangle::new(a, b, c), Triangle::new(a, c, d)]);
    }

    #[test]
    fn gradient_pull_keeps_boundary_fixed() {
        let graph = steep();
        let r = 9;
        let uniform = Lattice::uniform(r);
        let pulled = GradientPull::new(r).unwrap().perturbed_lattice(&graph);

        for xi in 0..=r {
            for zi in 0..=r {
                if pulled.is_boundary(xi, zi) {
                    assert_eq!(pulled.get(xi, zi), uniform.get(xi, zi), "boundary point ({xi}, {zi}) moved");
                }
            }
        }
    }

    #[test]
    fn gradient_pull_is_clamped() {
        let graph = steep();
        let strategy = GradientPull::new(6).unwrap();
        let uniform = Lattice::uniform(6);
        let pulled = strategy.perturbed_lattice(&graph);

        let mut moved = false;
        for (p, q) in uniform.points().iter().zip(pulled.points()) {
            let (du, dv) = ((q.u - p.u).abs(), (q.v - p.v).abs());
            assert!(du <= strategy.max_pull() + 1e-6 && dv <= strategy.max_pull() + 1e-6);
            moved |= du > 0.0 || dv > 0.0;
        }
        assert!(moved);
    }

    #[test]
    fn flat_field_matches_uniform_grid() {
        let graph = Graph::new(|_| 1.5);
        let uniform = UniformGrid::new(7).unwrap().generate_triangles(&graph).unwrap();
        let pulled = GradientPull::new(7).unwrap().generate_triangles(&graph).unwrap();
        assert_eq!(uniform, pulled);
    }

    #[test]
    fn pull_follows_slope_direction() {
        // elevation rises with x, so interior points move toward +u
        let graph = Graph::new(|p: Vec2| p.x * 0.01);
        let pulled = GradientPull::new(4).unwrap().perturbed_lattice(&graph);
        let uniform = Lattice::uniform(4);
        let (p, q) = (uniform.get(2, 2), pulled.get(2, 2));
        assert!(q.u > p.u);
        assert_eq!(q.v, p.v);
    }

    #[test]
    fn pull_is_central_difference_times_two_over_resolution() {
        // default bounds map u to 2u, so neighbours at u ± 0.25 sit 1.0 apart in world x
        let graph = Graph::new(|p: Vec2| p.x * 0.01);
        let pulled = GradientPull::new(4).unwrap().perturbed_lattice(&graph);
        let uniform = Lattice::uniform(4);

        let expected = 0.01 * 1.0 * (2.0 / 4.0);
        for xi in 1..4 {
            for zi in 1..4 {
                let du = pulled.get(xi, zi).u - uniform.get(xi, zi).u;
                assert!((du - expected).abs() < 1e-6, "pull at ({xi}, {zi}) was {du}, expected {expected}");
            }
        }
    }

    #[test]
    fn steep_pull_lands_on_the_clamp() {
        let uniform = Lattice::uniform(4);
        let strategy = GradientPull::new(4).unwrap();

        let rising = strategy.perturbed_lattice(&Graph::new(|p: Vec2| p.x * 100.0));
        assert_eq!(rising.get(2, 2).u - uniform.get(2, 2).u, strategy.max_pull());

        let falling = strategy.perturbed_lattice(&Graph::new(|p: Vec2| p.y * -100.0));
        assert_eq!(falling.get(2, 2).v - uniform.get(2, 2).v, -strategy.max_pull());
        assert_eq!(falling.get(2, 2).u, uniform.get(2, 2).u);
    }
}
