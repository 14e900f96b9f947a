//resolver.rs

use std::collections::HashMap;
use glam::Vec3;
use rayon::prelude::*;
use crate::common::{ParametricPoint, Triangle};
use crate::graph::Graph;

/// Evaluated positions for every distinct point referenced by a triangle list.
///
/// Points are numbered in first-seen order, walking triangles then corners, and the
/// field is evaluated exactly once per distinct point. A lookup lives for a single
/// generation pass; faceted and smooth assembly each build their own.
pub struct VertexLookup {
    indices: HashMap<ParametricPoint, u32>,
    points: Vec<ParametricPoint>,
    positions: Vec<Vec3>,
}

impl VertexLookup {
    pub fn build(graph: &Graph, triangles: &[Triangle]) -> Self {
        let mut indices = HashMap::with_capacity(triangles.len());
        let mut points = Vec::with_capacity(triangles.len());

        for p in triangles.iter().flat_map(|t| t.points) {
            indices.entry(p).or_insert_with(|| {
                points.push(p);
                (points.len() - 1) as u32
            });
        }

        // order preserving, so results do not depend on scheduling
        let positions = points.par_iter().map(|&p| graph.eval(p)).collect();

        Self { indices, points, positions }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn index_of(&self, p: ParametricPoint) -> Option<u32> {
        self.indices.get(&p).copied()
    }

    pub fn position(&self, p: ParametricPoint) -> Option<Vec3> {
        self.index_of(p).map(|i| self.positions[i as usize])
    }

    pub fn points(&self) -> &[ParametricPoint] {
        &self.points
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Corner indices of a triangle, in winding order.
    pub(crate) fn triangle_indices(&self, triangle: &Triangle) -> [u32; 3] {
        triangle.points.map(|p| self.indices[&p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{GradientPull, SamplingStrategy, UniformGrid};
    use glam::Vec2;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_graph() -> (Graph, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let graph = Graph::new(move |p: Vec2| {
            counter.fetch_add(1, Ordering::Relaxed);
            (p.x * 3.0).cos() * p.y
        });
        (graph, calls)
    }

    #[test]
    fn each_distinct_point_is_evaluated_once() {
        let (graph, calls) = counting_graph();
        let triangles = UniformGrid::new(8).unwrap().generate_triangles(&graph).unwrap();
        let distinct: HashSet<_> = triangles.iter().flat_map(|t| t.points).collect();

        let lookup = VertexLookup::build(&graph, &triangles);
        assert_eq!(lookup.len(), 81);
        assert_eq!(distinct.len(), 81);
        assert_eq!(calls.load(Ordering::Relaxed), 81);
    }

    #[test]
    fn first_seen_order() {
        let graph = Graph::new(|_| 0.0);
        let triangles = UniformGrid::new(1).unwrap().generate_triangles(&graph).unwrap();
        let lookup = VertexLookup::build(&graph, &triangles);

        let [a, b, c] = triangles[0].points;
        let d = triangles[1].points[2];
        assert_eq!(lookup.points(), &[a, b, c, d]);
        assert_eq!(lookup.triangle_indices(&triangles[1]), [0, 2, 3]);
    }

    #[test]
    fn positions_match_direct_evaluation() {
        let (graph, _) = counting_graph();
        let strategy = GradientPull::new(5).unwrap();
        let triangles = strategy.generate_triangles(&graph).unwrap();
        let lookup = VertexLookup::build(&graph, &triangles);

        for &p in lookup.points() {
            assert_eq!(lookup.position(p), Some(graph.eval(p)));
        }
        assert_eq!(lookup.position(ParametricPoint::new(3.0, 3.0)), None);
    }
}
