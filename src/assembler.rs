//assembler.rs

use glam::{Vec2, Vec3};
use rayon::prelude::*;
use crate::common::{Mesh, Triangle};
use crate::graph::Graph;
use crate::resolver::VertexLookup;

fn face_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    (p1 - p0).cross(p2 - p0)
}

// planar projection onto XZ
fn planar_uv(position: Vec3) -> Vec2 {
    Vec2::new(0.5 + position.x, 0.5 + position.z)
}

/// Three unshared vertices per triangle, each carrying the face normal.
pub fn assemble_faceted(graph: &Graph, triangles: &[Triangle]) -> Mesh {
    let lookup = VertexLookup::build(graph, triangles);
    let count = triangles.len() * 3;

    let mut positions = Vec::with_capacity(count);
    let mut normals = Vec::with_capacity(count);

    for triangle in triangles {
        let [i0, i1, i2] = lookup.triangle_indices(triangle);
        let p = [i0, i1, i2].map(|i| lookup.positions()[i as usize]);
        let normal = face_normal(p[0], p[1], p[2]).normalize();

        positions.extend_from_slice(&p);
        normals.extend_from_slice(&[normal; 3]);
    }

    let colours = positions.iter().map(|&p| graph.colour_at(p)).collect();
    let uvs = positions.iter().map(|&p| planar_uv(p)).collect();

    Mesh {
        positions,
        normals,
        colours: Some(colours),
        uvs: Some(uvs),
        indices: (0..count as u32).collect(),
    }
}

/// Shared vertices in first-seen order. Each vertex normal is the normalized sum of the
/// unnormalized normals of every face touching it.
pub fn assemble_smooth(graph: &Graph, triangles: &[Triangle]) -> Mesh {
    let lookup = VertexLookup::build(graph, triangles);
    let positions = lookup.positions().to_vec();

    let mut normals = vec![Vec3::ZERO; positions.len()];
    let mut indices = Vec::with_capacity(triangles.len() * 3);

    for triangle in triangles {
        let corners = lookup.triangle_indices(triangle);
        let [p0, p1, p2] = corners.map(|i| positions[i as usize]);
        let normal = face_normal(p0, p1, p2);

        for i in corners {
            normals[i as usize] += normal;
        }
        indices.extend_from_slice(&corners);
    }

    normals.par_iter_mut().for_each(|n| *n = n.normalize());

    let colours = positions.iter().map(|&p| graph.colour_at(p)).collect();
    let uvs = positions.iter().map(|&p| planar_uv(p)).collect();

    Mesh {
        positions,
        normals,
        colours: Some(colours),
        uvs: Some(uvs),
        indices,
    }
}
