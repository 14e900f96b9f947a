//primitives.rs

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};
use glam::{Vec2, Vec3};
use tracing::trace;
use crate::common::Mesh;
use crate::error::MeshError;

pub const MIN_SIDES: u32 = 3;
pub const MIN_ICOSPHERE_RESOLUTION: u32 = 1;
pub const MIN_UV_SPHERE_COLUMNS: u32 = 3;
pub const MIN_UV_SPHERE_ROWS: u32 = 1;

// every primitive fits a unit box centred on the origin
const RADIUS: f32 = 0.5;
const HALF_HEIGHT: f32 = 0.5;

fn require(shape: &'static str, detail: u32, min: u32) -> Result<(), MeshError> {
    if detail < min {
        return Err(MeshError::InvalidDetail { shape, detail, min });
    }
    Ok(())
}

// point on the unit circle, x = sin, z = cos
fn ring(i: f32, segments: u32) -> (f32, f32) {
    let theta = i / segments as f32 * TAU;
    (theta.sin(), theta.cos())
}

#[derive(Default)]
struct MeshBuilder {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            uvs: Vec::new(),
            indices: Vec::with_capacity(triangles * 3),
        }
    }

    fn vertex(&mut self, pos: Vec3, normal: Vec3) -> u32 {
        self.positions.push(pos);
        self.normals.push(normal);
        (self.positions.len() - 1) as u32
    }

    fn textured(&mut self, pos: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        self.uvs.push(uv);
        self.vertex(pos, normal)
    }

    fn tri(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    fn build(self) -> Mesh {
        let count = self.positions.len();
        let uvs = (!self.uvs.is_empty()).then_some(self.uvs);
        Mesh {
            positions: self.positions,
            normals: self.normals,
            colours: Some(vec![Vec3::ONE; count]),
            uvs,
            indices: self.indices,
        }
    }
}

/// Unit-sphere vertices and triangle faces of a subdivided icosahedron.
#[derive(Clone, Debug, PartialEq)]
pub struct IcosphereTopology {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
}

pub struct MeshGen;

impl MeshGen {

    // --- CONE ---

    /// Base at y = -0.5, apex at y = +0.5.
    ///
    /// Each side segment has its own apex vertex with a mid-angle normal, so the lighting
    /// seam at the tip follows the faces instead of collapsing to one direction.
    pub fn cone(detail: u32) -> Result<Mesh, MeshError> {
        require("cone", detail, MIN_SIDES)?;

        let n = detail as usize;
        let mut mesh = MeshBuilder::with_capacity(3 * n + 1, 2 * n);
        let base_y = -HALF_HEIGHT;

        let side: Vec<u32> = (0..detail)
            .map(|i| {
                let (s, c) = ring(i as f32, detail);
                let pos = Vec3::new(s * RADIUS, base_y, c * RADIUS);
                mesh.vertex(pos, Vec3::new(s, 0.5, c).normalize())
            })
            .collect();

        let apex: Vec<u32> = (0..detail)
            .map(|i| {
                let (s, c) = ring(i as f32 + 0.5, detail);
                mesh.vertex(Vec3::new(0.0, HALF_HEIGHT, 0.0), Vec3::new(s, 0.5, c).normalize())
            })
            .collect();

        let base: Vec<u32> = (0..detail)
            .map(|i| {
                let (s, c) = ring(i as f32, detail);
                mesh.vertex(Vec3::new(s * RADIUS, base_y, c * RADIUS), Vec3::NEG_Y)
            })
            .collect();
        let centre = mesh.vertex(Vec3::new(0.0, base_y, 0.0), Vec3::NEG_Y);

        for i in 0..n {
            let next = (i + 1) % n;
            mesh.tri(apex[i], side[i], side[next]);
            mesh.tri(centre, base[next], base[i]);
        }

        trace!(detail, "built cone");
        Ok(mesh.build())
    }

    // --- CYLINDER ---

    pub fn cylinder(detail: u32) -> Result<Mesh, MeshError> {
        require("cylinder", detail, MIN_SIDES)?;

        let n = detail as usize;
        let mut mesh = MeshBuilder::with_capacity(4 * n + 2, 4 * n);
        let (top_y, bottom_y) = (HALF_HEIGHT, -HALF_HEIGHT);

        let mut side_top = Vec::with_capacity(n);
        let mut side_bottom = Vec::with_capacity(n);
        let mut cap_top = Vec::with_capacity(n);
        let mut cap_bottom = Vec::with_capacity(n);

        for i in 0..detail {
            let (s, c) = ring(i as f32, detail);
            let radial = Vec3::new(s, 0.0, c);
            let (x, z) = (s * RADIUS, c * RADIUS);

            side_top.push(mesh.vertex(Vec3::new(x, top_y, z), radial));
            side_bottom.push(mesh.vertex(Vec3::new(x, bottom_y, z), radial));
            cap_top.push(mesh.vertex(Vec3::new(x, top_y, z), Vec3::Y));
            cap_bottom.push(mesh.vertex(Vec3::new(x, bottom_y, z), Vec3::NEG_Y));
        }

        let top_centre = mesh.vertex(Vec3::new(0.0, top_y, 0.0), Vec3::Y);
        let bottom_centre = mesh.vertex(Vec3::new(0.0, bottom_y, 0.0), Vec3::NEG_Y);

        for i in 0..n {
            let next = (i + 1) % n;
            mesh.tri(side_top[i], side_bottom[i], side_bottom[next]);
            mesh.tri(side_top[i], side_bottom[next], side_top[next]);
            mesh.tri(top_centre, cap_top[i], cap_top[next]);
            mesh.tri(bottom_centre, cap_bottom[next], cap_bottom[i]);
        }

        trace!(detail, "built cylinder");
        Ok(mesh.build())
    }

    // --- PYRAMID ---

    /// Flat-shaded: every side face owns its three vertices.
    pub fn pyramid(sides: u32) -> Result<Mesh, MeshError> {
        require("pyramid", sides, MIN_SIDES)?;

        let n = sides as usize;
        let mut mesh = MeshBuilder::with_capacity(4 * n + 1, 2 * n);
        let base_y = -HALF_HEIGHT;
        let apex = Vec3::new(0.0, HALF_HEIGHT, 0.0);
        let corner = |i: u32| {
            let (s, c) = ring(i as f32, sides);
            Vec3::new(s * RADIUS, base_y, c * RADIUS)
        };

        for i in 0..sides {
            let (left, right) = (corner(i), corner((i + 1) % sides));
            let normal = (left - apex).cross(right - apex).normalize();

            let a = mesh.vertex(apex, normal);
            let b = mesh.vertex(left, normal);
            let c = mesh.vertex(right, normal);
            mesh.tri(a, b, c);
        }

        let base: Vec<u32> = (0..sides).map(|i| mesh.vertex(corner(i), Vec3::NEG_Y)).collect();
        let centre = mesh.vertex(Vec3::new(0.0, base_y, 0.0), Vec3::NEG_Y);
        for i in 0..n {
            mesh.tri(centre, base[(i + 1) % n], base[i]);
        }

        trace!(sides, "built pyramid");
        Ok(mesh.build())
    }

    // --- ICOSPHERE ---

    /// `resolution - 1` subdivision steps of a regular icosahedron, on the unit sphere.
    pub fn icosphere_topology(resolution: u32) -> Result<IcosphereTopology, MeshError> {
        require("icosphere", resolution, MIN_ICOSPHERE_RESOLUTION)?;

        let t = (1.0 + 5f32.sqrt()) / 2.0;
        let mut vertices: Vec<Vec3> = [
            (-1.0, t, 0.0), (1.0, t, 0.0), (-1.0, -t, 0.0), (1.0, -t, 0.0),
            (0.0, -1.0, t), (0.0, 1.0, t), (0.0, -1.0, -t), (0.0, 1.0, -t),
            (t, 0.0, -1.0), (t, 0.0, 1.0), (-t, 0.0, -1.0), (-t, 0.0, 1.0),
        ]
        .iter()
        .map(|&(x, y, z)| Vec3::new(x, y, z).normalize())
        .collect();

        let mut faces: Vec<[u32; 3]> = vec![
            [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
            [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
            [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
            [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
        ];

        for _ in 1..resolution {
            // one midpoint per edge, shared by both adjacent faces
            let mut midpoints: HashMap<(u32, u32), u32> = HashMap::with_capacity(faces.len() * 3 / 2);
            let mut midpoint = |a: u32, b: u32| {
                let key = (a.min(b), a.max(b));
                *midpoints.entry(key).or_insert_with(|| {
                    vertices.push((vertices[a as usize] + vertices[b as usize]).normalize());
                    (vertices.len() - 1) as u32
                })
            };

            let mut next = Vec::with_capacity(faces.len() * 4);
            for &[f0, f1, f2] in &faces {
                let m01 = midpoint(f0, f1);
                let m02 = midpoint(f0, f2);
                let m12 = midpoint(f1, f2);

                next.push([f0, m01, m02]);
                next.push([f2, m02, m12]);
                next.push([m01, f1, m12]);
                next.push([m12, m02, m01]);
            }
            faces = next;
        }

        Ok(IcosphereTopology { vertices, faces })
    }

    pub fn icosphere(resolution: u32) -> Result<Mesh, MeshError> {
        let topology = Self::icosphere_topology(resolution)?;
        let mut mesh = MeshBuilder::with_capacity(topology.vertices.len(), topology.faces.len());

        for &unit in &topology.vertices {
            mesh.vertex(unit * RADIUS, unit);
        }
        for &[a, b, c] in &topology.faces {
            mesh.tri(a, b, c);
        }

        trace!(resolution, faces = topology.faces.len(), "built icosphere");
        Ok(mesh.build())
    }

    // --- UV SPHERE ---

    /// Latitude/longitude sphere with `rows` rings between the poles.
    ///
    /// Each ring repeats its first column at `u = 1` for the texture seam, and each pole
    /// has one vertex per column so its UV sits under that column.
    pub fn uv_sphere(columns: u32, rows: u32) -> Result<Mesh, MeshError> {
        require("uv sphere columns", columns, MIN_UV_SPHERE_COLUMNS)?;
        require("uv sphere rows", rows, MIN_UV_SPHERE_ROWS)?;

        let (w, h) = (columns, rows);
        let stride = w + 1;
        let mut mesh = MeshBuilder::with_capacity(((w + 1) * h + 2 * w) as usize, (2 * w * h) as usize);

        for yt in 0..h {
            let lat = (yt + 1) as f32 / (h + 1) as f32;
            let (y, r) = ((lat * PI).cos(), (lat * PI).sin());
            for xt in 0..=w {
                let lon = xt as f32 / w as f32;
                let unit = Vec3::new(r * (lon * TAU).sin(), y, r * (lon * TAU).cos()).normalize();
                mesh.textured(unit * RADIUS, unit, Vec2::new(lon, lat));
            }
        }

        for i in 0..w {
            let u = (i as f32 + 0.5) / w as f32;
            mesh.textured(Vec3::Y * RADIUS, Vec3::Y, Vec2::new(u, 0.0));
            mesh.textured(Vec3::NEG_Y * RADIUS, Vec3::NEG_Y, Vec2::new(u, 1.0));
        }

        let at = |y: u32, x: u32| y * stride + x;
        let top = |x: u32| stride * h + 2 * x;

        for y in 0..h - 1 {
            for x in 0..w {
                let (a, b) = (at(y, x), at(y, x + 1));
                let (c, d) = (at(y + 1, x), at(y + 1, x + 1));
                mesh.tri(c, b, a);
                mesh.tri(b, c, d);
            }
        }

        let last = h - 1;
        for x in 0..w {
            mesh.tri(top(x), at(0, x), at(0, x + 1));
            mesh.tri(top(x) + 1, at(last, x + 1), at(last, x));
        }

        trace!(columns, rows, "built uv sphere");
        Ok(mesh.build())
    }

    // --- BOX ---

    /// Unit cube, four vertices per face, UVs laid out as an unfolded cross on a 4x3 atlas.
    pub fn box_mesh() -> Mesh {
        // (normal, u axis, v axis, atlas tile); u x v == normal
        let faces = [
            (Vec3::Y, Vec3::X, Vec3::NEG_Z, Vec2::new(1.0, 0.0)),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y, Vec2::new(0.0, 1.0)),
            (Vec3::Z, Vec3::X, Vec3::Y, Vec2::new(1.0, 1.0)),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y, Vec2::new(2.0, 1.0)),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y, Vec2::new(3.0, 1.0)),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z, Vec2::new(1.0, 2.0)),
        ];
        let tile = Vec2::new(0.25, 1.0 / 3.0);
        let corners = [Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)];

        let mut mesh = MeshBuilder::with_capacity(24, 12);
        for (normal, u, v, cell) in faces {
            let quad = corners.map(|k| {
                let pos = (normal + u * k.x + v * k.y) * 0.5;
                // image v runs downwards
                let local = Vec2::new(k.x + 1.0, 1.0 - k.y) * 0.5;
                mesh.textured(pos, normal, (cell + local) * tile)
            });
            mesh.tri(quad[0], quad[1], quad[2]);
            mesh.tri(quad[0], quad[2], quad[3]);
        }

        mesh.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward(mesh: &Mesh) {
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.positions[i as usize]);
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle {tri:?} faces inwards");
        }
    }

    fn assert_well_formed(mesh: &Mesh) {
        assert_eq!(mesh.validate(), Ok(()));
        for n in &mesh.normals {
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
        for p in &mesh.positions {
            assert!(p.abs().max_element() <= 0.5 + 1e-6, "{p} outside unit box");
        }
    }

    #[test]
    fn low_detail_is_rejected() {
        for detail in 0..MIN_SIDES {
            assert_eq!(
                MeshGen::cone(detail),
                Err(MeshError::InvalidDetail { shape: "cone", detail, min: 3 })
            );
            assert!(MeshGen::cylinder(detail).unwrap_err().is_invalid_argument());
            assert!(MeshGen::pyramid(detail).unwrap_err().is_invalid_argument());
            assert!(MeshGen::uv_sphere(detail, 4).is_err());
        }
        assert!(MeshGen::icosphere(0).is_err());
        assert!(MeshGen::uv_sphere(8, 0).is_err());
    }

    #[test]
    fn cone_layout() {
        for detail in [3, 7, 64] {
            let mesh = MeshGen::cone(detail).unwrap();
            let n = detail as usize;
            assert_eq!(mesh.vertex_count(), 3 * n + 1);
            assert_eq!(mesh.triangle_count(), 2 * n);
            assert_well_formed(&mesh);
            assert_outward(&mesh);
        }
    }

    #[test]
    fn cylinder_layout() {
        for detail in [3, 12, 100] {
            let mesh = MeshGen::cylinder(detail).unwrap();
            let n = detail as usize;
            assert_eq!(mesh.vertex_count(), 4 * n + 2);
            assert_eq!(mesh.triangle_count(), 4 * n);
            assert_well_formed(&mesh);
            assert_outward(&mesh);
        }
    }

    #[test]
    fn pyramid_faces_are_flat() {
        let mesh = MeshGen::pyramid(4).unwrap();
        assert_eq!(mesh.vertex_count(), 17);
        assert_eq!(mesh.triangle_count(), 8);
        assert_well_formed(&mesh);
        assert_outward(&mesh);

        for face in mesh.normals[..12].chunks(3) {
            assert_eq!(face[0], face[1]);
            assert_eq!(face[0], face[2]);
        }
    }

    #[test]
    fn icosphere_growth() {
        for resolution in 1..=5u32 {
            let topology = MeshGen::icosphere_topology(resolution).unwrap();
            let steps = resolution - 1;
            assert_eq!(topology.faces.len(), 20 * 4usize.pow(steps));
            assert_eq!(topology.vertices.len(), 10 * 4usize.pow(steps) + 2);
            for v in &topology.vertices {
                assert!((v.length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn icosphere_mesh() {
        let mesh = MeshGen::icosphere(3).unwrap();
        assert_eq!(mesh.triangle_count(), 320);
        assert_well_formed(&mesh);
        assert_outward(&mesh);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert!((*p * 2.0 - *n).length() < 1e-6);
        }
    }

    #[test]
    fn uv_sphere_layout() {
        let (w, h) = (8u32, 5u32);
        let mesh = MeshGen::uv_sphere(w, h).unwrap();
        assert_eq!(mesh.vertex_count(), ((w + 1) * h + 2 * w) as usize);
        assert_eq!(mesh.triangle_count(), (2 * w * h) as usize);
        assert_eq!(mesh.uvs.as_ref().map(Vec::len), Some(mesh.vertex_count()));
        assert_well_formed(&mesh);
        assert_outward(&mesh);

        let single_ring = MeshGen::uv_sphere(3, 1).unwrap();
        assert_eq!(single_ring.triangle_count(), 6);
        assert_outward(&single_ring);
    }

    #[test]
    fn box_layout() {
        let mesh = MeshGen::box_mesh();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_well_formed(&mesh);
        assert_outward(&mesh);

        for uv in mesh.uvs.as_ref().unwrap() {
            assert!((0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y));
        }
    }

    #[test]
    fn primitives_are_white_without_uvs() {
        let mesh = MeshGen::cylinder(5).unwrap();
        assert!(mesh.uvs.is_none());
        assert!(mesh.colours.unwrap().iter().all(|&c| c == Vec3::ONE));
    }
}
