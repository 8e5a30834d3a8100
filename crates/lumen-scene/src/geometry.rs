//! CPU-side mesh geometry for node tiers, decoration shells and edges.
//!
//! All shapes are centered at the origin except lines, which are stored in
//! world space between their two endpoints.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex layout shared by every geometry.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Parameters a geometry was generated from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryShape {
    Tetrahedron { radius: f32 },
    Octahedron { radius: f32 },
    Icosahedron { radius: f32 },
    Sphere { radius: f32, width_segments: u32, height_segments: u32 },
    /// Flat annulus lying in the XZ plane.
    Ring { inner_radius: f32, outer_radius: f32, segments: u32 },
    Line { start: Vec3, end: Vec3 },
}

/// Generated vertex and index data plus its bounding radius.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub shape: GeometryShape,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Radius of the smallest origin-centered sphere containing all vertices.
    /// For lines, half their length.
    pub bounding_radius: f32,
}

const TETRA_VERTS: [[f32; 3]; 4] = [[1.0, 1.0, 1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0], [1.0, -1.0, -1.0]];
const TETRA_FACES: [u32; 12] = [2, 1, 0, 0, 3, 2, 1, 3, 0, 2, 3, 1];

const OCTA_VERTS: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];
const OCTA_FACES: [u32; 24] = [0, 2, 4, 0, 4, 3, 0, 3, 5, 0, 5, 2, 1, 2, 5, 1, 5, 3, 1, 3, 4, 1, 4, 2];

const ICOSA_FACES: [u32; 60] = [
    0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1,
    8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
];

fn icosa_verts() -> [[f32; 3]; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ]
}

/// Project polyhedron corners onto a sphere of `radius`.
fn polyhedron(shape: GeometryShape, corners: &[[f32; 3]], faces: &[u32], radius: f32) -> Geometry {
    let vertices = corners
        .iter()
        .map(|c| {
            let n = Vec3::from_array(*c).normalize();
            Vertex {
                position: (n * radius).to_array(),
                normal: n.to_array(),
            }
        })
        .collect();

    Geometry {
        shape,
        vertices,
        indices: faces.to_vec(),
        bounding_radius: radius,
    }
}

impl Geometry {
    /// Build the vertex data described by `shape`.
    pub fn build(shape: GeometryShape) -> Self {
        match shape {
            GeometryShape::Tetrahedron { radius } => polyhedron(shape, &TETRA_VERTS, &TETRA_FACES, radius),
            GeometryShape::Octahedron { radius } => polyhedron(shape, &OCTA_VERTS, &OCTA_FACES, radius),
            GeometryShape::Icosahedron { radius } => polyhedron(shape, &icosa_verts(), &ICOSA_FACES, radius),
            GeometryShape::Sphere {
                radius,
                width_segments,
                height_segments,
            } => Self::sphere(radius, width_segments.max(3), height_segments.max(2)),
            GeometryShape::Ring {
                inner_radius,
                outer_radius,
                segments,
            } => Self::ring(inner_radius, outer_radius, segments.max(3)),
            GeometryShape::Line { start, end } => Self::line(start, end),
        }
    }

    pub fn tetrahedron(radius: f32) -> Self {
        Self::build(GeometryShape::Tetrahedron { radius })
    }

    pub fn octahedron(radius: f32) -> Self {
        Self::build(GeometryShape::Octahedron { radius })
    }

    pub fn icosahedron(radius: f32) -> Self {
        Self::build(GeometryShape::Icosahedron { radius })
    }

    fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let phi = v * std::f32::consts::PI;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let theta = u * std::f32::consts::TAU;
                let n = Vec3::new(-theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());
                vertices.push(Vertex {
                    position: (n * radius).to_array(),
                    normal: n.to_array(),
                });
            }
        }

        let row = width_segments + 1;
        let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                // Pole rows collapse to a point; skip the degenerate triangle.
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self {
            shape: GeometryShape::Sphere {
                radius,
                width_segments,
                height_segments,
            },
            vertices,
            indices,
            bounding_radius: radius,
        }
    }

    fn ring(inner_radius: f32, outer_radius: f32, segments: u32) -> Self {
        let mut vertices = Vec::with_capacity(((segments + 1) * 2) as usize);
        for i in 0..=segments {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            let (sin, cos) = angle.sin_cos();
            for r in [inner_radius, outer_radius] {
                vertices.push(Vertex {
                    position: [cos * r, 0.0, sin * r],
                    normal: [0.0, 1.0, 0.0],
                });
            }
        }

        let mut indices = Vec::with_capacity((segments * 6) as usize);
        for i in 0..segments {
            let inner = i * 2;
            let outer = inner + 1;
            let next_inner = inner + 2;
            let next_outer = inner + 3;
            indices.extend_from_slice(&[inner, outer, next_outer, inner, next_outer, next_inner]);
        }

        Self {
            shape: GeometryShape::Ring {
                inner_radius,
                outer_radius,
                segments,
            },
            vertices,
            indices,
            bounding_radius: outer_radius.max(inner_radius),
        }
    }

    fn line(start: Vec3, end: Vec3) -> Self {
        let dir = (end - start).normalize_or_zero();
        Self {
            shape: GeometryShape::Line { start, end },
            vertices: vec![
                Vertex {
                    position: start.to_array(),
                    normal: dir.to_array(),
                },
                Vertex {
                    position: end.to_array(),
                    normal: dir.to_array(),
                },
            ],
            indices: vec![0, 1],
            bounding_radius: start.distance(end) * 0.5,
        }
    }

    pub fn triangle_count(&self) -> usize {
        match self.shape {
            GeometryShape::Line { .. } => 0,
            _ => self.indices.len() / 3,
        }
    }

    /// Vertex data as raw bytes, ready for a vertex buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
