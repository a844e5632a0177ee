//! CPU-side mesh data, the STL reader and display filters

pub mod filters;
pub mod stl;

use glam::Vec3;

use crate::error::MeshLoadError;

pub use filters::apply_filters;
pub use stl::{encode_binary_stl, parse_stl, MeshReader, StlReader};

/// Floats per vertex: position(3) + normal(3)
pub const STRIDE: usize = 6;

/// Triangle mesh: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn position(&self, i: usize) -> Vec3 {
        let b = i * STRIDE;
        Vec3::new(self.vertices[b], self.vertices[b + 1], self.vertices[b + 2])
    }

    pub fn normal(&self, i: usize) -> Vec3 {
        let b = i * STRIDE + 3;
        Vec3::new(self.vertices[b], self.vertices[b + 1], self.vertices[b + 2])
    }

    /// Corner positions of triangle `t`
    pub fn triangle(&self, t: usize) -> [Vec3; 3] {
        let i = &self.indices[t * 3..t * 3 + 3];
        [
            self.position(i[0] as usize),
            self.position(i[1] as usize),
            self.position(i[2] as usize),
        ]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        (0..self.triangle_count()).map(|t| self.triangle(t))
    }

    /// Normal stored on the first corner of triangle `t`
    pub fn triangle_normal(&self, t: usize) -> Vec3 {
        self.normal(self.indices[t * 3] as usize)
    }

    pub fn push_vertex(&mut self, p: Vec3, n: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
        index
    }

    /// Append an unshared triangle with its own flat normal
    pub fn push_triangle(&mut self, tri: [Vec3; 3]) {
        self.push_triangle_with_normal(tri, face_normal(tri));
    }

    pub fn push_triangle_with_normal(&mut self, tri: [Vec3; 3], n: Vec3) {
        let a = self.push_vertex(tri[0], n);
        let b = self.push_vertex(tri[1], n);
        let c = self.push_vertex(tri[2], n);
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Check that every index points at a vertex and every triangle is
    /// finite. Meshes from outside readers go through this before use.
    pub fn validate(&self) -> Result<(), MeshLoadError> {
        if self.vertices.len() % STRIDE != 0 {
            return Err(MeshLoadError::Inconsistent {
                reason: format!("{} floats is not a whole number of vertices", self.vertices.len()),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshLoadError::Inconsistent {
                reason: format!("{} indices is not a whole number of triangles", self.indices.len()),
            });
        }
        if self.is_empty() {
            return Err(MeshLoadError::Empty);
        }
        let vertex_count = self.vertex_count();
        for (index, corners) in self.indices.chunks_exact(3).enumerate() {
            if let Some(i) = corners.iter().find(|i| **i as usize >= vertex_count) {
                return Err(MeshLoadError::BadFacet {
                    index,
                    reason: format!("vertex {i} out of range ({vertex_count} vertices)"),
                });
            }
            if self.triangle(index).iter().any(|p| !p.is_finite()) {
                return Err(MeshLoadError::BadFacet {
                    index,
                    reason: "non-finite vertex".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn bounds(&self) -> Option<Aabb> {
        if self.vertex_count() == 0 {
            return None;
        }
        Some(Aabb::from_mesh(self))
    }
}

/// Unit normal of a counter-clockwise triangle, zero when degenerate
pub fn face_normal(tri: [Vec3; 3]) -> Vec3 {
    (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero()
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_mesh(data: &MeshData) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for i in 0..data.vertex_count() {
            let p = data.position(i);
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half of the diagonal
    pub fn radius(&self) -> f32 {
        self.size().length() * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Axis-aligned box centered at the origin, 12 triangles
pub fn cube(w: f32, h: f32, d: f32) -> MeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let hd = d * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-hw, -hh, hd), Vec3::new(hw, -hh, hd), Vec3::new(hw, hh, hd), Vec3::new(-hw, hh, hd)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(hw, -hh, -hd), Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, hh, -hd), Vec3::new(hw, hh, -hd)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(hw, -hh, hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, hh, -hd), Vec3::new(hw, hh, hd)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, -hh, hd), Vec3::new(-hw, hh, hd), Vec3::new(-hw, hh, -hd)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-hw, hh, hd), Vec3::new(hw, hh, hd), Vec3::new(hw, hh, -hd), Vec3::new(-hw, hh, -hd)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, -hh, hd), Vec3::new(-hw, -hh, hd)], Vec3::NEG_Y),
    ];

    let mut mesh = MeshData {
        vertices: Vec::with_capacity(24 * STRIDE),
        indices: Vec::with_capacity(36),
    };

    for (quad, normal) in &faces {
        let base = mesh.vertex_count() as u32;
        for v in quad {
            mesh.push_vertex(*v, *normal);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    mesh
}
