//! Triangle mesh used for the ablation volume.

use std::collections::HashMap;

use glam::{Mat4, Vec3};

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Creates a mesh from vertex positions and triangle indices.
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    /// Returns the number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Returns the vertices.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Returns the triangles.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns true if every triangle index refers to an existing vertex.
    pub fn indices_in_bounds(&self) -> bool {
        let n = self.vertices.len();
        self.triangles
            .iter()
            .flatten()
            .all(|&i| (i as usize) < n)
    }

    /// Returns a copy with every vertex mapped through `matrix`.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|&v| matrix.transform_point3(v))
                .collect(),
            triangles: self.triangles.clone(),
        }
    }

    /// Returns a copy scaled per axis about the origin.
    #[must_use]
    pub fn scaled(&self, scale: Vec3) -> Self {
        self.transformed(&Mat4::from_scale(scale))
    }

    /// Returns the axis-aligned bounding box, or `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(min, max), &v| (min.min(v), max.max(v))),
        )
    }

    /// Returns the mean of the vertex positions.
    pub fn centroid(&self) -> Option<Vec3> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum: Vec3 = self.vertices.iter().copied().sum();
        Some(sum / self.vertices.len() as f32)
    }

    /// Computes unit face normals from the triangle winding.
    pub fn face_normals(&self) -> Vec<Vec3> {
        self.triangles
            .iter()
            .map(|&[a, b, c]| {
                let v0 = self.vertices[a as usize];
                let e1 = self.vertices[b as usize] - v0;
                let e2 = self.vertices[c as usize] - v0;
                e1.cross(e2).normalize_or_zero()
            })
            .collect()
    }

    /// Computes vertex normals as area-weighted average of incident face normals.
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for &[a, b, c] in &self.triangles {
            let v0 = self.vertices[a as usize];
            let e1 = self.vertices[b as usize] - v0;
            let e2 = self.vertices[c as usize] - v0;
            // Cross product length is twice the area, so this is already area weighted
            let weighted = e1.cross(e2);
            for vi in [a, b, c] {
                normals[vi as usize] += weighted;
            }
        }
        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }
        normals
    }

    /// Counts how many triangles use each undirected edge.
    fn edge_use_counts(&self) -> HashMap<(u32, u32), u32> {
        let mut counts = HashMap::new();
        for tri in &self.triangles {
            for i in 0..3 {
                let (v0, v1) = (tri[i], tri[(i + 1) % 3]);
                let edge = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                *counts.entry(edge).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Returns the number of unique edges.
    pub fn num_edges(&self) -> usize {
        self.edge_use_counts().len()
    }

    /// Returns true if every edge is shared by exactly two triangles.
    pub fn is_closed(&self) -> bool {
        !self.triangles.is_empty() && self.edge_use_counts().values().all(|&n| n == 2)
    }

    /// Euler characteristic `V - E + F`; 2 for a sphere-like surface.
    pub fn euler_characteristic(&self) -> i64 {
        self.vertices.len() as i64 - self.num_edges() as i64 + self.triangles.len() as i64
    }

    /// Enclosed volume by the divergence theorem. Positive for outward winding.
    pub fn signed_volume(&self) -> f32 {
        self.triangles
            .iter()
            .map(|&[a, b, c]| {
                let v0 = self.vertices[a as usize];
                let v1 = self.vertices[b as usize];
                let v2 = self.vertices[c as usize];
                v0.dot(v1.cross(v2))
            })
            .sum::<f32>()
            / 6.0
    }
}
