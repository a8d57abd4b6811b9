//! Unit-sphere tessellation and its memo cache.
//!
//! The sphere is generated as a latitude/longitude grid: a north pole at +Z, a
//! south pole at -Z, then for each of the `theta` azimuthal steps the
//! `phi - 2` interior points of that meridian, ordered north to south. The
//! caps are triangle fans around the poles and each band between neighbouring
//! latitudes is split into two triangles. All triangles wind counter-clockwise
//! when seen from outside.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::Arc;

use ablation_core::error::Result;
use ablation_core::mesh::TriMesh;
use ablation_core::options::SphereResolution;
use glam::Vec3;

/// Tessellates a sphere of radius 1 centered at the origin.
pub fn unit_sphere(resolution: SphereResolution) -> Result<TriMesh> {
    resolution.validate()?;
    let theta_res = resolution.theta;
    let rings = resolution.phi - 2;

    let mut vertices = Vec::with_capacity(resolution.num_vertices());
    vertices.push(Vec3::Z);
    vertices.push(Vec3::NEG_Z);

    let delta_theta = 2.0 * PI / theta_res as f32;
    let delta_phi = PI / (resolution.phi - 1) as f32;
    for i in 0..theta_res {
        let theta = i as f32 * delta_theta;
        for j in 1..=rings {
            let phi = j as f32 * delta_phi;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let (sin_theta, cos_theta) = theta.sin_cos();
            vertices.push(Vec3::new(
                sin_phi * cos_theta,
                sin_phi * sin_theta,
                cos_phi,
            ));
        }
    }

    // Index of ring `j` (0-based, north to south) on meridian `i`
    let index = |i: u32, j: u32| 2 + (i % theta_res) * rings + j;

    let mut triangles = Vec::with_capacity(resolution.num_triangles());
    for i in 0..theta_res {
        triangles.push([0, index(i, 0), index(i + 1, 0)]);
    }
    for i in 0..theta_res {
        triangles.push([1, index(i + 1, rings - 1), index(i, rings - 1)]);
    }
    for i in 0..theta_res {
        for j in 0..rings - 1 {
            let a = index(i, j);
            let b = index(i + 1, j);
            let c = index(i + 1, j + 1);
            let d = index(i, j + 1);
            triangles.push([a, d, b]);
            triangles.push([b, d, c]);
        }
    }

    Ok(TriMesh::new(vertices, triangles))
}

/// Memoizes [`unit_sphere`] per resolution.
///
/// Each resolution is tessellated once and shared afterwards.
#[derive(Debug, Default)]
pub struct SphereCache {
    spheres: HashMap<SphereResolution, Arc<TriMesh>>,
    builds: usize,
}

impl SphereCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sphere for `resolution`, tessellating it on first use.
    pub fn get(&mut self, resolution: SphereResolution) -> Result<Arc<TriMesh>> {
        if let Some(sphere) = self.spheres.get(&resolution) {
            return Ok(Arc::clone(sphere));
        }
        let sphere = Arc::new(unit_sphere(resolution)?);
        log::debug!(
            "tessellated unit sphere {}x{}: {} vertices, {} triangles",
            resolution.theta,
            resolution.phi,
            sphere.num_vertices(),
            sphere.num_triangles()
        );
        self.builds += 1;
        self.spheres.insert(resolution, Arc::clone(&sphere));
        Ok(sphere)
    }

    /// Number of tessellations performed so far.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Number of cached resolutions.
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    /// Returns true if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }
}
