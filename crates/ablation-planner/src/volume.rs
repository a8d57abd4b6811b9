//! Ablation volume geometry.
//!
//! The volume is the base unit sphere scaled to `(minor, minor, major)` and
//! then carried onto the trajectory by the orientation solver.

use ablation_core::error::Result;
use ablation_core::mesh::TriMesh;
use ablation_core::node::TrajectorySource;
use ablation_core::options::{validate_axis, validate_offset, PlannerOptions};
use ablation_core::orientation::{compute_transform, RigidTransform};
use glam::{Mat4, Vec3};

/// Size and placement of the ablation ellipsoid relative to the probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeParameters {
    /// Scale along the trajectory direction.
    pub major_axis: f32,
    /// Scale of both axes perpendicular to the trajectory.
    pub minor_axis: f32,
    /// Displacement of the center from the tip along the tail-to-tip direction.
    pub tip_offset: f32,
}

impl Default for VolumeParameters {
    fn default() -> Self {
        Self {
            major_axis: 30.0,
            minor_axis: 20.0,
            tip_offset: 0.0,
        }
    }
}

impl VolumeParameters {
    /// Creates validated parameters.
    pub fn new(major_axis: f32, minor_axis: f32, tip_offset: f32) -> Result<Self> {
        validate_axis("major_axis", major_axis)?;
        validate_axis("minor_axis", minor_axis)?;
        validate_offset(tip_offset)?;
        Ok(Self {
            major_axis,
            minor_axis,
            tip_offset,
        })
    }

    /// Takes the initial parameters from the planner options.
    pub fn from_options(options: &PlannerOptions) -> Result<Self> {
        Self::new(options.major_axis, options.minor_axis, options.tip_offset)
    }

    /// Per-axis scale applied to the unit sphere.
    pub fn scale(&self) -> Vec3 {
        Vec3::new(self.minor_axis, self.minor_axis, self.major_axis)
    }
}

/// Tip and tail read from a trajectory source for one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    pub tip: Vec3,
    pub tail: Vec3,
}

impl Trajectory {
    pub fn new(tip: Vec3, tail: Vec3) -> Self {
        Self { tip, tail }
    }

    /// Reads the current endpoints of a source.
    pub fn from_source(source: &dyn TrajectorySource) -> Self {
        Self::new(source.position1(), source.position2())
    }
}

/// A built ablation volume and the transform that placed it.
#[derive(Debug, Clone)]
pub struct AblationVolume {
    pub mesh: TriMesh,
    pub transform: RigidTransform,
}

impl AblationVolume {
    /// World-space center of the ellipsoid.
    pub fn center(&self) -> Vec3 {
        self.transform.center()
    }

    /// World-space direction of the major axis.
    pub fn major_axis_direction(&self) -> Vec3 {
        self.transform.major_axis_direction()
    }
}

/// Builds the ablation volume from the cached unit sphere.
///
/// # Errors
///
/// Fails when the trajectory is degenerate or any input is not finite.
pub fn build_volume(
    params: &VolumeParameters,
    trajectory: &Trajectory,
    sphere: &TriMesh,
) -> Result<AblationVolume> {
    let transform = compute_transform(trajectory.tip, trajectory.tail, params.tip_offset)?;
    let matrix = transform.to_matrix() * Mat4::from_scale(params.scale());
    Ok(AblationVolume {
        mesh: sphere.transformed(&matrix),
        transform,
    })
}
