//! Orientation solver: aligns the canonical +Z frame with a probe trajectory.
//!
//! The ablation ellipsoid is modelled with its major axis along local +Z and
//! its center at the local origin. [`compute_transform`] returns the rigid
//! transform that carries that frame onto the trajectory: +Z onto the
//! tail-to-tip direction and the origin onto `tip + offset * direction`.

use glam::{Mat4, Quat, Vec3};

use crate::error::{PlannerError, Result};

/// Below this cross-product magnitude the direction is treated as parallel to +Z.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Canonical major-axis direction of the unscaled ellipsoid.
pub const REFERENCE_AXIS: Vec3 = Vec3::Z;

/// A rotation followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    /// Rotation applied first, about the local origin.
    pub rotation: Quat,
    /// Translation applied after the rotation.
    pub translation: Vec3,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RigidTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    /// Creates a transform from its rotation and translation.
    #[must_use]
    pub fn new(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Converts this transform to a Mat4.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Maps a point from the local frame to world space.
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    /// Maps a direction from the local frame to world space.
    #[must_use]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// World-space image of the local origin.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.translation
    }

    /// World-space image of the local +Z axis.
    #[must_use]
    pub fn major_axis_direction(&self) -> Vec3 {
        self.transform_vector(REFERENCE_AXIS)
    }

    /// Returns the inverse transform.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    /// Rotation as a unit axis and an angle in radians.
    ///
    /// The identity rotation reports an angle of zero about +Z.
    #[must_use]
    pub fn axis_angle(&self) -> (Vec3, f32) {
        let (axis, angle) = self.rotation.to_axis_angle();
        if angle.abs() <= PARALLEL_EPSILON || !axis.is_finite() {
            (REFERENCE_AXIS, 0.0)
        } else {
            (axis, angle)
        }
    }
}

/// Unit direction from `tail` to `tip`.
pub fn trajectory_direction(tip: Vec3, tail: Vec3) -> Result<Vec3> {
    if !tip.is_finite() {
        return Err(PlannerError::NonFiniteInput("trajectory tip"));
    }
    if !tail.is_finite() {
        return Err(PlannerError::NonFiniteInput("trajectory tail"));
    }
    let delta = tip - tail;
    if !delta.is_finite() {
        return Err(PlannerError::NonFiniteInput("trajectory length"));
    }
    // Pre-scale so the squared length cannot overflow for large coordinates
    (delta / delta.abs().max_element())
        .try_normalize()
        .ok_or(PlannerError::DegenerateTrajectory {
            x: tip.x,
            y: tip.y,
            z: tip.z,
        })
}

/// Rotation that carries [`REFERENCE_AXIS`] onto the unit vector `direction`.
///
/// The angle is `atan2(|z x d|, z . d)`, which stays accurate near 0 and 180
/// degrees. When `direction` is anti-parallel to +Z the cross product
/// vanishes; the half turn is then taken about a fixed vector orthonormal to
/// `direction`.
pub fn rotation_to(direction: Vec3) -> Quat {
    let axis = REFERENCE_AXIS.cross(direction);
    let s = axis.length();
    let c = direction.dot(REFERENCE_AXIS);
    let angle = s.atan2(c);

    if s > PARALLEL_EPSILON {
        return Quat::from_axis_angle(axis / s, angle);
    }
    if c > 0.0 {
        return Quat::IDENTITY;
    }

    let fallback = direction.any_orthonormal_vector();
    log::debug!(
        "trajectory anti-parallel to reference axis, rotating half turn about {fallback}"
    );
    Quat::from_axis_angle(fallback, std::f32::consts::PI)
}

/// Solves the transform that places the ablation volume on a trajectory.
///
/// The rotation is applied first, then the translation to
/// `tip + offset * normalize(tip - tail)`.
///
/// # Errors
///
/// Returns [`PlannerError::NonFiniteInput`] for NaN or infinite input and
/// [`PlannerError::DegenerateTrajectory`] when `tip == tail`.
pub fn compute_transform(tip: Vec3, tail: Vec3, offset: f32) -> Result<RigidTransform> {
    if !offset.is_finite() {
        return Err(PlannerError::NonFiniteInput("tip offset"));
    }
    let direction = trajectory_direction(tip, tail)?;
    Ok(RigidTransform::new(
        rotation_to(direction),
        tip + direction * offset,
    ))
}
