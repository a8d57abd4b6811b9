//! Configuration options for the ablation planner.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Angular resolution of the base sphere tessellation.
///
/// `theta` counts azimuthal steps around the +Z axis, `phi` counts points along
/// a meridian from pole to pole (poles included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SphereResolution {
    /// Number of azimuthal subdivisions.
    pub theta: u32,
    /// Number of polar subdivisions.
    pub phi: u32,
}

impl SphereResolution {
    /// Creates a resolution, rejecting values that cannot close a surface.
    pub fn new(theta: u32, phi: u32) -> Result<Self> {
        let resolution = Self { theta, phi };
        resolution.validate()?;
        Ok(resolution)
    }

    /// Largest subdivision count accepted along either direction.
    pub const MAX: u32 = 1024;

    /// Checks that both counts are in `3..=MAX`.
    pub fn validate(&self) -> Result<()> {
        let range = 3..=Self::MAX;
        if !range.contains(&self.theta) || !range.contains(&self.phi) {
            return Err(PlannerError::InvalidResolution {
                theta: self.theta,
                phi: self.phi,
            });
        }
        Ok(())
    }

    /// Number of vertices in a sphere tessellated at this resolution.
    pub fn num_vertices(&self) -> usize {
        self.rings()
            .saturating_mul(self.theta as usize)
            .saturating_add(2)
    }

    /// Number of triangles in a sphere tessellated at this resolution.
    pub fn num_triangles(&self) -> usize {
        self.rings()
            .saturating_mul(self.theta as usize)
            .saturating_mul(2)
    }

    /// Interior latitude rings, excluding the poles.
    fn rings(&self) -> usize {
        (self.phi as usize).saturating_sub(2)
    }
}

impl Default for SphereResolution {
    fn default() -> Self {
        Self { theta: 20, phi: 20 }
    }
}

/// Planner configuration, usually loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerOptions {
    /// Initial scale along the trajectory direction (mm).
    pub major_axis: f32,

    /// Initial scale perpendicular to the trajectory (mm).
    pub minor_axis: f32,

    /// Initial displacement of the volume center from the tip (mm).
    pub tip_offset: f32,

    /// Color assigned to newly created display nodes.
    pub model_color: Vec3,

    /// Whether slice intersections are shown initially.
    pub slice_intersection: bool,

    /// Whether automatic update starts enabled.
    pub automatic_update: bool,

    /// Base sphere tessellation.
    pub sphere_resolution: SphereResolution,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            major_axis: 30.0,
            minor_axis: 20.0,
            tip_offset: 0.0,
            model_color: Vec3::new(0.0, 0.0, 1.0),
            slice_intersection: true,
            automatic_update: false,
            sphere_resolution: SphereResolution::default(),
        }
    }
}

impl PlannerOptions {
    /// Parses options from JSON text. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes the options as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every field against the ranges the planner accepts.
    pub fn validate(&self) -> Result<()> {
        validate_axis("major_axis", self.major_axis)?;
        validate_axis("minor_axis", self.minor_axis)?;
        validate_offset(self.tip_offset)?;
        if !self.model_color.is_finite() {
            return Err(PlannerError::NonFiniteInput("model_color"));
        }
        if let Some(&value) = self
            .model_color
            .to_array()
            .iter()
            .find(|c| !(0.0..=1.0).contains(*c))
        {
            return Err(PlannerError::InvalidParameter {
                name: "model_color",
                value,
            });
        }
        self.sphere_resolution.validate()
    }
}

/// Axis lengths must be finite and strictly positive.
pub fn validate_axis(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PlannerError::InvalidParameter { name, value })
    }
}

/// Tip offsets may be any finite value.
pub fn validate_offset(value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PlannerError::InvalidParameter {
            name: "tip_offset",
            value,
        })
    }
}
