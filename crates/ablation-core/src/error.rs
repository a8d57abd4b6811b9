//! Error types for ablation-planner-rs.

use thiserror::Error;

/// The main error type for ablation-planner-rs operations.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Tip and tail coincide, so the trajectory has no direction.
    #[error("degenerate trajectory: tip and tail coincide at ({x}, {y}, {z})")]
    DegenerateTrajectory { x: f32, y: f32, z: f32 },

    /// A trajectory endpoint or transform input is NaN or infinite.
    #[error("non-finite input: {0}")]
    NonFiniteInput(&'static str),

    /// A volume parameter is out of its valid range.
    #[error("invalid parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    /// The sphere tessellation resolution is too coarse to close the surface.
    #[error("invalid sphere resolution {theta}x{phi}: both must be at least 3")]
    InvalidResolution { theta: u32, phi: u32 },

    /// No node with the given id exists in the scene.
    #[error("node '{0}' not found")]
    NodeNotFound(String),

    /// A node exists but does not provide the requested contract.
    #[error("node '{id}' is not a {expected}")]
    NodeTypeMismatch { id: String, expected: &'static str },

    /// PLY encoding or decoding error.
    #[error("PLY error: {0}")]
    PlyError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for ablation-planner-rs operations.
pub type Result<T> = std::result::Result<T, PlannerError>;
