//! Scene node implementations for ablation-planner-rs.
//!
//! This crate provides the concrete nodes the planner works with:
//! - Ruler nodes (two-point probe trajectories)
//! - Model nodes (mesh sinks receiving the ablation volume)
//! - Model display nodes (color and slice-intersection visibility)
//!
//! It also holds the unit-sphere tessellation the volume is built from and
//! PLY import/export for published meshes.

// Mesh code intentionally uses casts for indices and angles
#![allow(clippy::cast_precision_loss)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod display;
pub mod model;
pub mod ply;
pub mod ruler;
pub mod sphere;

pub use display::ModelDisplayNode;
pub use model::ModelNode;
pub use ruler::RulerNode;
pub use sphere::{unit_sphere, SphereCache};
