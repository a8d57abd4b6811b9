//! Core abstractions for ablation-planner-rs.
//!
//! This crate provides the fundamental types used throughout the planner:
//! - [`Scene`] owning nodes, their attributes and change notifications
//! - [`Node`] plus the [`TrajectorySource`], [`MeshSink`] and
//!   [`DisplayDescriptor`] contracts the planner talks through
//! - [`TriMesh`] for the published ablation volume
//! - The orientation solver ([`compute_transform`])
//! - Configuration options and the error type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Mesh code intentionally uses casts for indices and counts
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod error;
pub mod event;
pub mod mesh;
pub mod node;
pub mod options;
pub mod orientation;
pub mod scene;

pub use error::{PlannerError, Result};
pub use event::{Notification, ObserverTag, SceneEvent};
pub use mesh::TriMesh;
pub use node::{DisplayDescriptor, MeshSink, Node, NodeId, TrajectorySource};
pub use options::{PlannerOptions, SphereResolution};
pub use orientation::{compute_transform, RigidTransform};
pub use scene::Scene;

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec3};
