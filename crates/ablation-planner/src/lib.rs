//! ablation-planner-rs: ablation volume planning along a probe trajectory.
//!
//! The planner places an ellipsoidal ablation volume on a trajectory defined
//! by a tip and a tail point, and keeps it up to date as the trajectory or
//! the volume parameters change.
//!
//! # Quick Start
//!
//! ```
//! use ablation_planner::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let mut scene = Scene::new();
//!     let ruler = scene.add_node(Box::new(RulerNode::new(
//!         "probe",
//!         Vec3::ZERO,
//!         Vec3::new(0.0, 0.0, -10.0),
//!     )));
//!     let model = scene.add_node(Box::new(ModelNode::new("ablation volume")));
//!
//!     let mut planner = AblationPlanner::new();
//!     planner.on_trajectory_selected(&mut scene, Some(ruler))?;
//!     planner.on_sink_selected(&mut scene, Some(model))?;
//!     let outcome = planner.set_update_enabled(&mut scene, true)?;
//!
//!     let summary = outcome.summary().expect("volume published");
//!     assert_eq!(summary.num_triangles, 720);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Scene`] owns every node. The planner only holds node ids.
//! - A **trajectory source** ([`RulerNode`]) provides the tip and the tail.
//! - A **mesh sink** ([`ModelNode`]) receives the volume and owns a
//!   [`ModelDisplayNode`] with color and slice-intersection settings.
//! - [`AblationPlanner`] rebuilds the volume on every parameter change or
//!   trajectory notification, but only while automatic update is enabled.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod planner;
pub mod volume;

// Re-export core types
pub use ablation_core::{
    error::{PlannerError, Result},
    event::{Notification, ObserverTag, SceneEvent},
    mesh::TriMesh,
    node::{DisplayDescriptor, MeshSink, Node, NodeId, TrajectorySource},
    options::{PlannerOptions, SphereResolution},
    orientation::{compute_transform, RigidTransform},
    scene::Scene,
    Mat4, Quat, Vec3,
};

// Re-export structures
pub use ablation_structures::{
    ply::{load_ply, read_ply, save_ply, write_ply},
    unit_sphere, ModelDisplayNode, ModelNode, RulerNode, SphereCache,
};

pub use planner::{AblationPlanner, SkipReason, UpdateOutcome, VolumeSummary, VOLUME_MODEL_ATTRIBUTE};
pub use volume::{build_volume, AblationVolume, Trajectory, VolumeParameters};

/// Installs the `env_logger` backend for the `log` macros used throughout
/// the planner. Verbosity follows `RUST_LOG`. Calling it more than once is
/// harmless.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
