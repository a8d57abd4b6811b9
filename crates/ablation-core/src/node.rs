//! Node trait and the narrow contracts the planner depends on.
//!
//! A [`Node`] is an object owned by the [`Scene`](crate::scene::Scene). The
//! planner never depends on concrete node types for its inputs and outputs;
//! it asks a node for one of the contracts below and works through that.

use std::any::Any;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::mesh::TriMesh;

/// Identifier of a node within a scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// An object that lives in a scene.
pub trait Node: Any + Send + Sync {
    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to self as `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the display name of this node.
    fn name(&self) -> &str;

    /// Returns the type name of this node (e.g., "`RulerNode`", "`ModelNode`").
    /// Also used as the prefix of scene-assigned ids.
    fn type_name(&self) -> &'static str;

    /// Returns the trajectory contract, if this node provides one.
    fn as_trajectory(&self) -> Option<&dyn TrajectorySource> {
        None
    }

    /// Returns the mesh sink contract, if this node provides one.
    fn as_mesh_sink(&self) -> Option<&dyn MeshSink> {
        None
    }

    /// Returns the mutable mesh sink contract, if this node provides one.
    fn as_mesh_sink_mut(&mut self) -> Option<&mut dyn MeshSink> {
        None
    }

    /// Returns the display contract, if this node provides one.
    fn as_display(&self) -> Option<&dyn DisplayDescriptor> {
        None
    }

    /// Returns the mutable display contract, if this node provides one.
    fn as_display_mut(&mut self) -> Option<&mut dyn DisplayDescriptor> {
        None
    }
}

/// Two endpoints of a probe trajectory.
pub trait TrajectorySource {
    /// The probe tip.
    fn position1(&self) -> Vec3;

    /// The probe tail.
    fn position2(&self) -> Vec3;
}

/// Holder of a published surface.
pub trait MeshSink {
    /// The current surface, if one has been published.
    fn mesh(&self) -> Option<&TriMesh>;

    /// Replaces the current surface.
    fn set_mesh(&mut self, mesh: TriMesh);

    /// Bumps the modification counter so downstream consumers redraw.
    fn mark_modified(&mut self);

    /// Number of times this sink has been marked modified.
    fn modified_count(&self) -> u64;

    /// Id of the display node associated with this sink.
    fn display_node_id(&self) -> Option<&NodeId>;

    /// Associates a display node with this sink.
    fn set_display_node_id(&mut self, id: Option<NodeId>);
}

/// Appearance of a published surface.
pub trait DisplayDescriptor {
    /// RGB color in `[0, 1]`.
    fn color(&self) -> Vec3;

    /// Sets the RGB color.
    fn set_color(&mut self, color: Vec3);

    /// Whether the intersection with 2D slice views is drawn.
    fn slice_intersection_visible(&self) -> bool;

    /// Sets whether the intersection with 2D slice views is drawn.
    fn set_slice_intersection_visible(&mut self, visible: bool);
}
