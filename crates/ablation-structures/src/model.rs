//! Model node: the mesh sink the ablation volume is published to.

use std::any::Any;

use ablation_core::mesh::TriMesh;
use ablation_core::node::{MeshSink, Node, NodeId};
use glam::Vec3;

/// A named surface with an optional display node.
#[derive(Debug, Clone, Default)]
pub struct ModelNode {
    name: String,
    mesh: Option<TriMesh>,
    display_node_id: Option<NodeId>,
    modified_count: u64,
}

impl ModelNode {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns the axis-aligned bounding box of the current surface.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        self.mesh.as_ref().and_then(TriMesh::bounding_box)
    }

    /// Drops the current surface.
    pub fn clear_mesh(&mut self) {
        self.mesh = None;
    }
}

impl MeshSink for ModelNode {
    fn mesh(&self) -> Option<&TriMesh> {
        self.mesh.as_ref()
    }

    fn set_mesh(&mut self, mesh: TriMesh) {
        self.mesh = Some(mesh);
    }

    fn mark_modified(&mut self) {
        self.modified_count += 1;
    }

    fn modified_count(&self) -> u64 {
        self.modified_count
    }

    fn display_node_id(&self) -> Option<&NodeId> {
        self.display_node_id.as_ref()
    }

    fn set_display_node_id(&mut self, id: Option<NodeId>) {
        self.display_node_id = id;
    }
}

impl Node for ModelNode {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "ModelNode"
    }

    fn as_mesh_sink(&self) -> Option<&dyn MeshSink> {
        Some(self)
    }

    fn as_mesh_sink_mut(&mut self) -> Option<&mut dyn MeshSink> {
        Some(self)
    }
}
