//! Display node describing how a model is drawn.

use std::any::Any;

use ablation_core::node::{DisplayDescriptor, Node};
use glam::Vec3;

/// Color and slice-intersection settings of a model.
#[derive(Debug, Clone)]
pub struct ModelDisplayNode {
    name: String,
    color: Vec3,
    slice_intersection_visible: bool,
}

impl ModelDisplayNode {
    /// Creates a display node with the given color, clamped to `[0, 1]`.
    /// Slice intersections start hidden.
    pub fn new(name: impl Into<String>, color: Vec3) -> Self {
        Self {
            name: name.into(),
            color: color.clamp(Vec3::ZERO, Vec3::ONE),
            slice_intersection_visible: false,
        }
    }
}

impl DisplayDescriptor for ModelDisplayNode {
    fn color(&self) -> Vec3 {
        self.color
    }

    fn set_color(&mut self, color: Vec3) {
        self.color = color.clamp(Vec3::ZERO, Vec3::ONE);
    }

    fn slice_intersection_visible(&self) -> bool {
        self.slice_intersection_visible
    }

    fn set_slice_intersection_visible(&mut self, visible: bool) {
        self.slice_intersection_visible = visible;
    }
}

impl Node for ModelDisplayNode {
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
        "ModelDisplayNode"
    }

    fn as_display(&self) -> Option<&dyn DisplayDescriptor> {
        Some(self)
    }

    fn as_display_mut(&mut self) -> Option<&mut dyn DisplayDescriptor> {
        Some(self)
    }
}
