//! Ruler node: a two-point trajectory source.

use std::any::Any;

use ablation_core::node::{Node, TrajectorySource};
use glam::Vec3;

/// A line segment with a tip (`position1`) and a tail (`position2`).
#[derive(Debug, Clone)]
pub struct RulerNode {
    name: String,
    position1: Vec3,
    position2: Vec3,
}

impl RulerNode {
    /// Creates a ruler from its tip and tail.
    pub fn new(name: impl Into<String>, tip: Vec3, tail: Vec3) -> Self {
        Self {
            name: name.into(),
            position1: tip,
            position2: tail,
        }
    }

    /// Sets the tip.
    pub fn set_position1(&mut self, position: Vec3) {
        self.position1 = position;
    }

    /// Sets the tail.
    pub fn set_position2(&mut self, position: Vec3) {
        self.position2 = position;
    }

    /// Sets both endpoints at once.
    pub fn set_positions(&mut self, tip: Vec3, tail: Vec3) {
        self.position1 = tip;
        self.position2 = tail;
    }

    /// Distance between tip and tail.
    pub fn length(&self) -> f32 {
        self.position1.distance(self.position2)
    }
}

impl TrajectorySource for RulerNode {
    fn position1(&self) -> Vec3 {
        self.position1
    }

    fn position2(&self) -> Vec3 {
        self.position2
    }
}

impl Node for RulerNode {
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
        "RulerNode"
    }

    fn as_trajectory(&self) -> Option<&dyn TrajectorySource> {
        Some(self)
    }
}
