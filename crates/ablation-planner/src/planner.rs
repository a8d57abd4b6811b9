//! Planner logic: keeps the ablation volume in sync with its inputs.
//!
//! [`AblationPlanner`] holds the latest volume parameters and the ids of the
//! selected trajectory and model nodes. Every control-surface call ends in a
//! guarded rebuild ([`AblationPlanner::update_ablation_volume`]): nothing is
//! touched while automatic update is disabled or a selection is missing.
//!
//! # Example
//!
//! ```
//! use ablation_planner::*;
//!
//! fn main() -> Result<()> {
//!     let mut scene = Scene::new();
//!     let ruler = scene.add_node(Box::new(RulerNode::new(
//!         "probe",
//!         Vec3::new(0.0, 0.0, 10.0),
//!         Vec3::ZERO,
//!     )));
//!     let model = scene.add_node(Box::new(ModelNode::new("ablation volume")));
//!
//!     let mut planner = AblationPlanner::new();
//!     planner.on_trajectory_selected(&mut scene, Some(ruler))?;
//!     planner.on_sink_selected(&mut scene, Some(model))?;
//!     planner.set_tip_offset(&mut scene, 5.0)?;
//!
//!     let outcome = planner.set_update_enabled(&mut scene, true)?;
//!     assert!(outcome.is_rebuilt());
//!     Ok(())
//! }
//! ```

use std::path::Path;

use ablation_core::error::{PlannerError, Result};
use ablation_core::event::{ObserverTag, SceneEvent};
use ablation_core::node::NodeId;
use ablation_core::options::{validate_axis, validate_offset, PlannerOptions, SphereResolution};
use ablation_core::scene::Scene;
use ablation_structures::{ply, ModelDisplayNode, SphereCache};
use glam::Vec3;

use crate::volume::{build_volume, AblationVolume, Trajectory, VolumeParameters};

/// Attribute on a trajectory node naming the model its volume was published to.
pub const VOLUME_MODEL_ATTRIBUTE: &str = "AblationPlanner.VolumeModel";

/// Why an update did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Automatic update is disabled.
    UpdateDisabled,
    /// No trajectory node is selected.
    NoTrajectory,
    /// No model node is selected.
    NoSink,
}

/// Summary of a published volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSummary {
    /// World-space center of the ellipsoid.
    pub center: Vec3,
    /// World-space direction of the major axis.
    pub major_axis_direction: Vec3,
    pub num_vertices: usize,
    pub num_triangles: usize,
}

impl VolumeSummary {
    fn new(volume: &AblationVolume) -> Self {
        Self {
            center: volume.center(),
            major_axis_direction: volume.major_axis_direction(),
            num_vertices: volume.mesh.num_vertices(),
            num_triangles: volume.mesh.num_triangles(),
        }
    }
}

/// Result of a guarded rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    /// A new volume was published.
    Rebuilt(VolumeSummary),
    /// Nothing was done.
    Skipped(SkipReason),
}

impl UpdateOutcome {
    /// Returns true if a volume was published.
    pub fn is_rebuilt(&self) -> bool {
        matches!(self, Self::Rebuilt(_))
    }

    /// Returns the summary of the published volume, if any.
    pub fn summary(&self) -> Option<&VolumeSummary> {
        match self {
            Self::Rebuilt(summary) => Some(summary),
            Self::Skipped(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TrajectoryObservers {
    modified: ObserverTag,
    removed: ObserverTag,
}

/// Keeps an ablation volume model in sync with a trajectory.
#[derive(Debug)]
pub struct AblationPlanner {
    params: VolumeParameters,
    automatic_update: bool,
    slice_intersection: bool,
    model_color: Vec3,
    sphere_resolution: SphereResolution,
    spheres: SphereCache,

    source: Option<NodeId>,
    sink: Option<NodeId>,
    source_observers: Option<TrajectoryObservers>,
    sink_observer: Option<ObserverTag>,

    rebuilds: u64,
}

impl Default for AblationPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl AblationPlanner {
    /// Creates a planner with default options.
    pub fn new() -> Self {
        let options = PlannerOptions::default();
        Self {
            params: VolumeParameters::default(),
            automatic_update: options.automatic_update,
            slice_intersection: options.slice_intersection,
            model_color: options.model_color,
            sphere_resolution: options.sphere_resolution,
            spheres: SphereCache::new(),
            source: None,
            sink: None,
            source_observers: None,
            sink_observer: None,
            rebuilds: 0,
        }
    }

    /// Creates a planner from validated options.
    pub fn with_options(options: &PlannerOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            params: VolumeParameters::from_options(options)?,
            automatic_update: options.automatic_update,
            slice_intersection: options.slice_intersection,
            model_color: options.model_color,
            sphere_resolution: options.sphere_resolution,
            ..Self::new()
        })
    }

    // -- State --

    /// Returns the current volume parameters.
    pub fn parameters(&self) -> VolumeParameters {
        self.params
    }

    /// Returns whether automatic update is enabled.
    pub fn is_update_enabled(&self) -> bool {
        self.automatic_update
    }

    /// Returns whether slice intersections are shown.
    pub fn is_slice_intersection_enabled(&self) -> bool {
        self.slice_intersection
    }

    /// Color given to display nodes the planner creates.
    pub fn model_color(&self) -> Vec3 {
        self.model_color
    }

    /// Returns the selected trajectory node.
    pub fn trajectory_node(&self) -> Option<&NodeId> {
        self.source.as_ref()
    }

    /// Returns the selected model node.
    pub fn sink_node(&self) -> Option<&NodeId> {
        self.sink.as_ref()
    }

    /// Number of volumes published so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Number of sphere tessellations performed so far.
    pub fn sphere_builds(&self) -> usize {
        self.spheres.builds()
    }

    // -- Control surface --

    /// Sets the major and minor axis lengths.
    pub fn set_axis_sizes(
        &mut self,
        scene: &mut Scene,
        major_axis: f32,
        minor_axis: f32,
    ) -> Result<UpdateOutcome> {
        validate_axis("major_axis", major_axis)?;
        validate_axis("minor_axis", minor_axis)?;
        self.params.major_axis = major_axis;
        self.params.minor_axis = minor_axis;
        self.update_ablation_volume(scene)
    }

    /// Sets the displacement of the volume center from the tip.
    pub fn set_tip_offset(&mut self, scene: &mut Scene, offset: f32) -> Result<UpdateOutcome> {
        validate_offset(offset)?;
        self.params.tip_offset = offset;
        self.update_ablation_volume(scene)
    }

    /// Enables or disables automatic update.
    pub fn set_update_enabled(&mut self, scene: &mut Scene, enabled: bool) -> Result<UpdateOutcome> {
        if enabled != self.automatic_update {
            log::info!(
                "automatic update {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.automatic_update = enabled;
        self.update_ablation_volume(scene)
    }

    /// Shows or hides the intersection of the volume with slice views.
    ///
    /// The display node is updated right away when a model is selected, even
    /// while automatic update is disabled.
    pub fn set_slice_intersection_enabled(
        &mut self,
        scene: &mut Scene,
        enabled: bool,
    ) -> Result<UpdateOutcome> {
        self.slice_intersection = enabled;
        if let Some(sink) = self.sink.clone() {
            self.apply_display_policy(scene, &sink)?;
        }
        self.update_ablation_volume(scene)
    }

    /// Selects the trajectory node, or clears the selection with `None`.
    ///
    /// If the trajectory carries a [`VOLUME_MODEL_ATTRIBUTE`] naming an existing
    /// model, that model becomes the selected sink. Otherwise the model
    /// selection is cleared, so the volume of another trajectory is never
    /// overwritten.
    pub fn on_trajectory_selected(
        &mut self,
        scene: &mut Scene,
        source: Option<NodeId>,
    ) -> Result<UpdateOutcome> {
        if let Some(id) = &source {
            check_trajectory(scene, id)?;
        }
        if let Some(observers) = self.source_observers.take() {
            scene.remove_observer(observers.modified);
            scene.remove_observer(observers.removed);
        }
        let mut cleared = source.is_none();
        self.source = source;

        if let Some(id) = self.source.clone() {
            log::info!("trajectory selected: {id}");
            let linked = scene
                .attribute(&id, VOLUME_MODEL_ATTRIBUTE)
                .map(NodeId::new)
                .filter(|linked| {
                    let valid = check_sink(scene, linked).is_ok();
                    if !valid {
                        log::debug!("ignoring stale model link {linked} on {id}");
                    }
                    valid
                });
            match linked {
                Some(linked) => {
                    log::debug!("re-using model {linked} linked to {id}");
                    self.bind_sink(scene, Some(linked))?;
                }
                None if self.sink.is_some() => {
                    log::info!("{id} has no linked model, clearing model selection");
                    self.bind_sink(scene, None)?;
                    cleared = true;
                }
                None => {}
            }
            self.source_observers = Some(TrajectoryObservers {
                modified: scene.add_observer(&id, SceneEvent::Modified)?,
                removed: scene.add_observer(&id, SceneEvent::Removed)?,
            });
        }

        self.selection_changed(scene, cleared)
    }

    /// Selects the model node the volume is published to, or clears it with `None`.
    pub fn on_sink_selected(
        &mut self,
        scene: &mut Scene,
        sink: Option<NodeId>,
    ) -> Result<UpdateOutcome> {
        if let Some(id) = &sink {
            check_sink(scene, id)?;
            log::info!("model selected: {id}");
        }
        let cleared = sink.is_none();
        self.bind_sink(scene, sink)?;
        self.selection_changed(scene, cleared)
    }

    /// Handles queued scene notifications for the selected nodes.
    ///
    /// Any number of pending trajectory modifications result in a single
    /// rebuild. Removal of a selected node clears that selection.
    pub fn process_notifications(&mut self, scene: &mut Scene) -> Result<Option<UpdateOutcome>> {
        let mut trajectory_modified = false;
        let mut selection_lost = false;

        if let Some(observers) = self.source_observers {
            trajectory_modified = !scene.take_notifications(observers.modified).is_empty();
            if !scene.take_notifications(observers.removed).is_empty() {
                log::info!("selected trajectory was removed from the scene");
                self.source = None;
                self.source_observers = None;
                selection_lost = true;
            }
        }
        if let Some(tag) = self.sink_observer {
            if !scene.take_notifications(tag).is_empty() {
                log::info!("selected model was removed from the scene");
                self.sink = None;
                self.sink_observer = None;
                selection_lost = true;
            }
        }

        if selection_lost {
            return self.selection_changed(scene, true).map(Some);
        }
        if trajectory_modified {
            return self.update_ablation_volume(scene).map(Some);
        }
        Ok(None)
    }

    /// Rebuilds and publishes the volume if automatic update is enabled and
    /// both a trajectory and a model are selected.
    ///
    /// # Errors
    ///
    /// Fails on a degenerate trajectory, or when a selected node is gone or
    /// no longer provides the expected contract. The previously published
    /// volume is left untouched in that case.
    pub fn update_ablation_volume(&mut self, scene: &mut Scene) -> Result<UpdateOutcome> {
        if !self.automatic_update {
            log::debug!("update skipped: automatic update disabled");
            return Ok(UpdateOutcome::Skipped(SkipReason::UpdateDisabled));
        }
        let Some(source) = self.source.clone() else {
            log::debug!("update skipped: no trajectory selected");
            return Ok(UpdateOutcome::Skipped(SkipReason::NoTrajectory));
        };
        let Some(sink) = self.sink.clone() else {
            log::debug!("update skipped: no model selected");
            return Ok(UpdateOutcome::Skipped(SkipReason::NoSink));
        };

        let trajectory = check_trajectory(scene, &source)?;
        check_sink(scene, &sink)?;

        let sphere = self.spheres.get(self.sphere_resolution)?;
        let volume = build_volume(&self.params, &trajectory, &sphere).map_err(|e| {
            log::warn!("ablation volume not updated for {source}: {e}");
            e
        })?;
        let summary = VolumeSummary::new(&volume);

        self.apply_display_policy(scene, &sink)?;
        scene.modify_node(&sink, move |node| {
            if let Some(mesh_sink) = node.as_mesh_sink_mut() {
                mesh_sink.set_mesh(volume.mesh);
                mesh_sink.mark_modified();
            }
        })?;
        if scene.attach(&sink)? {
            log::info!("attached model {sink} to the scene");
        }
        // Positions were just read, so queued trajectory edits are covered
        if let Some(observers) = self.source_observers {
            scene.take_notifications(observers.modified);
        }

        self.rebuilds += 1;
        log::debug!(
            "published ablation volume to {sink}: center {}, axis {}",
            summary.center,
            summary.major_axis_direction
        );
        Ok(UpdateOutcome::Rebuilt(summary))
    }

    /// Writes the volume currently held by the selected model as PLY.
    pub fn export_volume(&self, scene: &Scene, path: impl AsRef<Path>) -> Result<usize> {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| PlannerError::PlyError("no model selected".to_string()))?;
        let node = scene
            .get(sink)
            .ok_or_else(|| PlannerError::NodeNotFound(sink.to_string()))?;
        let mesh = node
            .as_mesh_sink()
            .and_then(|s| s.mesh())
            .ok_or_else(|| PlannerError::PlyError(format!("model {sink} has no volume")))?;
        let comment = format!(
            "ablation volume major={} minor={} offset={}",
            self.params.major_axis, self.params.minor_axis, self.params.tip_offset
        );
        ply::save_ply(mesh, path, Some(&comment))
    }

    /// Unsubscribes from the scene. Call before dropping the planner if the
    /// scene outlives it.
    pub fn release(&mut self, scene: &mut Scene) {
        if let Some(observers) = self.source_observers.take() {
            scene.remove_observer(observers.modified);
            scene.remove_observer(observers.removed);
        }
        if let Some(tag) = self.sink_observer.take() {
            scene.remove_observer(tag);
        }
    }

    // -- Internals --

    fn bind_sink(&mut self, scene: &mut Scene, sink: Option<NodeId>) -> Result<()> {
        if let Some(tag) = self.sink_observer.take() {
            scene.remove_observer(tag);
        }
        if let Some(id) = &sink {
            self.sink_observer = Some(scene.add_observer(id, SceneEvent::Removed)?);
        }
        self.sink = sink;
        Ok(())
    }

    /// Records the model link on the trajectory and rebuilds. Clearing a
    /// selection turns automatic update off.
    fn selection_changed(&mut self, scene: &mut Scene, cleared: bool) -> Result<UpdateOutcome> {
        if let (Some(source), Some(sink)) = (&self.source, &self.sink) {
            scene.set_attribute(source, VOLUME_MODEL_ATTRIBUTE, sink.as_str())?;
        } else if cleared && self.automatic_update {
            log::info!("automatic update disabled: selection cleared");
            self.automatic_update = false;
        }
        self.update_ablation_volume(scene)
    }

    /// Makes sure the model has a display node and applies the slice policy.
    fn apply_display_policy(&self, scene: &mut Scene, sink: &NodeId) -> Result<()> {
        let display = self.ensure_display_node(scene, sink)?;
        let visible = self.slice_intersection;
        scene.modify_node(&display, |node| {
            if let Some(d) = node.as_display_mut() {
                d.set_slice_intersection_visible(visible);
            }
        })
    }

    fn ensure_display_node(&self, scene: &mut Scene, sink: &NodeId) -> Result<NodeId> {
        let node = scene
            .get(sink)
            .ok_or_else(|| PlannerError::NodeNotFound(sink.to_string()))?;
        let existing = node
            .as_mesh_sink()
            .and_then(|s| s.display_node_id())
            .cloned();
        if let Some(id) = existing {
            if scene.get(&id).is_some_and(|n| n.as_display().is_some()) {
                return Ok(id);
            }
        }

        let name = format!("{} display", node.name());
        let id = scene.add_node(Box::new(ModelDisplayNode::new(name, self.model_color)));
        let link = id.clone();
        scene.modify_node(sink, move |node| {
            if let Some(s) = node.as_mesh_sink_mut() {
                s.set_display_node_id(Some(link));
            }
        })?;
        log::debug!("created display node {id} for {sink}");
        Ok(id)
    }
}

fn check_trajectory(scene: &Scene, id: &NodeId) -> Result<Trajectory> {
    let node = scene
        .get(id)
        .ok_or_else(|| PlannerError::NodeNotFound(id.to_string()))?;
    node.as_trajectory()
        .map(Trajectory::from_source)
        .ok_or_else(|| PlannerError::NodeTypeMismatch {
            id: id.to_string(),
            expected: "trajectory source",
        })
}

fn check_sink(scene: &Scene, id: &NodeId) -> Result<()> {
    let node = scene
        .get(id)
        .ok_or_else(|| PlannerError::NodeNotFound(id.to_string()))?;
    if node.as_mesh_sink().is_some() {
        Ok(())
    } else {
        Err(PlannerError::NodeTypeMismatch {
            id: id.to_string(),
            expected: "mesh sink",
        })
    }
}
