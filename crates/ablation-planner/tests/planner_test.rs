//! Integration tests for the ablation planner.
//!
//! Each test builds its own scene, so they are independent of one another.

use ablation_planner::*;
use proptest::prelude::*;

struct Setup {
    scene: Scene,
    ruler: NodeId,
    model: NodeId,
    planner: AblationPlanner,
}

fn setup(tip: Vec3, tail: Vec3) -> Setup {
    init_logging();
    let mut scene = Scene::new();
    let ruler = scene.add_node(Box::new(RulerNode::new("probe", tip, tail)));
    let model = scene.create_node(Box::new(ModelNode::new("ablation volume")));
    let mut planner = AblationPlanner::new();
    planner
        .on_trajectory_selected(&mut scene, Some(ruler.clone()))
        .expect("select trajectory");
    planner
        .on_sink_selected(&mut scene, Some(model.clone()))
        .expect("select model");
    Setup {
        scene,
        ruler,
        model,
        planner,
    }
}

fn published_mesh(scene: &Scene, model: &NodeId) -> Option<TriMesh> {
    scene
        .get(model)
        .and_then(|n| n.as_mesh_sink())
        .and_then(|m| m.mesh())
        .cloned()
}

fn modified_count(scene: &Scene, model: &NodeId) -> u64 {
    scene
        .get(model)
        .and_then(|n| n.as_mesh_sink())
        .map_or(0, |m| m.modified_count())
}

#[test]
fn test_end_to_end_volume() {
    let mut s = setup(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0));
    let outcome = s.planner.set_update_enabled(&mut s.scene, true).unwrap();

    let summary = *outcome.summary().unwrap();
    assert!(summary.center.length() < 1e-6);
    assert!((summary.major_axis_direction - Vec3::Z).length() < 1e-6);
    assert_eq!(summary.num_vertices, 362);
    assert_eq!(summary.num_triangles, 720);

    // The model was created detached and is attached on first publish
    assert!(s.scene.is_attached(&s.model));

    let mesh = published_mesh(&s.scene, &s.model).unwrap();
    let (min, max) = mesh.bounding_box().unwrap();
    assert!((max.z - 30.0).abs() < 1e-4);
    assert!((min.z + 30.0).abs() < 1e-4);
    assert!(max.x < 20.0 + 1e-4);
    assert!(mesh.is_closed());
}

#[test]
fn test_disabled_mode_never_mutates_sink() {
    let mut s = setup(Vec3::new(3.0, 1.0, 0.0), Vec3::ZERO);
    s.planner.set_axis_sizes(&mut s.scene, 12.0, 8.0).unwrap();
    s.planner.set_tip_offset(&mut s.scene, 4.0).unwrap();
    s.scene
        .modify::<RulerNode, _>(&s.ruler, |r| r.set_position1(Vec3::new(9.0, 9.0, 9.0)))
        .unwrap();
    let outcome = s.planner.process_notifications(&mut s.scene).unwrap();
    assert_eq!(
        outcome,
        Some(UpdateOutcome::Skipped(SkipReason::UpdateDisabled))
    );

    assert!(published_mesh(&s.scene, &s.model).is_none());
    assert_eq!(modified_count(&s.scene, &s.model), 0);
    assert!(!s.scene.is_attached(&s.model));
    assert!(s.scene.ids_of_type("ModelDisplayNode").is_empty());
}

#[test]
fn test_enabling_rebuilds_once_with_latest_parameters() {
    let mut s = setup(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    s.planner.set_axis_sizes(&mut s.scene, 50.0, 10.0).unwrap();
    s.planner.set_axis_sizes(&mut s.scene, 16.0, 6.0).unwrap();
    s.planner.set_tip_offset(&mut s.scene, 5.0).unwrap();
    assert_eq!(modified_count(&s.scene, &s.model), 0);

    s.planner.set_update_enabled(&mut s.scene, true).unwrap();
    assert_eq!(modified_count(&s.scene, &s.model), 1);
    assert_eq!(s.planner.rebuild_count(), 1);

    let mesh = published_mesh(&s.scene, &s.model).unwrap();
    let (min, max) = mesh.bounding_box().unwrap();
    assert!((max.z - 31.0).abs() < 1e-4);
    assert!((min.z + 1.0).abs() < 1e-4);
}

#[test]
fn test_each_parameter_change_rebuilds_when_enabled() {
    let mut s = setup(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    s.planner.set_update_enabled(&mut s.scene, true).unwrap();
    s.planner.set_axis_sizes(&mut s.scene, 20.0, 10.0).unwrap();
    s.planner.set_tip_offset(&mut s.scene, -2.0).unwrap();
    assert_eq!(s.planner.rebuild_count(), 3);
    assert_eq!(modified_count(&s.scene, &s.model), 3);
    // The unit sphere is tessellated once and reused
    assert_eq!(s.planner.sphere_builds(), 1);

    let mesh = published_mesh(&s.scene, &s.model).unwrap();
    let (_, max) = mesh.bounding_box().unwrap();
    assert!((max.z - 28.0).abs() < 1e-4);
}

#[test]
fn test_trajectory_moves_rebuild_in_one_pass() {
    let mut s = setup(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    s.planner.set_update_enabled(&mut s.scene, true).unwrap();

    for z in [20.0, 30.0, 40.0] {
        s.scene
            .modify::<RulerNode, _>(&s.ruler, |r| r.set_position1(Vec3::new(0.0, 0.0, z)))
            .unwrap();
    }
    let outcome = s.planner.process_notifications(&mut s.scene).unwrap().unwrap();
    assert!((outcome.summary().unwrap().center - Vec3::new(0.0, 0.0, 40.0)).length() < 1e-4);
    assert_eq!(s.planner.rebuild_count(), 2);
}

#[test]
fn test_display_node_defaults_and_slice_toggle() {
    let mut s = setup(Vec3::X, Vec3::ZERO);
    s.planner.set_update_enabled(&mut s.scene, true).unwrap();

    let displays = s.scene.ids_of_type("ModelDisplayNode");
    assert_eq!(displays.len(), 1);
    let display = &displays[0];
    let linked = s
        .scene
        .get(&s.model)
        .and_then(|n| n.as_mesh_sink())
        .and_then(|m| m.display_node_id())
        .cloned();
    assert_eq!(linked.as_ref(), Some(display));

    let node = s.scene.get_as::<ModelDisplayNode>(display).unwrap();
    assert_eq!(node.color(), Vec3::new(0.0, 0.0, 1.0));
    assert!(node.slice_intersection_visible());

    // Turn off automatic update: the policy still reaches the display
    s.planner.set_update_enabled(&mut s.scene, false).unwrap();
    s.planner
        .set_slice_intersection_enabled(&mut s.scene, false)
        .unwrap();
    let node = s.scene.get_as::<ModelDisplayNode>(display).unwrap();
    assert!(!node.slice_intersection_visible());
    assert_eq!(modified_count(&s.scene, &s.model), 1);
}

#[test]
fn test_user_color_is_kept() {
    let mut s = setup(Vec3::X, Vec3::ZERO);
    s.planner.set_update_enabled(&mut s.scene, true).unwrap();
    let display = s.scene.ids_of_type("ModelDisplayNode").remove(0);
    s.scene
        .modify::<ModelDisplayNode, _>(&display, |d| d.set_color(Vec3::new(1.0, 0.5, 0.0)))
        .unwrap();

    s.planner.set_tip_offset(&mut s.scene, 3.0).unwrap();
    let node = s.scene.get_as::<ModelDisplayNode>(&display).unwrap();
    assert_eq!(node.color(), Vec3::new(1.0, 0.5, 0.0));
}

#[test]
fn test_trajectory_remembers_its_model() {
    let mut s = setup(Vec3::X, Vec3::ZERO);
    assert_eq!(
        s.scene.attribute(&s.ruler, VOLUME_MODEL_ATTRIBUTE),
        Some(s.model.as_str())
    );

    // Switching to an unlinked trajectory clears the model, switching back re-binds it
    let other = s
        .scene
        .add_node(Box::new(RulerNode::new("other", Vec3::Y, Vec3::ZERO)));
    s.planner
        .on_trajectory_selected(&mut s.scene, Some(other))
        .unwrap();
    assert_eq!(s.planner.sink_node(), None);

    s.planner
        .on_trajectory_selected(&mut s.scene, Some(s.ruler.clone()))
        .unwrap();
    assert_eq!(s.planner.sink_node(), Some(&s.model));
}

#[test]
fn test_unlinked_trajectory_does_not_take_over_model() {
    let mut s = setup(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    s.planner.set_update_enabled(&mut s.scene, true).unwrap();
    let first_volume = published_mesh(&s.scene, &s.model);

    let other = s.scene.add_node(Box::new(RulerNode::new(
        "other",
        Vec3::new(100.0, 0.0, 0.0),
        Vec3::new(90.0, 0.0, 0.0),
    )));
    let outcome = s
        .planner
        .on_trajectory_selected(&mut s.scene, Some(other.clone()))
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::Skipped(SkipReason::UpdateDisabled));
    assert_eq!(s.planner.sink_node(), None);
    assert!(!s.planner.is_update_enabled());
    assert_eq!(published_mesh(&s.scene, &s.model), first_volume);
    assert_eq!(s.scene.attribute(&other, VOLUME_MODEL_ATTRIBUTE), None);

    // The new trajectory gets its own model
    let second = s
        .scene
        .add_node(Box::new(ModelNode::new("second volume")));
    s.planner
        .on_sink_selected(&mut s.scene, Some(second.clone()))
        .unwrap();
    let outcome = s.planner.set_update_enabled(&mut s.scene, true).unwrap();
    assert!((outcome.summary().unwrap().center - Vec3::new(100.0, 0.0, 0.0)).length() < 1e-4);
    assert_eq!(published_mesh(&s.scene, &s.model), first_volume);

    // Going back re-binds the original model
    s.planner
        .on_trajectory_selected(&mut s.scene, Some(s.ruler.clone()))
        .unwrap();
    assert_eq!(s.planner.sink_node(), Some(&s.model));
    assert_eq!(
        s.scene.attribute(&other, VOLUME_MODEL_ATTRIBUTE),
        Some(second.as_str())
    );
}

#[test]
fn test_edits_while_disabled_are_covered_by_enable() {
    let mut s = setup(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    for z in [20.0, 30.0, 40.0] {
        s.scene
            .modify::<RulerNode, _>(&s.ruler, |r| r.set_position1(Vec3::new(0.0, 0.0, z)))
            .unwrap();
    }

    let outcome = s.planner.set_update_enabled(&mut s.scene, true).unwrap();
    assert!((outcome.summary().unwrap().center - Vec3::new(0.0, 0.0, 40.0)).length() < 1e-4);
    assert!(s.planner.process_notifications(&mut s.scene).unwrap().is_none());
    assert_eq!(s.planner.rebuild_count(), 1);
    assert_eq!(modified_count(&s.scene, &s.model), 1);
}

#[test]
fn test_stale_model_link_is_ignored() {
    let mut s = setup(Vec3::X, Vec3::ZERO);
    s.planner.on_trajectory_selected(&mut s.scene, None).unwrap();
    s.planner.on_sink_selected(&mut s.scene, None).unwrap();
    s.scene.remove_node(&s.model);

    s.planner
        .on_trajectory_selected(&mut s.scene, Some(s.ruler.clone()))
        .unwrap();
    assert_eq!(s.planner.sink_node(), None);
}

#[test]
fn test_removing_nodes_unbinds_them() {
    let mut s = setup(Vec3::X, Vec3::ZERO);
    s.planner.set_update_enabled(&mut s.scene, true).unwrap();

    s.scene.remove_node(&s.ruler);
    let outcome = s.planner.process_notifications(&mut s.scene).unwrap();
    assert_eq!(
        outcome,
        Some(UpdateOutcome::Skipped(SkipReason::UpdateDisabled))
    );
    assert_eq!(s.planner.trajectory_node(), None);
    assert!(!s.planner.is_update_enabled());

    s.scene.remove_node(&s.model);
    s.planner.process_notifications(&mut s.scene).unwrap();
    assert_eq!(s.planner.sink_node(), None);
    assert!(s.planner.process_notifications(&mut s.scene).unwrap().is_none());
}

#[test]
fn test_degenerate_trajectory_is_reported() {
    let mut s = setup(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    s.planner.set_update_enabled(&mut s.scene, true).unwrap();
    let before = published_mesh(&s.scene, &s.model);

    s.scene
        .modify::<RulerNode, _>(&s.ruler, |r| r.set_positions(Vec3::ONE, Vec3::ONE))
        .unwrap();
    let result = s.planner.process_notifications(&mut s.scene);
    assert!(matches!(
        result,
        Err(PlannerError::DegenerateTrajectory { .. })
    ));
    assert_eq!(published_mesh(&s.scene, &s.model), before);
    assert_eq!(modified_count(&s.scene, &s.model), 1);
}

#[test]
fn test_anti_parallel_trajectory() {
    let mut s = setup(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO);
    let outcome = s.planner.set_update_enabled(&mut s.scene, true).unwrap();
    let summary = outcome.summary().unwrap();
    assert!((summary.major_axis_direction - Vec3::NEG_Z).length() < 1e-5);
    assert!((summary.center - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-5);
}

#[test]
fn test_export_volume_to_ply() {
    let mut s = setup(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    let path = std::env::temp_dir().join(format!(
        "ablation_planner_test_{}.ply",
        std::process::id()
    ));
    assert!(s.planner.export_volume(&s.scene, &path).is_err());

    s.planner.set_update_enabled(&mut s.scene, true).unwrap();
    s.planner.export_volume(&s.scene, &path).unwrap();

    let loaded = load_ply(&path).unwrap();
    let published = published_mesh(&s.scene, &s.model).unwrap();
    assert_eq!(loaded.triangles(), published.triangles());
    assert_eq!(loaded.num_vertices(), published.num_vertices());
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_planner_from_json_options() {
    let options = PlannerOptions::from_json_str(
        r#"{ "major_axis": 10.0, "minor_axis": 4.0, "automatic_update": true }"#,
    )
    .unwrap();
    let mut planner = AblationPlanner::with_options(&options).unwrap();

    let mut scene = Scene::new();
    let ruler = scene.add_node(Box::new(RulerNode::new("probe", Vec3::Z, Vec3::ZERO)));
    let model = scene.add_node(Box::new(ModelNode::new("volume")));
    planner.on_trajectory_selected(&mut scene, Some(ruler)).unwrap();
    let outcome = planner.on_sink_selected(&mut scene, Some(model)).unwrap();
    assert!(outcome.is_rebuilt());
    assert_eq!(planner.parameters().tip_offset, 0.0);
}

proptest! {
    #[test]
    fn prop_disabled_planner_ignores_parameter_changes(
        changes in proptest::collection::vec((1.0f32..100.0, 1.0f32..100.0, -20.0f32..20.0), 1..10)
    ) {
        let mut s = setup(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        for (major, minor, offset) in &changes {
            s.planner.set_axis_sizes(&mut s.scene, *major, *minor).unwrap();
            s.planner.set_tip_offset(&mut s.scene, *offset).unwrap();
        }
        prop_assert!(published_mesh(&s.scene, &s.model).is_none());
        prop_assert_eq!(modified_count(&s.scene, &s.model), 0);

        let (major, minor, offset) = changes[changes.len() - 1];
        s.planner.set_update_enabled(&mut s.scene, true).unwrap();
        prop_assert_eq!(s.planner.rebuild_count(), 1);
        prop_assert_eq!(
            s.planner.parameters(),
            VolumeParameters::new(major, minor, offset).unwrap()
        );
    }

    #[test]
    fn prop_sphere_volume_has_constant_radius(
        r in 1.0f32..50.0,
        tip in (-20.0f32..20.0, -20.0f32..20.0, -20.0f32..20.0),
    ) {
        let tip = Vec3::new(tip.0, tip.1, tip.2);
        let tail = tip - Vec3::new(1.0, 2.0, 2.0);
        let mut s = setup(tip, tail);
        s.planner.set_axis_sizes(&mut s.scene, r, r).unwrap();
        s.planner.set_update_enabled(&mut s.scene, true).unwrap();

        let mesh = published_mesh(&s.scene, &s.model).unwrap();
        for v in mesh.vertices() {
            prop_assert!(((*v - tip).length() - r).abs() < 1e-3 * r);
        }
    }
}
