//! Planner Demo
//!
//! Places an ablation volume on a probe trajectory, moves the probe and
//! writes the resulting volume to a PLY file.
//!
//! An optional argument names a JSON options file:
//!
//! ```json
//! { "major_axis": 40.0, "minor_axis": 25.0, "tip_offset": 5.0 }
//! ```
//!
//! Run with: cargo run --example planner_demo -- [options.json]

use ablation_planner::*;

fn main() -> Result<()> {
    init_logging();

    let options = match std::env::args().nth(1) {
        Some(path) => PlannerOptions::load(path)?,
        None => PlannerOptions::default(),
    };
    let mut planner = AblationPlanner::with_options(&options)?;

    let mut scene = Scene::new();
    let probe = scene.add_node(Box::new(RulerNode::new(
        "probe",
        Vec3::new(10.0, 20.0, 30.0),
        Vec3::new(-40.0, 60.0, 90.0),
    )));
    let model = scene.create_node(Box::new(ModelNode::new("ablation volume")));

    planner.on_trajectory_selected(&mut scene, Some(probe.clone()))?;
    planner.on_sink_selected(&mut scene, Some(model))?;
    report(&planner.set_update_enabled(&mut scene, true)?);

    // Advance the probe by 5 mm along its own direction
    scene.modify::<RulerNode, _>(&probe, |ruler| {
        let direction = (ruler.position1() - ruler.position2()).normalize_or_zero();
        ruler.set_position1(ruler.position1() + 5.0 * direction);
    })?;
    if let Some(outcome) = planner.process_notifications(&mut scene)? {
        report(&outcome);
    }

    let path = std::env::temp_dir().join("ablation_volume.ply");
    let bytes = planner.export_volume(&scene, &path)?;
    println!("wrote {} ({bytes} bytes)", path.display());

    planner.release(&mut scene);
    Ok(())
}

fn report(outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::Rebuilt(summary) => println!(
            "volume at {} along {}: {} vertices, {} triangles",
            summary.center,
            summary.major_axis_direction,
            summary.num_vertices,
            summary.num_triangles
        ),
        UpdateOutcome::Skipped(reason) => println!("update skipped: {reason:?}"),
    }
}
