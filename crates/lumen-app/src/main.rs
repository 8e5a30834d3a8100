//! Headless demo of the Lumen graph viewer.
//!
//! Generates a seeded synthetic graph, lays it out on a worker thread and
//! runs a scripted session (fly forward, focus a node, switch presets)
//! while logging per-second statistics.
//! Run with `cargo run -p lumen-app -- --nodes 5000 --frames 900`.

use std::process::ExitCode;

use clap::Parser;
use glam::Vec2;
use lumen_app::{LayoutWorker, Viewer, ViewerError, random_layout, synthetic_graph};
use lumen_camera::RawKeyEvent;
use lumen_config::{CliArgs, Config, default_config_dir};
use lumen_scene::EntityId;
use tracing::{error, info, warn};
use winit::keyboard::KeyCode;

const FRAME_MS: f64 = 1000.0 / 60.0;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    lumen_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("viewer session failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, args: &CliArgs) -> Result<(), ViewerError> {
    config.validate()?;
    let mut viewer = Viewer::new(config)?;
    viewer.set_viewport(1280.0, 720.0);
    viewer.attach_layout_worker(LayoutWorker::spawn(random_layout));
    viewer.request_layout(synthetic_graph(args.nodes, config.render.space_size, args.seed))?;
    info!(nodes = args.nodes, seed = args.seed, "layout requested");

    for frame in 0..args.frames {
        let now = frame as f64 * FRAME_MS;
        viewer.between_frames()?;
        script(&mut viewer, frame, now);

        let stats = viewer.frame((FRAME_MS / 1000.0) as f32, now);
        if frame % 60 == 0 {
            info!(
                frame = stats.frame,
                fps = stats.fps,
                mode = %stats.mode,
                nodes_visible = stats.visibility.nodes_visible,
                edges_visible = stats.visibility.edges_visible,
                labels = stats.labels,
                draw_items = stats.draw_items,
                tiers = ?stats.tiers,
                geometries = stats.resources.geometries,
                materials = stats.resources.materials,
                pending = viewer.ingest_pending(),
                "{}",
                viewer.status_line()
            );
            if let Some(report) = viewer.profiler_report() {
                info!("profile {report}");
            }
        }
    }

    let released = viewer.teardown();
    info!(
        geometries = released.geometries,
        materials = released.materials,
        live = viewer.registry().resources().counts().total(),
        "session finished"
    );
    Ok(())
}

/// Timed input for the headless session.
fn script(viewer: &mut Viewer, frame: u64, now: f64) {
    match frame {
        30 => viewer.key_event(RawKeyEvent::pressed(KeyCode::KeyW), now),
        90 => viewer.key_event(RawKeyEvent::released(KeyCode::KeyW), now),
        120 => {
            if let Err(e) = viewer.focus_on_object(&EntityId::from("n0"), now) {
                warn!("focus skipped: {e}");
            }
        }
        200 => switch_preset(viewer, "quality"),
        300 => switch_preset(viewer, "performance"),
        400 => switch_preset(viewer, "standard"),
        450 => {
            if viewer.click(Vec2::ZERO).is_some() {
                match viewer.selection_json() {
                    Ok(Some(json)) => info!("selected {json}"),
                    Ok(None) => {}
                    Err(e) => warn!("selection encoding failed: {e}"),
                }
                viewer.key_event(RawKeyEvent::pressed(KeyCode::KeyF), now);
                viewer.key_event(RawKeyEvent::released(KeyCode::KeyF), now);
            }
        }
        500 => viewer.clear_selection(),
        _ => {}
    }
}

fn switch_preset(viewer: &mut Viewer, name: &str) {
    match viewer.set_quality_preset(name) {
        Ok(change) => info!(mode = %change.mode, rebuilt = change.rebuilt, "preset switched"),
        Err(e) => warn!("preset {name} rejected: {e}"),
    }
}
