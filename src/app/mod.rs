//! Headless driver: replays scripted input against a logging rig.
//!
//! The real hosts are browser and winit front-ends; this binary exists to
//! tune settings and check movement without a window.

mod script;

use std::path::PathBuf;

use arena_controller::rig::{HeadlessAnchor, HeadlessClip, headless_rig};
use arena_controller::{
    CharacterController, ControllerSettings, InputEvent, RigError, SettingsError, load_or_default,
    save_settings,
};
use clap::Parser;

use script::{Action, ScriptError, parse_script};

/// Arena character controller, headless
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings to this path and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,

    /// Simulated frame rate
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Input script, e.g. "KeyW@1.0;KeyW+ShiftLeft@0.5;Space@0.6;@0.5"
    #[arg(long, default_value = "capture;KeyW@1.0;KeyW+ShiftLeft@1.0;look=-300:0@0.5;Space@0.8;@0.5")]
    script: String,

    /// Log the character pose every N frames (0 disables)
    #[arg(long, default_value_t = 30)]
    report_every: u64,

    /// Clip names the headless rig exposes
    #[arg(long, value_delimiter = ',', default_value = "TPose,idle,walk,run,jump")]
    clips: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Rig(#[from] RigError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("--fps must be a positive number, got {0}")]
    Fps(f32),
}

pub fn run() -> Result<(), AppError> {
    let args = Args::parse();

    let settings = load_or_default(args.config.as_deref())?;
    settings.validate()?;

    if let Some(path) = &args.dump_config {
        save_settings(path, &settings)?;
        tracing::info!("Settings written to {}", path.display());
        return Ok(());
    }

    if !(args.fps.is_finite() && args.fps > 0.0) {
        return Err(AppError::Fps(args.fps));
    }

    let steps = parse_script(&args.script)?;
    tracing::info!("Running {} script steps at {} fps", steps.len(), args.fps);

    let names: Vec<&str> = args.clips.iter().map(String::as_str).collect();
    let mut controller = build_controller(settings, &names)?;

    let dt = 1.0 / args.fps;
    for (index, step) in steps.iter().enumerate() {
        tracing::debug!("Step {}: {:?} for {}s", index + 1, step.actions, step.seconds);

        for action in &step.actions {
            match action {
                Action::Hold(code) => controller.handle_event(&InputEvent::KeyDown(code.clone())),
                Action::Look { dx, dy } => controller.on_pointer_move(*dx, *dy),
                Action::Zoom(delta) => controller.on_wheel(*delta),
                Action::Capture(captured) => controller.set_pointer_captured(*captured),
            }
        }

        let frames = (step.seconds * args.fps).round() as u64;
        for _ in 0..frames {
            let Some(out) = controller.update(dt) else {
                continue;
            };
            if args.report_every > 0 && controller.frame() % args.report_every == 0 {
                tracing::info!(
                    frame = controller.frame(),
                    "pos=({:.2}, {:.2}, {:.2}) yaw={:.2} anim={:?} grounded={} cam_dist={:.2}",
                    out.character.position.x,
                    out.character.position.y,
                    out.character.position.z,
                    out.character.yaw,
                    out.animation,
                    out.grounded,
                    controller.camera().distance()
                );
            }
        }

        for code in step.held_keys() {
            controller.on_key_up(code);
        }
    }

    let pose = controller.locomotion().pose();
    tracing::info!(
        "Finished after {} frames at ({:.3}, {:.3}, {:.3}), yaw {:.3}",
        controller.frame(),
        pose.position.x,
        pose.position.y,
        pose.position.z,
        pose.yaw
    );
    Ok(())
}

fn build_controller(
    settings: ControllerSettings,
    clips: &[&str],
) -> Result<CharacterController<HeadlessAnchor, HeadlessClip>, RigError> {
    let mut controller = CharacterController::new(settings);
    controller.attach_rig(headless_rig(clips))?;
    Ok(controller)
}
