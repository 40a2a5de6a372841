//! Frame driver tying input, locomotion, animation and camera together.

use glam::Vec3;

use crate::error::RigError;
use crate::handoff::InputReceiver;
use crate::player::animation::{AnimationSelector, AnimationState, ClipBinding};
use crate::player::camera::{CameraPose, OrbitCamera};
use crate::player::input::{InputEvent, InputTracker, Key, KeyBindings};
use crate::player::locomotion::{CharacterPose, Locomotion};
use crate::rig::{CharacterRig, ClipPlayback, SceneAnchor};
use crate::utils::settings::ControllerSettings;

/// Everything the renderer needs after one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    pub character: CharacterPose,
    pub camera: CameraPose,
    pub animation: AnimationState,
    pub grounded: bool,
}

struct AttachedRig<A, H> {
    anchor: A,
    animation: AnimationSelector<H>,
}

pub struct CharacterController<A, H> {
    settings: ControllerSettings,
    input: InputTracker,
    locomotion: Locomotion,
    camera: OrbitCamera,
    rig: Option<AttachedRig<A, H>>,
    frame: u64,
}

impl<A: SceneAnchor, H: ClipPlayback> CharacterController<A, H> {
    pub fn new(settings: ControllerSettings) -> Self {
        Self::with_spawn(settings, Vec3::ZERO, 0.0)
    }

    pub fn with_spawn(settings: ControllerSettings, spawn: Vec3, yaw: f32) -> Self {
        let input = InputTracker::new(KeyBindings::from_keybinds(&settings.controls.keybinds));
        let locomotion = Locomotion::new(settings.locomotion.clone(), spawn, yaw);
        let camera = OrbitCamera::new(settings.camera.clone());
        CharacterController {
            settings,
            input,
            locomotion,
            camera,
            rig: None,
            frame: 0,
        }
    }

    /// Bind a freshly loaded rig. Until this succeeds, updates are no-ops.
    pub fn attach_rig(&mut self, rig: CharacterRig<A, H>) -> Result<(), RigError> {
        let CharacterRig { mut anchor, clips } = rig;
        let binding = ClipBinding::bind(clips, &self.settings.animation.clips)?;
        let animation = AnimationSelector::new(binding, &self.settings.animation);

        let pose = self.locomotion.pose();
        anchor.set_transform(pose.position, pose.yaw);
        self.rig = Some(AttachedRig { anchor, animation });
        tracing::info!("Character rig attached");
        Ok(())
    }

    pub fn detach_rig(&mut self) -> Option<A> {
        self.rig.take().map(|rig| rig.anchor)
    }

    pub fn is_ready(&self) -> bool {
        self.rig.is_some()
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    pub fn locomotion(&self) -> &Locomotion {
        &self.locomotion
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn animation(&self) -> Option<&AnimationSelector<H>> {
        self.rig.as_ref().map(|rig| &rig.animation)
    }

    pub fn anchor(&self) -> Option<&A> {
        self.rig.as_ref().map(|rig| &rig.anchor)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn on_key_down(&mut self, code: &str) {
        let Some(press) = self.input.on_key_down(code) else {
            return;
        };
        if !press.fresh {
            return;
        }

        match press.key {
            Key::Jump if self.rig.is_some() => {
                self.locomotion.try_jump();
            }
            Key::CameraToggle => self.camera.toggle_captured(),
            _ => {}
        }
    }

    pub fn on_key_up(&mut self, code: &str) {
        let Some(key) = self.input.on_key_up(code) else {
            return;
        };
        if key.is_movement() && !self.input.state().any_movement() {
            self.locomotion.stop_horizontal();
        }
    }

    pub fn on_pointer_move(&mut self, dx: f32, dy: f32) {
        self.camera.on_pointer_move(dx, dy);
    }

    pub fn on_wheel(&mut self, delta_y: f32) {
        self.camera.on_wheel(delta_y);
    }

    /// Host gesture result: click acquired the pointer, escape released it.
    pub fn set_pointer_captured(&mut self, captured: bool) {
        self.camera.set_captured(captured);
    }

    /// Window lost focus: key-up events will not arrive for held keys.
    pub fn on_focus_lost(&mut self) {
        self.input.release_all();
        self.locomotion.stop_horizontal();
        self.camera.set_captured(false);
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(code) => self.on_key_down(code),
            InputEvent::KeyUp(code) => self.on_key_up(code),
            InputEvent::PointerMove { dx, dy } => self.on_pointer_move(*dx, *dy),
            InputEvent::Wheel(delta_y) => self.on_wheel(*delta_y),
            InputEvent::PointerCapture(captured) => self.set_pointer_captured(*captured),
        }
    }

    /// Apply every event queued by other threads. Returns how many were applied.
    pub fn drain_events(&mut self, receiver: &InputReceiver) -> usize {
        let mut applied = 0;
        for event in receiver.try_iter() {
            self.handle_event(&event);
            applied += 1;
        }
        applied
    }

    /// Advance one frame. Returns `None` while no rig is attached.
    pub fn update(&mut self, delta: f32) -> Option<FrameOutput> {
        let rig = self.rig.as_mut()?;
        let dt = sanitize_delta(delta, self.settings.locomotion.max_frame_delta);
        let step = self
            .locomotion
            .update(dt, self.input.state(), self.camera.yaw());

        let state = AnimationState::select(step.moving, step.running, step.grounded);
        rig.animation.request(state);
        rig.animation.update(dt);

        let character = self.locomotion.pose();
        rig.anchor.set_transform(character.position, character.yaw);
        let camera = self.camera.update(character.position);

        self.frame += 1;
        if self.frame % 600 == 0 {
            tracing::debug!(
                frame = self.frame,
                "Character at {:?}, {:?}",
                character.position,
                state
            );
        }

        Some(FrameOutput {
            character,
            camera,
            animation: rig.animation.current(),
            grounded: step.grounded,
        })
    }
}

/// Negative and non-finite deltas become zero; long stalls are capped.
fn sanitize_delta(delta: f32, max: f32) -> f32 {
    if delta.is_finite() {
        delta.clamp(0.0, max)
    } else {
        0.0
    }
}
