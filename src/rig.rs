//! Seams to the host's scene graph and animation mixer.
//!
//! The controller never creates clips or scene nodes. A host hands over a
//! [`CharacterRig`] once its model has loaded and the controller drives it
//! through [`SceneAnchor`] and [`ClipPlayback`].

use glam::Vec3;

/// Loop behaviour for a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Repeat,
    /// Play once and hold the last frame.
    Once,
}

/// Playback handle for one animation clip, owned by the host's mixer.
pub trait ClipPlayback {
    fn play(&mut self);
    /// Rewind to the first frame.
    fn reset(&mut self);
    fn fade_in(&mut self, duration: f32);
    fn fade_out(&mut self, duration: f32);
    fn set_time_scale(&mut self, scale: f32);
    fn set_loop(&mut self, mode: LoopMode);
}

/// The renderable node the character model hangs from.
pub trait SceneAnchor {
    fn set_transform(&mut self, position: Vec3, yaw: f32);
}

/// A loaded character model: scene anchor plus its named clips.
pub struct CharacterRig<A, H> {
    pub anchor: A,
    pub clips: Vec<(String, H)>,
}

impl<A, H> CharacterRig<A, H> {
    pub fn new<N: Into<String>>(anchor: A, clips: impl IntoIterator<Item = (N, H)>) -> Self {
        CharacterRig {
            anchor,
            clips: clips
                .into_iter()
                .map(|(name, handle)| (name.into(), handle))
                .collect(),
        }
    }
}

// ============================================================================
// Headless rig, for tools and tests that run without a renderer
// ============================================================================

/// A command issued to a [`ClipPlayback`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipCommand {
    Play,
    Reset,
    FadeIn(f32),
    FadeOut(f32),
    SetTimeScale(f32),
    SetLoop(LoopMode),
}

/// Commands a [`HeadlessClip`] keeps before dropping the oldest half.
pub const HEADLESS_CLIP_HISTORY: usize = 256;

/// Clip handle that records and traces the commands it receives.
///
/// Only the most recent commands are kept, at most [`HEADLESS_CLIP_HISTORY`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessClip {
    name: String,
    commands: Vec<ClipCommand>,
}

impl HeadlessClip {
    pub fn new(name: impl Into<String>) -> Self {
        HeadlessClip {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &[ClipCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn count(&self, matches: impl Fn(&ClipCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| matches(c)).count()
    }

    fn record(&mut self, command: ClipCommand) {
        tracing::trace!(clip = %self.name, ?command, "Clip command");
        if self.commands.len() >= HEADLESS_CLIP_HISTORY {
            self.commands.drain(..HEADLESS_CLIP_HISTORY / 2);
        }
        self.commands.push(command);
    }
}

impl ClipPlayback for HeadlessClip {
    fn play(&mut self) {
        self.record(ClipCommand::Play);
    }

    fn reset(&mut self) {
        self.record(ClipCommand::Reset);
    }

    fn fade_in(&mut self, duration: f32) {
        self.record(ClipCommand::FadeIn(duration));
    }

    fn fade_out(&mut self, duration: f32) {
        self.record(ClipCommand::FadeOut(duration));
    }

    fn set_time_scale(&mut self, scale: f32) {
        self.record(ClipCommand::SetTimeScale(scale));
    }

    fn set_loop(&mut self, mode: LoopMode) {
        self.record(ClipCommand::SetLoop(mode));
    }
}

/// Scene anchor that keeps the last transform it was given.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadlessAnchor {
    pub position: Vec3,
    pub yaw: f32,
    pub updates: u64,
}

impl SceneAnchor for HeadlessAnchor {
    fn set_transform(&mut self, position: Vec3, yaw: f32) {
        self.position = position;
        self.yaw = yaw;
        self.updates += 1;
    }
}

/// A headless rig with one clip per name, e.g. `["idle", "walk", "run", "jump"]`.
pub fn headless_rig(names: &[&str]) -> CharacterRig<HeadlessAnchor, HeadlessClip> {
    CharacterRig::new(
        HeadlessAnchor::default(),
        names.iter().map(|name| (*name, HeadlessClip::new(*name))),
    )
}
