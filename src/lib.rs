// Core module with renderer-facing data
pub mod core;

// Player module with input, locomotion, animation and camera
pub mod player;

// Frame driver and host seams
pub mod controller;
pub mod handoff;
pub mod rig;

// Other modules
pub mod constants;
pub mod error;
pub mod utils;

// Re-exports
pub use constants::*;
pub use controller::{CharacterController, FrameOutput};
pub use self::core::CameraUniform;
pub use error::{Error, Result, RigError, SettingsError};
pub use handoff::{InputReceiver, InputSender, SharedFrame, input_channel};
pub use player::{
    AnimationState, CameraPose, CharacterPose, InputEvent, InputState, Key, OrbitCamera,
};
pub use rig::{CharacterRig, ClipPlayback, LoopMode, SceneAnchor};
pub use utils::settings::{ControllerSettings, load_or_default, load_settings, save_settings};
