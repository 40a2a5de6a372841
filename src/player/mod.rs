//! Player-related modules
//! Contains input tracking, locomotion, animation selection and the orbit camera.

pub mod animation;
pub mod camera;
pub mod input;
pub mod locomotion;

// Re-export commonly used types
pub use animation::{AnimationSelector, AnimationState, ClipBinding, CrossFade};
pub use camera::{CameraPose, OrbitCamera};
pub use input::{InputEvent, InputState, InputTracker, Key, KeyBindings, KeyPress};
pub use locomotion::{CharacterPose, Locomotion, LocomotionStep};
