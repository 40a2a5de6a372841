// Arena constants
pub const ARENA_SIZE: f32 = 256.0;
pub const ARENA_HALF_SIZE: f32 = ARENA_SIZE / 2.0;
pub const FLOOR_HEIGHT: f32 = 0.0;

// Frame timing
pub const REFERENCE_FPS: f32 = 60.0;
pub const MAX_FRAME_DELTA: f32 = 0.1;

// Player constants (speeds are in units per reference frame)
pub const PLAYER_WALK_SPEED: f32 = 0.2;
pub const PLAYER_RUN_SPEED: f32 = 0.3;
pub const PLAYER_RUN_MULTIPLIER: f32 = PLAYER_RUN_SPEED / PLAYER_WALK_SPEED;
pub const PLAYER_ROTATION_SPEED: f32 = 0.3;
pub const PLAYER_JUMP_FORCE: f32 = 0.3;
pub const PLAYER_GRAVITY: f32 = 2.0;
pub const PLAYER_JUMP_COOLDOWN: f32 = 0.5;

// Animation constants
pub const ANIMATION_FADE_DURATION: f32 = 0.2;
pub const IDLE_TIME_SCALE: f32 = 1.0;
pub const WALK_TIME_SCALE: f32 = 1.2;
pub const RUN_TIME_SCALE: f32 = 1.5;
pub const JUMP_TIME_SCALE: f32 = 1.5;
/// Clips with this name are bind poses, never animations.
pub const BIND_POSE_CLIP: &str = "TPose";

// Camera constants
pub const CAMERA_START_YAW: f32 = std::f32::consts::PI;
pub const CAMERA_START_PITCH: f32 = std::f32::consts::FRAC_PI_4;
pub const CAMERA_START_DISTANCE: f32 = 10.0;
pub const CAMERA_MIN_DISTANCE: f32 = 5.0;
pub const CAMERA_MAX_DISTANCE: f32 = 20.0;
pub const CAMERA_MIN_PITCH: f32 = 0.1;
pub const CAMERA_MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.1;
pub const CAMERA_LOOK_SENSITIVITY: f32 = 0.004;
pub const CAMERA_ZOOM_SENSITIVITY: f32 = 0.01;
pub const CAMERA_ZOOM_EASE: f32 = 0.1;
pub const CAMERA_PIVOT_HEIGHT: f32 = 1.0;
pub const CAMERA_LOOK_HEIGHT: f32 = 4.0;

// Projection constants
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
