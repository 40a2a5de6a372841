use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::SettingsError;

pub const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ControllerSettings {
    #[serde(default)]
    pub locomotion: LocomotionSettings,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub animation: AnimationSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LocomotionSettings {
    /// Units per reference frame.
    pub walk_speed: f32,
    pub run_multiplier: f32,
    /// Fraction of the remaining facing error closed each frame, in (0, 1].
    pub rotation_speed: f32,
    pub jump_force: f32,
    /// Units per reference frame, per second.
    pub gravity: f32,
    pub jump_cooldown: f32,
    pub reference_fps: f32,
    pub max_frame_delta: f32,
    /// Clamp horizontal position to `[-arena_half_size, arena_half_size]`.
    pub clamp_to_arena: bool,
    pub arena_half_size: f32,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            walk_speed: PLAYER_WALK_SPEED,
            run_multiplier: PLAYER_RUN_MULTIPLIER,
            rotation_speed: PLAYER_ROTATION_SPEED,
            jump_force: PLAYER_JUMP_FORCE,
            gravity: PLAYER_GRAVITY,
            jump_cooldown: PLAYER_JUMP_COOLDOWN,
            reference_fps: REFERENCE_FPS,
            max_frame_delta: MAX_FRAME_DELTA,
            clamp_to_arena: true,
            arena_half_size: ARENA_HALF_SIZE,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraSettings {
    pub start_yaw: f32,
    pub start_pitch: f32,
    pub start_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub look_sensitivity: f32,
    pub zoom_sensitivity: f32,
    /// Per-frame lerp factor from current to target distance.
    pub zoom_ease: f32,
    pub pivot_height: f32,
    pub look_height: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            start_yaw: CAMERA_START_YAW,
            start_pitch: CAMERA_START_PITCH,
            start_distance: CAMERA_START_DISTANCE,
            min_distance: CAMERA_MIN_DISTANCE,
            max_distance: CAMERA_MAX_DISTANCE,
            min_pitch: CAMERA_MIN_PITCH,
            max_pitch: CAMERA_MAX_PITCH,
            look_sensitivity: CAMERA_LOOK_SENSITIVITY,
            zoom_sensitivity: CAMERA_ZOOM_SENSITIVITY,
            zoom_ease: CAMERA_ZOOM_EASE,
            pivot_height: CAMERA_PIVOT_HEIGHT,
            look_height: CAMERA_LOOK_HEIGHT,
            fov_degrees: CAMERA_FOV_DEGREES,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnimationSettings {
    pub fade_duration: f32,
    pub clips: ClipNames,
    pub time_scales: TimeScales,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            fade_duration: ANIMATION_FADE_DURATION,
            clips: ClipNames::default(),
            time_scales: TimeScales::default(),
        }
    }
}

/// Clip names looked up in the rig for each animation state.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClipNames {
    pub idle: String,
    pub walk: String,
    pub run: String,
    pub jump: String,
}

impl Default for ClipNames {
    fn default() -> Self {
        Self {
            idle: "idle".to_string(),
            walk: "walk".to_string(),
            run: "run".to_string(),
            jump: "jump".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TimeScales {
    pub idle: f32,
    pub walk: f32,
    pub run: f32,
    pub jump: f32,
}

impl Default for TimeScales {
    fn default() -> Self {
        Self {
            idle: IDLE_TIME_SCALE,
            walk: WALK_TIME_SCALE,
            run: RUN_TIME_SCALE,
            jump: JUMP_TIME_SCALE,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ControlsSettings {
    #[serde(default)]
    pub keybinds: Keybinds,
}

/// Raw key codes, in `KeyboardEvent.code` form, bound to each logical key.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Keybinds {
    pub forward: String,
    pub back: String,
    pub left: String,
    pub right: String,
    pub jump: String,
    pub run: String,
    pub camera_toggle: String,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            forward: "KeyW".to_string(),
            back: "KeyS".to_string(),
            left: "KeyA".to_string(),
            right: "KeyD".to_string(),
            jump: "Space".to_string(),
            run: "ShiftLeft".to_string(),
            camera_toggle: "KeyC".to_string(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn require_finite(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a finite number, got {value}")))
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a positive number, got {value}")))
    }
}

impl ControllerSettings {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let loco = &self.locomotion;
        require_positive("locomotion.walk_speed", loco.walk_speed)?;
        require_positive("locomotion.run_multiplier", loco.run_multiplier)?;
        require_positive("locomotion.gravity", loco.gravity)?;
        require_positive("locomotion.jump_force", loco.jump_force)?;
        require_positive("locomotion.reference_fps", loco.reference_fps)?;
        require_positive("locomotion.max_frame_delta", loco.max_frame_delta)?;
        if !(loco.rotation_speed > 0.0 && loco.rotation_speed <= 1.0) {
            return Err(invalid(
                "locomotion.rotation_speed",
                format!("must be in (0, 1], got {}", loco.rotation_speed),
            ));
        }
        if !(loco.jump_cooldown.is_finite() && loco.jump_cooldown >= 0.0) {
            return Err(invalid("locomotion.jump_cooldown", "must not be negative"));
        }
        if loco.clamp_to_arena {
            require_positive("locomotion.arena_half_size", loco.arena_half_size)?;
        }

        let cam = &self.camera;
        require_finite("camera.start_yaw", cam.start_yaw)?;
        require_finite("camera.start_pitch", cam.start_pitch)?;
        require_finite("camera.start_distance", cam.start_distance)?;
        require_positive("camera.min_distance", cam.min_distance)?;
        require_finite("camera.max_distance", cam.max_distance)?;
        if !(cam.max_distance >= cam.min_distance) {
            return Err(invalid(
                "camera.max_distance",
                "must not be smaller than camera.min_distance",
            ));
        }
        if !(cam.min_pitch > 0.0
            && cam.min_pitch < cam.max_pitch
            && cam.max_pitch < std::f32::consts::FRAC_PI_2)
        {
            return Err(invalid(
                "camera.min_pitch",
                format!(
                    "pitch range must satisfy 0 < min < max < pi/2, got [{}, {}]",
                    cam.min_pitch, cam.max_pitch
                ),
            ));
        }
        require_finite("camera.look_sensitivity", cam.look_sensitivity)?;
        require_finite("camera.zoom_sensitivity", cam.zoom_sensitivity)?;
        if !(cam.zoom_ease > 0.0 && cam.zoom_ease <= 1.0) {
            return Err(invalid("camera.zoom_ease", "must be in (0, 1]"));
        }
        require_finite("camera.pivot_height", cam.pivot_height)?;
        require_finite("camera.look_height", cam.look_height)?;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(invalid(
                "camera.fov_degrees",
                format!("must be in (0, 180), got {}", cam.fov_degrees),
            ));
        }
        require_positive("camera.near", cam.near)?;
        require_finite("camera.far", cam.far)?;
        if !(cam.far > cam.near) {
            return Err(invalid("camera.far", "must be greater than camera.near"));
        }

        let anim = &self.animation;
        require_positive("animation.fade_duration", anim.fade_duration)?;
        require_positive("animation.time_scales.idle", anim.time_scales.idle)?;
        require_positive("animation.time_scales.walk", anim.time_scales.walk)?;
        require_positive("animation.time_scales.run", anim.time_scales.run)?;
        require_positive("animation.time_scales.jump", anim.time_scales.jump)?;
        Ok(())
    }
}

/// Default settings location, e.g. `~/.config/arena-controller/settings.toml`.
pub fn default_settings_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "arena-controller")
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
}

pub fn load_settings(path: &Path) -> Result<ControllerSettings, SettingsError> {
    let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: ControllerSettings =
        toml::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    settings.validate()?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &ControllerSettings) -> Result<(), SettingsError> {
    let text = toml::to_string_pretty(settings)?;
    let io_err = |source: std::io::Error| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, text).map_err(io_err)?;
    Ok(())
}

/// Load settings from `path`, or the default location when `None`.
///
/// A missing file is not an error: the built-in defaults are used.
pub fn load_or_default(path: Option<&Path>) -> Result<ControllerSettings, SettingsError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_settings_path() {
            Some(path) => path,
            None => {
                tracing::debug!("No config directory available, using default settings");
                return Ok(ControllerSettings::default());
            }
        },
    };

    if !path.exists() {
        tracing::info!("No settings at {}, using defaults", path.display());
        return Ok(ControllerSettings::default());
    }

    let settings = load_settings(&path)?;
    tracing::info!("Loaded settings from {}", path.display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ControllerSettings::default().validate().unwrap();
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let text = r#"
            [locomotion]
            walk_speed = 0.15

            [controls.keybinds]
            jump = "KeyJ"
        "#;
        let settings: ControllerSettings = toml::from_str(text).unwrap();
        assert_eq!(settings.locomotion.walk_speed, 0.15);
        assert_eq!(settings.locomotion.gravity, PLAYER_GRAVITY);
        assert_eq!(settings.controls.keybinds.jump, "KeyJ");
        assert_eq!(settings.controls.keybinds.forward, "KeyW");
        assert_eq!(settings.camera, CameraSettings::default());
    }

    #[test]
    fn rejects_inverted_pitch_range() {
        let mut settings = ControllerSettings::default();
        settings.camera.min_pitch = 1.0;
        settings.camera.max_pitch = 0.5;
        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "camera.min_pitch",
                ..
            }
        ));
    }

    #[test]
    fn rejects_pitch_reaching_vertical() {
        let mut settings = ControllerSettings::default();
        settings.camera.max_pitch = std::f32::consts::FRAC_PI_2;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn nan_values_are_rejected_on_load() {
        let cases = [
            ("camera", "max_distance"),
            ("camera", "look_sensitivity"),
            ("camera", "fov_degrees"),
            ("camera", "pivot_height"),
            ("locomotion", "rotation_speed"),
            ("animation.time_scales", "run"),
        ];
        for (index, (table, field)) in cases.iter().enumerate() {
            let path = std::env::temp_dir().join(format!(
                "arena-controller-nan-{}-{}.toml",
                std::process::id(),
                index
            ));
            fs::write(&path, format!("[{table}]\n{field} = nan\n")).unwrap();
            let err = load_settings(&path).unwrap_err();
            let _ = fs::remove_file(&path);
            assert!(
                matches!(err, SettingsError::Invalid { .. }),
                "{table}.{field} = nan was accepted: {err:?}"
            );
        }
    }

    #[test]
    fn infinite_max_distance_is_rejected() {
        let mut settings = ControllerSettings::default();
        settings.camera.max_distance = f32::INFINITY;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_zero_rotation_speed() {
        let mut settings = ControllerSettings::default();
        settings.locomotion.rotation_speed = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn save_then_load_preserves_tuning() {
        let dir = std::env::temp_dir().join(format!("arena-controller-{}", std::process::id()));
        let path = dir.join(SETTINGS_FILE_NAME);

        let mut settings = ControllerSettings::default();
        settings.locomotion.clamp_to_arena = false;
        settings.animation.clips.idle = "Idle".to_string();
        save_settings(&path, &settings).unwrap();

        let loaded = load_settings(&path).unwrap();
        assert_eq!(loaded, settings);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_explicit_path_uses_defaults() {
        let path = Path::new("/nonexistent/arena-controller/settings.toml");
        let settings = load_or_default(Some(path)).unwrap();
        assert_eq!(settings, ControllerSettings::default());
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let path = std::env::temp_dir().join(format!(
            "arena-controller-bad-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "[locomotion\nwalk_speed = ").unwrap();
        let err = load_settings(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        let _ = fs::remove_file(&path);
    }
}
