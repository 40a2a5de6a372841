use glam::{Mat4, Vec3};

use crate::utils::settings::CameraSettings;

/// Camera transform for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn look_direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

/// Third-person camera orbiting the character at (yaw, pitch, distance).
pub struct OrbitCamera {
    yaw: f32,
    pitch: f32,
    distance: f32,
    target_distance: f32,
    captured: bool,
    settings: CameraSettings,
}

impl OrbitCamera {
    pub fn new(settings: CameraSettings) -> Self {
        let pitch = settings
            .start_pitch
            .clamp(settings.min_pitch, settings.max_pitch);
        let distance = settings
            .start_distance
            .clamp(settings.min_distance, settings.max_distance);
        OrbitCamera {
            yaw: settings.start_yaw,
            pitch,
            distance,
            target_distance: distance,
            captured: false,
            settings,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn set_captured(&mut self, captured: bool) {
        if self.captured != captured {
            tracing::debug!("Pointer capture {}", if captured { "on" } else { "off" });
        }
        self.captured = captured;
    }

    pub fn toggle_captured(&mut self) {
        self.set_captured(!self.captured);
    }

    /// Free look from a pointer delta. Ignored unless the pointer is captured.
    pub fn on_pointer_move(&mut self, dx: f32, dy: f32) -> bool {
        if !self.captured || !dx.is_finite() || !dy.is_finite() {
            return false;
        }

        let sensitivity = self.settings.look_sensitivity;
        let yaw = self.yaw - dx * sensitivity;
        let pitch = self.pitch + dy * sensitivity;
        if !yaw.is_finite() || !pitch.is_finite() {
            return false;
        }
        self.yaw = yaw;
        self.pitch = pitch.clamp(self.settings.min_pitch, self.settings.max_pitch);
        true
    }

    pub fn on_wheel(&mut self, delta_y: f32) {
        if !delta_y.is_finite() {
            return;
        }
        self.target_distance = (self.target_distance - delta_y * self.settings.zoom_sensitivity)
            .clamp(self.settings.min_distance, self.settings.max_distance);
    }

    /// Offset from the orbit pivot to the camera.
    pub fn orbit_offset(&self) -> Vec3 {
        let d = self.distance;
        Vec3::new(
            d * self.yaw.sin() * self.pitch.cos(),
            d * self.pitch.sin(),
            d * self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// Ease the zoom and place the camera around `character`.
    pub fn update(&mut self, character: Vec3) -> CameraPose {
        self.distance += (self.target_distance - self.distance) * self.settings.zoom_ease;

        let pivot = character + Vec3::Y * self.settings.pivot_height;
        CameraPose {
            position: pivot + self.orbit_offset(),
            target: character + Vec3::Y * self.settings.look_height,
        }
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.settings.fov_degrees.to_radians(),
            aspect.max(f32::EPSILON),
            self.settings.near,
            self.settings.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn camera() -> OrbitCamera {
        let mut cam = OrbitCamera::new(CameraSettings::default());
        cam.set_captured(true);
        cam
    }

    #[test]
    fn pointer_ignored_without_capture() {
        let mut cam = OrbitCamera::new(CameraSettings::default());
        let (yaw, pitch) = (cam.yaw(), cam.pitch());
        assert!(!cam.on_pointer_move(100.0, 50.0));
        assert_eq!((cam.yaw(), cam.pitch()), (yaw, pitch));

        cam.toggle_captured();
        assert!(cam.on_pointer_move(100.0, 0.0));
        assert!((cam.yaw() - (yaw - 0.4)).abs() < 1e-5);
    }

    #[test]
    fn zoom_eases_toward_target() {
        let mut cam = camera();
        cam.on_wheel(-500.0);
        assert_eq!(cam.target_distance(), 15.0);

        cam.update(Vec3::ZERO);
        assert!((cam.distance() - 10.5).abs() < 1e-5);

        for _ in 0..200 {
            cam.update(Vec3::ZERO);
        }
        assert!((cam.distance() - 15.0).abs() < 1e-3);
    }

    #[test]
    fn pose_orbits_the_character() {
        let mut cam = OrbitCamera::new(CameraSettings {
            start_yaw: 0.0,
            start_pitch: 0.5,
            ..CameraSettings::default()
        });
        let character = Vec3::new(3.0, 0.0, -2.0);
        let pose = cam.update(character);

        let pivot = character + Vec3::Y;
        assert!(((pose.position - pivot).length() - 10.0).abs() < 1e-4);
        assert!((pose.position.x - 3.0).abs() < 1e-5);
        assert!(pose.position.z > character.z);
        assert_eq!(pose.target, character + Vec3::Y * 4.0);
        assert!(pose.look_direction().z < 0.0);
    }

    #[test]
    fn start_values_are_clamped() {
        let cam = OrbitCamera::new(CameraSettings {
            start_pitch: 3.0,
            start_distance: 100.0,
            ..CameraSettings::default()
        });
        assert_eq!(cam.pitch(), CameraSettings::default().max_pitch);
        assert_eq!(cam.distance(), 20.0);
    }

    #[test]
    fn non_finite_deltas_are_ignored() {
        let mut cam = camera();
        let before = (cam.yaw(), cam.pitch(), cam.target_distance());
        cam.on_pointer_move(f32::NAN, 1.0);
        cam.on_wheel(f32::INFINITY);
        assert_eq!((cam.yaw(), cam.pitch(), cam.target_distance()), before);
    }

    #[test]
    fn non_finite_sensitivity_leaves_orientation_alone() {
        let mut cam = OrbitCamera::new(CameraSettings {
            look_sensitivity: f32::NAN,
            ..CameraSettings::default()
        });
        cam.set_captured(true);
        let before = (cam.yaw(), cam.pitch());
        assert!(!cam.on_pointer_move(1.0, 1.0));
        assert_eq!((cam.yaw(), cam.pitch()), before);
    }

    proptest! {
        #[test]
        fn pitch_and_distance_stay_clamped(
            moves in proptest::collection::vec((-1e6f32..1e6, -1e6f32..1e6, -1e6f32..1e6), 1..50),
        ) {
            let mut cam = camera();
            let s = CameraSettings::default();
            for (dx, dy, wheel) in moves {
                cam.on_pointer_move(dx, dy);
                cam.on_wheel(wheel);
                cam.update(Vec3::ZERO);
                prop_assert!(cam.pitch() >= s.min_pitch && cam.pitch() <= s.max_pitch);
                prop_assert!(cam.pitch() > 0.0 && cam.pitch() < std::f32::consts::FRAC_PI_2);
                prop_assert!(cam.target_distance() >= s.min_distance);
                prop_assert!(cam.target_distance() <= s.max_distance);
                prop_assert!(cam.distance() >= s.min_distance - 1e-4);
                prop_assert!(cam.distance() <= s.max_distance + 1e-4);
            }
        }
    }
}
