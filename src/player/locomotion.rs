//! Character movement: camera-relative intent, facing easing, gravity and jumping.
//!
//! Velocities are in units per reference frame. Each update moves the
//! character by `velocity * delta * reference_fps`, so a 60 Hz host with the
//! default reference rate advances by exactly one velocity step per frame.

use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::constants::FLOOR_HEIGHT;
use crate::player::input::InputState;
use crate::utils::settings::LocomotionSettings;

/// Character transform handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterPose {
    pub position: Vec3,
    /// Rotation about +Y in radians.
    pub yaw: f32,
}

/// What the integrator did this frame, for animation selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocomotionStep {
    pub moving: bool,
    pub running: bool,
    pub grounded: bool,
}

/// Horizontal unit vector the camera looks along for a given camera yaw.
pub fn camera_forward(camera_yaw: f32) -> Vec3 {
    Vec3::new(camera_yaw.sin(), 0.0, camera_yaw.cos())
}

pub fn camera_right(camera_yaw: f32) -> Vec3 {
    camera_forward(camera_yaw + FRAC_PI_2)
}

/// Sum of the camera-relative directions for the held movement keys.
///
/// Forward subtracts the camera forward vector because the camera sits on
/// the `+forward` side of the character; moving "forward" means moving away
/// from it.
pub fn movement_intent(input: &InputState, camera_yaw: f32) -> Vec3 {
    let forward = camera_forward(camera_yaw);
    let right = camera_right(camera_yaw);
    let mut intent = Vec3::ZERO;

    if input.forward {
        intent -= forward;
    }
    if input.backward {
        intent += forward;
    }
    if input.left {
        intent -= right;
    }
    if input.right {
        intent += right;
    }
    intent
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

pub struct Locomotion {
    pub position: Vec3,
    pub yaw: f32,
    pub velocity: Vec3,
    grounded: bool,
    jump_cooldown: f32,
    settings: LocomotionSettings,
}

impl Locomotion {
    pub fn new(settings: LocomotionSettings, spawn: Vec3, yaw: f32) -> Self {
        let position = Vec3::new(spawn.x, spawn.y.max(FLOOR_HEIGHT), spawn.z);
        Locomotion {
            position,
            yaw,
            velocity: Vec3::ZERO,
            grounded: position.y <= FLOOR_HEIGHT,
            jump_cooldown: 0.0,
            settings,
        }
    }

    pub fn pose(&self) -> CharacterPose {
        CharacterPose {
            position: self.position,
            yaw: self.yaw,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn jump_cooldown(&self) -> f32 {
        self.jump_cooldown
    }

    pub fn settings(&self) -> &LocomotionSettings {
        &self.settings
    }

    pub fn horizontal_speed(&self) -> f32 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z).length()
    }

    /// Zero the horizontal velocity, used when the last movement key is released.
    pub fn stop_horizontal(&mut self) {
        self.velocity.x = 0.0;
        self.velocity.z = 0.0;
    }

    /// Start a jump if grounded and the cooldown has elapsed.
    ///
    /// Requests during the cooldown are dropped, not queued.
    pub fn try_jump(&mut self) -> bool {
        if !self.grounded || self.jump_cooldown > 0.0 {
            tracing::trace!(
                grounded = self.grounded,
                cooldown = self.jump_cooldown,
                "Jump request dropped"
            );
            return false;
        }

        self.velocity.y = self.settings.jump_force;
        self.grounded = false;
        self.jump_cooldown = self.settings.jump_cooldown;
        tracing::debug!("Jump started at {:?}", self.position);
        true
    }

    pub fn update(&mut self, dt: f32, input: &InputState, camera_yaw: f32) -> LocomotionStep {
        let dt = dt.max(0.0);
        self.jump_cooldown = (self.jump_cooldown - dt).max(0.0);

        let intent = movement_intent(input, camera_yaw);
        let moving = intent.length_squared() > f32::EPSILON;
        let running = input.run;

        if moving {
            let direction = intent.normalize();
            let target_yaw = direction.x.atan2(direction.z);
            let diff = wrap_angle(target_yaw - self.yaw);
            self.yaw = wrap_angle(self.yaw + diff * self.settings.rotation_speed);

            let multiplier = if running {
                self.settings.run_multiplier
            } else {
                1.0
            };
            let speed = self.settings.walk_speed * multiplier;
            self.velocity.x = direction.x * speed;
            self.velocity.z = direction.z * speed;
        } else {
            self.stop_horizontal();
        }

        let running = moving && running;
        if dt == 0.0 {
            // Nothing to integrate; a jump fired this frame must survive.
            return LocomotionStep {
                moving,
                running,
                grounded: self.grounded,
            };
        }

        if !self.grounded {
            self.velocity.y -= self.settings.gravity * dt;
        }

        let frame_scale = dt * self.settings.reference_fps;
        self.position += self.velocity * frame_scale;

        if self.position.y <= FLOOR_HEIGHT {
            self.position.y = FLOOR_HEIGHT;
            self.velocity.y = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }

        if self.settings.clamp_to_arena {
            let half = self.settings.arena_half_size;
            self.position.x = self.position.x.clamp(-half, half);
            self.position.z = self.position.z.clamp(-half, half);
        }

        LocomotionStep {
            moving,
            running,
            grounded: self.grounded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PLAYER_RUN_MULTIPLIER;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn settings() -> LocomotionSettings {
        LocomotionSettings {
            walk_speed: 0.15,
            ..LocomotionSettings::default()
        }
    }

    fn held(forward: bool, backward: bool, left: bool, right: bool, run: bool) -> InputState {
        InputState {
            forward,
            backward,
            left,
            right,
            run,
            ..InputState::default()
        }
    }

    #[test]
    fn forward_moves_away_from_camera() {
        let input = held(true, false, false, false, false);
        let intent = movement_intent(&input, 0.0);
        assert!((intent - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);

        let intent = movement_intent(&input, PI);
        assert!((intent - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn opposing_keys_cancel() {
        let input = held(true, true, true, true, false);
        assert!(movement_intent(&input, 1.3).length() < 1e-6);

        let mut loco = Locomotion::new(settings(), Vec3::ZERO, 0.0);
        let step = loco.update(DT, &input, 1.3);
        assert!(!step.moving);
        assert_eq!(loco.horizontal_speed(), 0.0);
        assert!(loco.yaw.is_finite());
    }

    #[test]
    fn wrap_angle_range() {
        assert!((wrap_angle(PI) - PI).abs() < 1e-6);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-6);
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((wrap_angle(0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn holding_forward_for_a_second_covers_sixty_steps() {
        let mut loco = Locomotion::new(settings(), Vec3::ZERO, PI);
        let input = held(true, false, false, false, false);

        for _ in 0..60 {
            let step = loco.update(DT, &input, 0.0);
            assert!(step.grounded);
            assert!(loco.is_grounded());
        }

        assert!((loco.position - Vec3::new(0.0, 0.0, -9.0)).length() < 1e-3);
        assert!((loco.yaw - PI).abs() < 1e-5);
    }

    #[test]
    fn releasing_keys_stops_in_the_same_frame() {
        let mut loco = Locomotion::new(settings(), Vec3::ZERO, 0.0);
        loco.update(DT, &held(false, false, true, false, true), 0.0);
        assert!(loco.horizontal_speed() > 0.0);

        loco.update(DT, &InputState::default(), 0.0);
        assert_eq!(loco.velocity.x, 0.0);
        assert_eq!(loco.velocity.z, 0.0);
    }

    #[test]
    fn jump_arc_lands_and_rearms() {
        let mut loco = Locomotion::new(settings(), Vec3::ZERO, 0.0);
        assert!(loco.try_jump());
        assert_eq!(loco.velocity.y, 0.3);
        assert!(!loco.is_grounded());

        loco.update(DT, &InputState::default(), 0.0);
        assert!(loco.velocity.y < 0.3);
        assert!(loco.position.y > 0.0);
        assert!(!loco.is_grounded());

        let mut frames = 0;
        while !loco.is_grounded() {
            loco.update(DT, &InputState::default(), 0.0);
            frames += 1;
            assert!(frames < 600, "character never landed");
        }
        assert_eq!(loco.position.y, 0.0);
        assert_eq!(loco.velocity.y, 0.0);
    }

    #[test]
    fn jump_requests_during_cooldown_are_dropped() {
        let mut loco = Locomotion::new(settings(), Vec3::ZERO, 0.0);
        assert!(loco.try_jump());

        // Six frames is 100ms.
        for _ in 0..6 {
            loco.update(DT, &InputState::default(), 0.0);
        }
        assert!(!loco.try_jump());

        // Land before the 500ms cooldown expires, then ask again.
        while !loco.is_grounded() {
            loco.update(DT, &InputState::default(), 0.0);
        }
        assert!(loco.jump_cooldown() > 0.0);
        assert!(!loco.try_jump());
        assert_eq!(loco.velocity.y, 0.0);

        while loco.jump_cooldown() > 0.0 {
            loco.update(DT, &InputState::default(), 0.0);
        }
        assert!(loco.try_jump());
    }

    #[test]
    fn arena_bounds_hold() {
        let settings = LocomotionSettings {
            walk_speed: 1.0,
            arena_half_size: 2.0,
            ..LocomotionSettings::default()
        };
        let mut loco = Locomotion::new(settings, Vec3::ZERO, 0.0);
        let input = held(false, false, false, true, true);
        for _ in 0..120 {
            loco.update(DT, &input, 0.3);
        }
        assert!(loco.position.x.abs() <= 2.0);
        assert!(loco.position.z.abs() <= 2.0);
    }

    #[test]
    fn negative_delta_does_not_move() {
        let mut loco = Locomotion::new(settings(), Vec3::ZERO, 0.0);
        loco.update(-1.0, &held(true, false, false, false, false), 0.0);
        assert_eq!(loco.position, Vec3::ZERO);
    }

    #[test]
    fn zero_delta_frame_keeps_a_fresh_jump() {
        let mut loco = Locomotion::new(settings(), Vec3::ZERO, 0.0);
        assert!(loco.try_jump());

        let step = loco.update(0.0, &InputState::default(), 0.0);
        assert!(!step.grounded);
        assert_eq!(loco.velocity.y, 0.3);
        assert_eq!(loco.position.y, 0.0);

        loco.update(DT, &InputState::default(), 0.0);
        assert!(!loco.is_grounded());
        assert!(loco.position.y > 0.0);
    }

    proptest! {
        #[test]
        fn speed_is_direction_independent(
            camera_yaw in -10.0f32..10.0,
            keys in 1u8..16,
            run in any::<bool>(),
        ) {
            let input = held(keys & 1 != 0, keys & 2 != 0, keys & 4 != 0, keys & 8 != 0, run);
            let mut loco = Locomotion::new(settings(), Vec3::ZERO, 0.0);
            let step = loco.update(DT, &input, camera_yaw);
            if step.moving {
                let expected = 0.15 * if run { PLAYER_RUN_MULTIPLIER } else { 1.0 };
                prop_assert!((loco.horizontal_speed() - expected).abs() < 1e-4);
            } else {
                prop_assert_eq!(loco.horizontal_speed(), 0.0);
            }
        }

        #[test]
        fn facing_step_is_bounded(
            start_yaw in -PI..PI,
            camera_yaw in -10.0f32..10.0,
            keys in 1u8..16,
        ) {
            let input = held(keys & 1 != 0, keys & 2 != 0, keys & 4 != 0, keys & 8 != 0, false);
            let mut loco = Locomotion::new(settings(), Vec3::ZERO, start_yaw);
            loco.update(DT, &input, camera_yaw);
            let turned = wrap_angle(loco.yaw - start_yaw).abs();
            prop_assert!(turned <= 0.3 * PI + 1e-4);
        }

        #[test]
        fn grounded_iff_on_floor(
            script in proptest::collection::vec((any::<bool>(), 0.0f32..0.05), 1..200),
        ) {
            let mut loco = Locomotion::new(settings(), Vec3::ZERO, 0.0);
            for (jump, dt) in script {
                if jump {
                    loco.try_jump();
                }
                loco.update(dt, &InputState::default(), 0.0);
                if dt > 0.0 {
                    prop_assert_eq!(loco.is_grounded(), loco.position.y <= 0.0);
                }
                prop_assert!(loco.position.y >= 0.0);
            }
        }
    }
}
