//! Free-fly controller over yaw/pitch, with an optional eased fly-to that
//! overrides input while in flight.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};
use lumen_render::Camera;
use winit::keyboard::KeyCode;

use crate::indicator::SpeedIndicator;
use crate::input::{KeyboardState, PointerState};
use crate::transition::FocusTransition;

/// Mouse deltas are in pixels; this brings them to radians at sensitivity 1.
const LOOK_SCALE: f32 = 0.01;

/// Tunables of the free-fly controller.
#[derive(Clone, Debug, PartialEq)]
pub struct FlySettings {
    /// World units per second at multiplier 1.
    pub move_speed: f32,
    pub boost_factor: f32,
    pub mouse_sensitivity: f32,
    pub speed_multiplier_min: f32,
    pub speed_multiplier_max: f32,
    /// Change per wheel notch.
    pub speed_multiplier_step: f32,
    pub indicator_ms: f64,
    pub focus_duration_ms: f64,
    pub min_focus_distance: f32,
}

impl Default for FlySettings {
    fn default() -> Self {
        Self {
            move_speed: 5_000.0,
            boost_factor: 4.0,
            mouse_sensitivity: 0.2,
            speed_multiplier_min: 0.1,
            speed_multiplier_max: 10.0,
            speed_multiplier_step: 0.1,
            indicator_ms: 2_000.0,
            focus_duration_ms: 1_000.0,
            min_focus_distance: 1_000.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FlyCamera {
    pub position: Vec3,
    /// Radians; 0 looks down +Z.
    yaw: f32,
    /// Radians in `[-π/2, π/2]`.
    pitch: f32,
    speed_multiplier: f32,
    settings: FlySettings,
    indicator: SpeedIndicator,
    transition: Option<FocusTransition>,
}

impl Default for FlyCamera {
    /// At (0, 0, 1000) looking at the origin.
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 1_000.0), FlySettings::default())
    }
}

impl FlyCamera {
    pub fn new(position: Vec3, settings: FlySettings) -> Self {
        Self {
            position,
            yaw: PI,
            pitch: 0.0,
            speed_multiplier: 1.0,
            settings,
            indicator: SpeedIndicator::default(),
            transition: None,
        }
    }

    pub fn settings(&self) -> &FlySettings {
        &self.settings
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn indicator(&self) -> &SpeedIndicator {
        &self.indicator
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Unit view direction `(sin yaw·cos pitch, sin pitch, cos yaw·cos pitch)`.
    pub fn direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(sy * cp, sp, cy * cp)
    }

    /// Horizontal right vector; independent of pitch.
    pub fn right(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(-cy, 0.0, sy)
    }

    /// Orientation mapping the camera's local -Z onto [`FlyCamera::direction`].
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw + PI) * Quat::from_rotation_x(self.pitch)
    }

    /// Turn to face `point`. No-op if `point` is the current position.
    pub fn look_at(&mut self, point: Vec3) {
        let dir = (point - self.position).normalize_or_zero();
        if dir != Vec3::ZERO {
            self.set_direction(dir);
        }
    }

    fn set_direction(&mut self, dir: Vec3) {
        self.pitch = dir.y.clamp(-1.0, 1.0).asin();
        self.yaw = dir.x.atan2(dir.z);
    }

    /// Apply a pointer delta in pixels.
    pub fn look(&mut self, dx: f32, dy: f32) {
        let scale = self.settings.mouse_sensitivity * LOOK_SCALE;
        self.yaw -= dx * scale;
        self.pitch = (self.pitch - dy * scale).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Step the speed multiplier by one notch in the direction of `notches`.
    pub fn adjust_speed(&mut self, notches: f32, now_ms: f64) {
        if notches == 0.0 {
            return;
        }
        let step = self.settings.speed_multiplier_step * notches.signum();
        self.speed_multiplier = (self.speed_multiplier + step)
            .clamp(self.settings.speed_multiplier_min, self.settings.speed_multiplier_max);
        self.indicator
            .show(self.speed_multiplier, now_ms, self.settings.indicator_ms);
    }

    /// Translate from held movement keys.
    pub fn translate(&mut self, keyboard: &KeyboardState, dt: f32) {
        let mut dir = Vec3::ZERO;
        if keyboard.is_pressed(KeyCode::KeyW) || keyboard.is_pressed(KeyCode::ArrowUp) {
            dir += self.direction();
        }
        if keyboard.is_pressed(KeyCode::KeyS) || keyboard.is_pressed(KeyCode::ArrowDown) {
            dir -= self.direction();
        }
        if keyboard.is_pressed(KeyCode::KeyD) {
            dir += self.right();
        }
        if keyboard.is_pressed(KeyCode::KeyA) {
            dir -= self.right();
        }
        if dir.length_squared() <= 1e-6 {
            return;
        }

        let boost = if keyboard.is_pressed(KeyCode::ShiftLeft) || keyboard.is_pressed(KeyCode::ShiftRight) {
            self.settings.boost_factor
        } else {
            1.0
        };
        let speed = self.settings.move_speed * boost * self.speed_multiplier;
        self.position += dir.normalize() * speed * dt;
    }

    /// Start a fly-to ending at `target` and looking at `look_at`, replacing
    /// any transition already in flight.
    ///
    /// A target closer than `min_distance` to `look_at` is pushed back along
    /// the look-at → target direction. Returns the final position.
    pub fn focus_on(&mut self, target: Vec3, look_at: Vec3, duration_ms: f64, now_ms: f64, min_distance: f32) -> Vec3 {
        let offset = target - look_at;
        let to_position = if offset.length() < min_distance {
            let away = offset.normalize_or_zero();
            let away = if away == Vec3::ZERO { Vec3::Z } else { away };
            look_at + away * min_distance
        } else {
            target
        };

        let reach = self.position.distance(look_at).max(1.0);
        self.transition = Some(FocusTransition {
            from_position: self.position,
            to_position,
            from_look_at: self.position + self.direction() * reach,
            to_look_at: look_at,
            start_ms: now_ms,
            duration_ms: duration_ms.max(0.0),
        });
        tracing::debug!(?to_position, ?look_at, duration_ms, "fly-to started");
        to_position
    }

    /// Drop an in-flight transition, keeping the current pose.
    pub fn cancel_focus(&mut self) {
        self.transition = None;
    }

    fn advance_transition(&mut self, now_ms: f64) {
        let Some(transition) = &self.transition else {
            return;
        };
        let sample = transition.sample(now_ms);
        self.position = sample.position;
        let dir = (sample.look_at - sample.position).normalize_or_zero();
        if dir != Vec3::ZERO {
            self.set_direction(dir);
        }
        if sample.finished {
            self.transition = None;
        }
    }

    /// Advance one frame. A fly-to in flight takes precedence over input.
    pub fn update(&mut self, keyboard: &KeyboardState, pointer: &PointerState, dt: f32, now_ms: f64) {
        self.indicator.update(now_ms);

        if self.transition.is_some() {
            self.advance_transition(now_ms);
            return;
        }

        if pointer.locked() {
            let delta = pointer.delta();
            self.look(delta.x, delta.y);
            self.adjust_speed(pointer.scroll(), now_ms);
        }
        self.translate(keyboard, dt);
    }

    /// Copy the pose onto a render camera.
    pub fn apply_to(&self, camera: &mut Camera) {
        camera.position = self.position;
        camera.rotation = self.rotation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RawKeyEvent;
    use winit::event::{ElementState, MouseButton, MouseScrollDelta};

    fn held(keys: &[KeyCode]) -> KeyboardState {
        let mut kb = KeyboardState::new();
        for key in keys {
            kb.process_raw(RawKeyEvent::pressed(*key));
        }
        kb
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_default_looks_at_origin() {
        let cam = FlyCamera::default();
        assert!(approx(cam.direction(), Vec3::NEG_Z));
        assert!(approx(cam.right(), Vec3::X));
    }

    #[test]
    fn test_rotation_matches_direction() {
        let mut cam = FlyCamera::default();
        for (dx, dy) in [(37.0, 12.0), (-200.0, -50.0), (500.0, 80.0)] {
            cam.look(dx, dy);
            assert!(approx(cam.rotation() * Vec3::NEG_Z, cam.direction()));
        }
    }

    #[test]
    fn test_forward_speed_and_boost() {
        let mut cam = FlyCamera::default();
        cam.translate(&held(&[KeyCode::KeyW]), 1.0);
        assert!(approx(cam.position, Vec3::new(0.0, 0.0, -4_000.0)));

        let mut cam = FlyCamera::default();
        cam.translate(&held(&[KeyCode::KeyW, KeyCode::ShiftLeft]), 0.5);
        assert!(approx(cam.position, Vec3::new(0.0, 0.0, 1_000.0 - 10_000.0)));
    }

    #[test]
    fn test_strafe_is_horizontal() {
        let mut cam = FlyCamera::default();
        cam.look(0.0, -300.0);
        cam.translate(&held(&[KeyCode::KeyD]), 1.0);
        assert!((cam.position.y).abs() < 1e-3);
        assert!((cam.position.x - 5_000.0).abs() < 1e-2);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut cam = FlyCamera::default();
        cam.look(0.0, -100_000.0);
        assert!((cam.pitch() - FRAC_PI_2).abs() < 1e-6);
        cam.look(0.0, 200_000.0);
        assert!((cam.pitch() + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_look_needs_pointer_lock() {
        let mut cam = FlyCamera::default();
        let mut pointer = PointerState::new();
        pointer.on_raw_motion(100.0, 0.0);
        cam.update(&KeyboardState::new(), &pointer, 0.016, 0.0);
        assert_eq!(cam.yaw(), PI);

        pointer.on_button(MouseButton::Right, ElementState::Pressed);
        pointer.on_raw_motion(100.0, 0.0);
        cam.update(&KeyboardState::new(), &pointer, 0.016, 16.0);
        assert!((cam.yaw() - (PI - 100.0 * 0.2 * 0.01)).abs() < 1e-5);
    }

    #[test]
    fn test_scroll_clamps_and_shows_indicator() {
        let mut cam = FlyCamera::default();
        let mut pointer = PointerState::new();
        pointer.set_locked(true);
        pointer.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        cam.update(&KeyboardState::new(), &pointer, 0.016, 0.0);
        assert!((cam.speed_multiplier() - 1.1).abs() < 1e-5);
        assert_eq!(cam.indicator().text, "Speed: 1.10");

        for _ in 0..200 {
            cam.adjust_speed(-1.0, 10.0);
        }
        assert!((cam.speed_multiplier() - 0.1).abs() < 1e-6);
        for _ in 0..200 {
            cam.adjust_speed(1.0, 20.0);
        }
        assert!((cam.speed_multiplier() - 10.0).abs() < 1e-6);

        cam.update(&KeyboardState::new(), &PointerState::new(), 0.016, 2_020.0);
        assert!(!cam.indicator().visible());
    }

    /// The pose at the end of the duration equals the requested target.
    #[test]
    fn test_focus_reaches_target_exactly() {
        let mut cam = FlyCamera::default();
        let target = Vec3::new(3_000.0, 500.0, -2_000.0);
        let look_at = Vec3::new(3_000.0, 0.0, -5_000.0);
        let end = cam.focus_on(target, look_at, 1_000.0, 0.0, 1_000.0);
        assert_eq!(end, target);

        cam.update(&KeyboardState::new(), &PointerState::new(), 0.5, 500.0);
        assert!(cam.is_transitioning());
        cam.update(&KeyboardState::new(), &PointerState::new(), 0.5, 1_000.0);
        assert!(!cam.is_transitioning());
        assert_eq!(cam.position, target);
        assert!(approx(cam.direction(), (look_at - target).normalize()));
    }

    #[test]
    fn test_refocus_replaces_transition() {
        let mut cam = FlyCamera::default();
        let kb = KeyboardState::new();
        let pointer = PointerState::new();
        cam.focus_on(Vec3::new(5_000.0, 0.0, 0.0), Vec3::new(5_000.0, 0.0, -5_000.0), 1_000.0, 0.0, 1_000.0);
        cam.update(&kb, &pointer, 0.3, 300.0);
        let second = Vec3::new(-4_000.0, 0.0, 0.0);
        cam.focus_on(second, Vec3::new(-4_000.0, 0.0, -5_000.0), 1_000.0, 300.0, 1_000.0);

        cam.update(&kb, &pointer, 0.7, 1_000.0);
        assert!(cam.is_transitioning());
        cam.update(&kb, &pointer, 0.3, 1_300.0);
        assert_eq!(cam.position, second);
    }

    #[test]
    fn test_focus_pushes_back_close_targets() {
        let mut cam = FlyCamera::default();
        let look_at = Vec3::new(100.0, 0.0, 0.0);
        let end = cam.focus_on(look_at + Vec3::new(0.0, 20.0, 500.0), look_at, 1_000.0, 0.0, 1_000.0);
        assert!((end.distance(look_at) - 1_000.0).abs() < 1e-2);
        assert!(end.z > look_at.z);
    }

    #[test]
    fn test_input_ignored_during_flight() {
        let mut cam = FlyCamera::default();
        cam.focus_on(Vec3::new(0.0, 0.0, 5_000.0), Vec3::ZERO, 1_000.0, 0.0, 1_000.0);
        cam.update(&held(&[KeyCode::KeyW]), &PointerState::new(), 1.0, 0.0);
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 1_000.0));
    }

    #[test]
    fn test_apply_to_camera() {
        let mut cam = FlyCamera::default();
        cam.position = Vec3::new(1.0, 2.0, 3.0);
        let mut camera = Camera::default();
        cam.apply_to(&mut camera);
        assert_eq!(camera.position, cam.position);
        assert!(approx(camera.forward(), cam.direction()));
    }
}
