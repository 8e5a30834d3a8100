//! Eased fly-to: interpolates position and look-at point over a fixed
//! wall-clock duration.

use glam::Vec3;

/// Cubic ease-in-out of a progress value in `[0, 1]`.
pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// An in-flight fly-to.
#[derive(Clone, Debug, PartialEq)]
pub struct FocusTransition {
    pub from_position: Vec3,
    pub to_position: Vec3,
    pub from_look_at: Vec3,
    pub to_look_at: Vec3,
    pub start_ms: f64,
    pub duration_ms: f64,
}

/// Pose sampled from a transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionSample {
    pub position: Vec3,
    pub look_at: Vec3,
    pub finished: bool,
}

impl FocusTransition {
    /// Progress in `[0, 1]` at `now_ms`. A zero duration is already finished.
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Interpolated pose. Once finished the pose equals the target exactly.
    pub fn sample(&self, now_ms: f64) -> TransitionSample {
        let t = self.progress(now_ms);
        if t >= 1.0 {
            return TransitionSample {
                position: self.to_position,
                look_at: self.to_look_at,
                finished: true,
            };
        }
        let e = ease_cubic_in_out(t);
        TransitionSample {
            position: self.from_position.lerp(self.to_position, e),
            look_at: self.from_look_at.lerp(self.to_look_at, e),
            finished: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition() -> FocusTransition {
        FocusTransition {
            from_position: Vec3::ZERO,
            to_position: Vec3::new(1000.0, 0.0, 0.0),
            from_look_at: Vec3::new(0.0, 0.0, -1.0),
            to_look_at: Vec3::new(1000.0, 0.0, -1000.0),
            start_ms: 100.0,
            duration_ms: 1000.0,
        }
    }

    #[test]
    fn test_cubic_in_out_shape() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert!((ease_cubic_in_out(0.25) - 0.0625).abs() < 1e-6);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_cubic_in_out(0.75) - 0.9375).abs() < 1e-6);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert_eq!(ease_cubic_in_out(2.0), 1.0);
    }

    #[test]
    fn test_sample_endpoints() {
        let tr = transition();
        let start = tr.sample(100.0);
        assert_eq!(start.position, Vec3::ZERO);
        assert!(!start.finished);

        let end = tr.sample(1100.0);
        assert!(end.finished);
        assert_eq!(end.position, tr.to_position);
        assert_eq!(end.look_at, tr.to_look_at);
    }

    #[test]
    fn test_midpoint_is_halfway() {
        let mid = transition().sample(600.0);
        assert!((mid.position.x - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let tr = FocusTransition {
            duration_ms: 0.0,
            ..transition()
        };
        assert!(tr.sample(0.0).finished);
    }
}
