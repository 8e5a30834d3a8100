//! Transient "Speed: x.xx" overlay shown after the speed multiplier changes.

use std::fmt::Write;

const SHOWN_OPACITY: f32 = 0.8;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeedIndicator {
    pub text: String,
    pub opacity: f32,
    hide_at_ms: Option<f64>,
}

impl SpeedIndicator {
    /// Show `multiplier` and restart the hide timer.
    pub fn show(&mut self, multiplier: f32, now_ms: f64, visible_ms: f64) {
        self.text.clear();
        let _ = write!(self.text, "Speed: {multiplier:.2}");
        self.opacity = SHOWN_OPACITY;
        self.hide_at_ms = Some(now_ms + visible_ms);
    }

    pub fn update(&mut self, now_ms: f64) {
        if let Some(hide_at) = self.hide_at_ms
            && now_ms >= hide_at
        {
            self.opacity = 0.0;
            self.hide_at_ms = None;
        }
    }

    pub fn visible(&self) -> bool {
        self.opacity > 0.0
    }
}
