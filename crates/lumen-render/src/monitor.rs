//! Frame-rate measurement and the adaptive degrade/restore state machine.

use std::collections::VecDeque;

/// Frames-per-second over windows of just over one second.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    window_start_ms: Option<f64>,
    fps: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a frame at `now_ms`. Returns the new reading when a window closes.
    pub fn frame(&mut self, now_ms: f64) -> Option<u32> {
        let start = *self.window_start_ms.get_or_insert(now_ms);
        self.frames += 1;
        let elapsed = now_ms - start;
        if elapsed > 1_000.0 {
            self.fps = (self.frames as f64 * 1_000.0 / elapsed).round() as u32;
            self.frames = 0;
            self.window_start_ms = Some(now_ms);
            Some(self.fps)
        } else {
            None
        }
    }

    /// Latest reading (0 until the first window closes).
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Coarse performance level derived from the sample average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerformanceState {
    #[default]
    Normal,
    Low,
    High,
}

/// Transition requested from the preset manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Enter performance mode.
    Degrade,
    /// Return to the user's preset.
    Restore,
}

/// Cadence and thresholds of the monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub enabled: bool,
    pub sample_interval_frames: u32,
    pub window: usize,
    pub low_fps: f32,
    pub high_fps: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_interval_frames: 30,
            window: 5,
            low_fps: 10.0,
            high_fps: 20.0,
        }
    }
}

/// Watches FPS samples and asks for degrade/restore at most once per crossing.
#[derive(Debug, Clone)]
pub struct AdaptivePerformanceMonitor {
    config: MonitorConfig,
    samples: VecDeque<f32>,
    frame: u64,
    state: PerformanceState,
    degraded: bool,
}

impl Default for AdaptivePerformanceMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

impl AdaptivePerformanceMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            samples: VecDeque::with_capacity(config.window.max(1)),
            config,
            frame: 0,
            state: PerformanceState::Normal,
            degraded: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if !enabled {
            self.samples.clear();
        }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn state(&self) -> PerformanceState {
        self.state
    }

    /// Whether this monitor forced the current degrade.
    pub fn degraded(&self) -> bool {
        self.degraded
    }

    pub fn average(&self) -> Option<f32> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.samples.iter().sum::<f32>() / self.samples.len() as f32)
        }
    }

    /// Call once per frame; samples `fps` on every Nth frame.
    pub fn on_frame(&mut self, fps: f32, in_performance_mode: bool) -> Option<MonitorEvent> {
        if !self.config.enabled {
            return None;
        }
        self.frame += 1;
        if self.frame % self.config.sample_interval_frames.max(1) as u64 != 0 {
            return None;
        }
        self.record_sample(fps, in_performance_mode)
    }

    /// Push one sample and run the state machine.
    ///
    /// `in_performance_mode` suppresses a degrade while performance mode is
    /// already active for any reason.
    pub fn record_sample(&mut self, fps: f32, in_performance_mode: bool) -> Option<MonitorEvent> {
        if !self.config.enabled {
            return None;
        }
        if self.samples.len() >= self.config.window.max(1) {
            self.samples.pop_front();
        }
        self.samples.push_back(fps);
        let average = self.average()?;
        let previous = self.state;

        if average < self.config.low_fps {
            self.state = PerformanceState::Low;
            if !self.degraded && !in_performance_mode {
                self.degraded = true;
                log::info!("Average FPS {average:.1} below {}; degrading", self.config.low_fps);
                return Some(MonitorEvent::Degrade);
            }
        } else if average > self.config.high_fps && previous == PerformanceState::Low {
            self.state = PerformanceState::High;
            let forced = std::mem::take(&mut self.degraded);
            if forced {
                log::info!("Average FPS {average:.1} above {}; restoring", self.config.high_fps);
                return Some(MonitorEvent::Restore);
            }
        } else if self.degraded {
            self.state = PerformanceState::Low;
        } else {
            self.state = PerformanceState::Normal;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_counter_window() {
        let mut counter = FpsCounter::new();
        let mut reading = None;
        let mut t = 0.0;
        for _ in 0..=61 {
            if let Some(fps) = counter.frame(t) {
                reading = Some(fps);
            }
            t += 1000.0 / 60.0;
        }
        assert_eq!(reading, Some(60));
        assert_eq!(counter.fps(), 60);
    }

    #[test]
    fn test_fps_counter_needs_more_than_a_second() {
        let mut counter = FpsCounter::new();
        assert_eq!(counter.frame(0.0), None);
        assert_eq!(counter.frame(1_000.0), None);
        assert!(counter.frame(1_001.0).is_some());
    }

    /// Samples averaging below 10 degrade once; a later average above 20 restores.
    #[test]
    fn test_degrade_then_restore() {
        let mut monitor = AdaptivePerformanceMonitor::default();
        let mut events = Vec::new();
        for fps in [8.0, 8.0, 9.0, 8.0, 7.0] {
            events.extend(monitor.record_sample(fps, false));
        }
        assert_eq!(events, [MonitorEvent::Degrade]);
        assert_eq!(monitor.state(), PerformanceState::Low);

        let mut restore = Vec::new();
        for _ in 0..5 {
            restore.extend(monitor.record_sample(40.0, true));
        }
        assert_eq!(restore, [MonitorEvent::Restore]);
        assert_eq!(monitor.state(), PerformanceState::High);
        assert!(!monitor.degraded());
    }

    /// Between the thresholds a forced degrade stays low so restore can fire.
    #[test]
    fn test_low_is_sticky_while_degraded() {
        let mut monitor = AdaptivePerformanceMonitor::default();
        monitor.record_sample(5.0, false);
        monitor.record_sample(25.0, true); // average 15
        assert_eq!(monitor.state(), PerformanceState::Low);
        assert_eq!(monitor.record_sample(40.0, true), Some(MonitorEvent::Restore));
    }

    #[test]
    fn test_no_degrade_when_already_in_performance_mode() {
        let mut monitor = AdaptivePerformanceMonitor::default();
        for _ in 0..5 {
            assert_eq!(monitor.record_sample(5.0, true), None);
        }
        assert_eq!(monitor.state(), PerformanceState::Low);
        for _ in 0..5 {
            assert_eq!(monitor.record_sample(60.0, true), None);
        }
    }

    #[test]
    fn test_samples_every_interval() {
        let mut monitor = AdaptivePerformanceMonitor::default();
        let mut events = Vec::new();
        for _ in 0..30 {
            events.extend(monitor.on_frame(5.0, false));
        }
        assert_eq!(events, [MonitorEvent::Degrade]);
        assert_eq!(monitor.average(), Some(5.0));
    }

    #[test]
    fn test_disabled_monitor_is_inert() {
        let mut monitor = AdaptivePerformanceMonitor::default();
        monitor.set_enabled(false);
        for _ in 0..300 {
            assert_eq!(monitor.on_frame(1.0, false), None);
        }
        assert_eq!(monitor.average(), None);
    }

    #[test]
    fn test_normal_band_without_degrade() {
        let mut monitor = AdaptivePerformanceMonitor::default();
        assert_eq!(monitor.record_sample(15.0, false), None);
        assert_eq!(monitor.state(), PerformanceState::Normal);
        assert_eq!(monitor.record_sample(60.0, false), None);
        assert_eq!(monitor.state(), PerformanceState::Normal);
    }
}
