//! Stage timing for the render path.
//!
//! Each stage accumulates wall-clock durations between [`StageProfiler::begin`]
//! and [`StageProfiler::end`]. At most every `update_interval` the per-stage
//! averages are pushed into a bounded history and the accumulators reset.
//! Nothing is recorded while the profiler is inactive.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Timed sections of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileStage {
    /// The whole frame.
    Frame,
    Lod,
    Visibility,
    Animations,
    /// Draw list construction.
    Rendering,
    /// One quality preset application.
    ApplyPreset,
}

const STAGE_COUNT: usize = 6;

impl ProfileStage {
    pub const ALL: [ProfileStage; STAGE_COUNT] = [
        ProfileStage::Frame,
        ProfileStage::Lod,
        ProfileStage::Visibility,
        ProfileStage::Animations,
        ProfileStage::Rendering,
        ProfileStage::ApplyPreset,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProfileStage::Frame => "frame",
            ProfileStage::Lod => "lod",
            ProfileStage::Visibility => "visibility",
            ProfileStage::Animations => "animations",
            ProfileStage::Rendering => "rendering",
            ProfileStage::ApplyPreset => "apply_preset",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Traffic-light rating of a frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpsRating {
    /// 55 fps and above.
    Good,
    /// 30 to 54 fps.
    Warning,
    Critical,
}

impl FpsRating {
    pub fn for_fps(fps: u32) -> Self {
        if fps >= 55 {
            FpsRating::Good
        } else if fps >= 30 {
            FpsRating::Warning
        } else {
            FpsRating::Critical
        }
    }

    /// Overlay colour as sRGB bytes.
    pub fn color(self) -> [u8; 3] {
        match self {
            FpsRating::Good => [0x4c, 0xaf, 0x50],
            FpsRating::Warning => [0xff, 0xc1, 0x07],
            FpsRating::Critical => [0xf4, 0x43, 0x36],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FpsRating::Good => "good",
            FpsRating::Warning => "warning",
            FpsRating::Critical => "critical",
        }
    }
}

/// History length and refresh cadence.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilerConfig {
    /// Averages kept per stage. Default: 100.
    pub history_len: usize,
    /// Minimum time between history refreshes. Default: 500 ms.
    pub update_interval: Duration,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            history_len: 100,
            update_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct StageMetric {
    started: Option<Instant>,
    total: Duration,
    count: u32,
}

/// Rolling per-stage timings, toggled at runtime.
#[derive(Debug, Clone)]
pub struct StageProfiler {
    active: bool,
    config: ProfilerConfig,
    metrics: [StageMetric; STAGE_COUNT],
    /// Average milliseconds per refresh, oldest first.
    history: [VecDeque<f64>; STAGE_COUNT],
    last_update: Option<Instant>,
}

impl Default for StageProfiler {
    fn default() -> Self {
        Self::new(ProfilerConfig::default())
    }
}

impl StageProfiler {
    /// Create an inactive profiler.
    pub fn new(config: ProfilerConfig) -> Self {
        let history_len = config.history_len;
        Self {
            active: false,
            metrics: Default::default(),
            history: std::array::from_fn(|_| VecDeque::with_capacity(history_len)),
            last_update: None,
            config,
        }
    }

    /// Turn timing on or off. Open sections are discarded when switching off;
    /// the first completed section after switching on refreshes the history.
    pub fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        if active {
            self.last_update = None;
        } else {
            for metric in &mut self.metrics {
                metric.started = None;
            }
        }
        log::info!("Profiler {}", if active { "enabled" } else { "disabled" });
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn begin(&mut self, stage: ProfileStage) {
        if self.active {
            self.metrics[stage.index()].started = Some(Instant::now());
        }
    }

    /// Close the section opened by the matching [`StageProfiler::begin`].
    pub fn end(&mut self, stage: ProfileStage) {
        if !self.active {
            return;
        }
        let Some(started) = self.metrics[stage.index()].started.take() else {
            return;
        };
        let now = Instant::now();
        self.record_at(stage, now.duration_since(started), now);
    }

    fn record_at(&mut self, stage: ProfileStage, elapsed: Duration, now: Instant) {
        let metric = &mut self.metrics[stage.index()];
        metric.total += elapsed;
        metric.count += 1;

        let due = self
            .last_update
            .is_none_or(|last| now.duration_since(last) > self.config.update_interval);
        if due {
            self.flush();
            self.last_update = Some(now);
        }
    }

    /// Push the average of every stage with pending samples into its history.
    pub fn flush(&mut self) {
        for (metric, history) in self.metrics.iter_mut().zip(self.history.iter_mut()) {
            if metric.count == 0 {
                continue;
            }
            let avg_ms = metric.total.as_nanos() as f64 / 1_000_000.0 / f64::from(metric.count);
            if history.len() == self.config.history_len {
                history.pop_front();
            }
            history.push_back(avg_ms);
            metric.total = Duration::ZERO;
            metric.count = 0;
        }
    }

    /// Samples recorded since the last refresh.
    pub fn pending(&self, stage: ProfileStage) -> u32 {
        self.metrics[stage.index()].count
    }

    /// Most recent average in milliseconds.
    pub fn latest_ms(&self, stage: ProfileStage) -> Option<f64> {
        self.history[stage.index()].back().copied()
    }

    pub fn history(&self, stage: ProfileStage) -> &VecDeque<f64> {
        &self.history[stage.index()]
    }

    /// One-line summary, e.g. `fps 58 (good) | frame 1.20ms | lod 0.31ms`.
    pub fn report(&self, fps: u32) -> String {
        let mut out = format!("fps {fps} ({})", FpsRating::for_fps(fps).name());
        for stage in ProfileStage::ALL {
            if let Some(ms) = self.latest_ms(stage) {
                let _ = write!(out, " | {} {ms:.2}ms", stage.name());
            }
        }
        out
    }
}
