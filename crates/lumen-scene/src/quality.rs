//! Global rendering quality mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fidelity level every node is built under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityMode {
    Quality,
    #[default]
    Standard,
    Performance,
}

impl QualityMode {
    pub const ALL: [QualityMode; 3] = [Self::Quality, Self::Standard, Self::Performance];

    pub fn name(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Standard => "standard",
            Self::Performance => "performance",
        }
    }
}

impl fmt::Display for QualityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QualityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quality" | "high" => Ok(Self::Quality),
            "standard" | "normal" => Ok(Self::Standard),
            "performance" | "low" => Ok(Self::Performance),
            other => Err(other.to_string()),
        }
    }
}

/// Current mode plus an epoch that advances on every mode change.
///
/// Objects stamp the epoch they were built under; a mismatch marks them
/// stale. Only the owner of the context (the preset manager) switches it;
/// everyone else reads through `&QualityContext`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityContext {
    mode: QualityMode,
    epoch: u64,
}

impl QualityContext {
    pub fn new(mode: QualityMode) -> Self {
        Self { mode, epoch: 0 }
    }

    pub fn mode(&self) -> QualityMode {
        self.mode
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_performance(&self) -> bool {
        self.mode == QualityMode::Performance
    }

    /// Switch modes. Returns `false` (epoch untouched) when already in `mode`.
    pub fn switch(&mut self, mode: QualityMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.epoch += 1;
        true
    }
}
