//! Coarse distance visibility with a ±10% band around the cutoff.

/// Hides objects beyond a maximum distance without flickering at the edge.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceBand {
    max_visible: f32,
    performance_max_visible: f32,
    margin: f32,
}

impl Default for DistanceBand {
    fn default() -> Self {
        Self::new(50_000.0, 15_000.0)
    }
}

impl DistanceBand {
    pub fn new(max_visible: f32, performance_max_visible: f32) -> Self {
        Self {
            max_visible,
            performance_max_visible,
            margin: 0.1,
        }
    }

    /// Cutoff for the current mode.
    pub fn max_visible(&self, performance: bool) -> f32 {
        if performance {
            self.performance_max_visible
        } else {
            self.max_visible
        }
    }

    /// Next `in_range` value given the current one.
    ///
    /// Hide beyond 110% of the cutoff, show within 90%, otherwise keep.
    pub fn update(&self, in_range: bool, distance: f32, performance: bool) -> bool {
        let max = self.max_visible(performance);
        if distance > max * (1.0 + self.margin) {
            false
        } else if distance < max * (1.0 - self.margin) {
            true
        } else {
            in_range
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hide_and_show_thresholds() {
        let band = DistanceBand::default();
        assert!(!band.update(true, 55_001.0, false));
        assert!(band.update(false, 44_999.0, false));
    }

    /// Inside the band the previous state is kept in both directions.
    #[test]
    fn test_band_keeps_state() {
        let band = DistanceBand::default();
        assert!(band.update(true, 52_000.0, false));
        assert!(!band.update(false, 48_000.0, false));
    }

    #[test]
    fn test_performance_cutoff() {
        let band = DistanceBand::default();
        assert_eq!(band.max_visible(true), 15_000.0);
        assert!(!band.update(true, 17_000.0, true));
        assert!(band.update(true, 17_000.0, false));
    }
}
