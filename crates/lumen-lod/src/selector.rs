//! Distance-based tier selection with hysteresis.

use lumen_scene::LodTier;

use crate::error::LodError;

/// Tier boundaries in world units.
#[derive(Clone, Debug, PartialEq)]
pub struct LodThresholds {
    far: f32,
    medium: f32,
    hysteresis: f32,
}

impl Default for LodThresholds {
    /// 10000 / 3000 with a ±10% band.
    fn default() -> Self {
        Self {
            far: 10_000.0,
            medium: 3_000.0,
            hysteresis: 0.1,
        }
    }
}

impl LodThresholds {
    /// Requires `0 < medium < far` and `0 <= hysteresis < 0.5`, all finite.
    pub fn new(far: f32, medium: f32, hysteresis: f32) -> Result<Self, LodError> {
        if !(medium.is_finite() && medium > 0.0 && far.is_finite()) {
            return Err(LodError::NonPositiveThreshold { far, medium });
        }
        if far <= medium {
            return Err(LodError::InvertedThresholds { far, medium });
        }
        if !(0.0..0.5).contains(&hysteresis) {
            return Err(LodError::Hysteresis(hysteresis));
        }
        Ok(Self {
            far,
            medium,
            hysteresis,
        })
    }

    /// Both thresholds multiplied by `bias`; a higher bias keeps detail further out.
    pub fn scaled(&self, bias: f32) -> Self {
        let bias = if bias.is_finite() && bias > 0.0 { bias } else { 1.0 };
        Self {
            far: self.far * bias,
            medium: self.medium * bias,
            hysteresis: self.hysteresis,
        }
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn medium(&self) -> f32 {
        self.medium
    }

    pub fn hysteresis(&self) -> f32 {
        self.hysteresis
    }
}

/// Picks a tier for a distance, given the tier currently shown.
#[derive(Clone, Debug)]
pub struct LodSelector {
    base: LodThresholds,
    bias: f32,
    effective: LodThresholds,
}

impl LodSelector {
    pub fn new(thresholds: LodThresholds) -> Self {
        Self {
            effective: thresholds.clone(),
            base: thresholds,
            bias: 1.0,
        }
    }

    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias;
        self.effective = self.base.scaled(bias);
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Thresholds after bias scaling.
    pub fn thresholds(&self) -> &LodThresholds {
        &self.effective
    }

    /// Tier for `distance` ignoring history.
    pub fn select_raw(&self, distance: f32) -> LodTier {
        let t = &self.effective;
        if distance > t.far {
            LodTier::Far
        } else if distance > t.medium {
            LodTier::Medium
        } else {
            LodTier::Close
        }
    }

    /// Tier for `distance`, keeping `current` while inside its widened band.
    pub fn select(&self, current: LodTier, distance: f32) -> LodTier {
        let t = &self.effective;
        let lower = 1.0 - t.hysteresis;
        let upper = 1.0 + t.hysteresis;
        let keep = match current {
            LodTier::None => false,
            LodTier::Far => distance > t.far * lower,
            LodTier::Medium => distance > t.medium * lower && distance < t.far * upper,
            LodTier::Close => distance < t.medium * upper,
        };
        if keep { current } else { self.select_raw(distance) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn selector() -> LodSelector {
        LodSelector::new(LodThresholds::default())
    }

    #[test]
    fn test_raw_bands() {
        let s = selector();
        assert_eq!(s.select_raw(0.0), LodTier::Close);
        assert_eq!(s.select_raw(3_000.0), LodTier::Close);
        assert_eq!(s.select_raw(3_001.0), LodTier::Medium);
        assert_eq!(s.select_raw(10_000.0), LodTier::Medium);
        assert_eq!(s.select_raw(10_001.0), LodTier::Far);
    }

    /// An unbuilt object takes the raw tier.
    #[test]
    fn test_none_uses_raw() {
        let s = selector();
        assert_eq!(s.select(LodTier::None, 9_500.0), LodTier::Medium);
        assert_eq!(s.select(LodTier::None, 10_500.0), LodTier::Far);
    }

    #[test]
    fn test_far_sticks_until_ninety_percent() {
        let s = selector();
        assert_eq!(s.select(LodTier::Far, 9_100.0), LodTier::Far);
        assert_eq!(s.select(LodTier::Far, 8_900.0), LodTier::Medium);
    }

    #[test]
    fn test_medium_band_edges() {
        let s = selector();
        assert_eq!(s.select(LodTier::Medium, 10_900.0), LodTier::Medium);
        assert_eq!(s.select(LodTier::Medium, 11_100.0), LodTier::Far);
        assert_eq!(s.select(LodTier::Medium, 2_800.0), LodTier::Medium);
        assert_eq!(s.select(LodTier::Medium, 2_600.0), LodTier::Close);
    }

    #[test]
    fn test_close_sticks_until_one_ten_percent() {
        let s = selector();
        assert_eq!(s.select(LodTier::Close, 3_250.0), LodTier::Close);
        assert_eq!(s.select(LodTier::Close, 3_400.0), LodTier::Medium);
    }

    #[test]
    fn test_bias_scales_thresholds() {
        let mut s = selector();
        s.set_bias(0.6);
        assert_eq!(s.thresholds().far(), 6_000.0);
        assert_eq!(s.select_raw(2_000.0), LodTier::Medium);
        s.set_bias(f32::NAN);
        assert_eq!(s.thresholds().far(), 10_000.0);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        assert_eq!(
            LodThresholds::new(1_000.0, 2_000.0, 0.1),
            Err(LodError::InvertedThresholds { far: 1_000.0, medium: 2_000.0 })
        );
        assert!(matches!(
            LodThresholds::new(10_000.0, f32::NAN, 0.1),
            Err(LodError::NonPositiveThreshold { .. })
        ));
        assert_eq!(LodThresholds::new(10_000.0, 3_000.0, 0.5), Err(LodError::Hysteresis(0.5)));
        assert_eq!(LodThresholds::new(10_000.0, 3_000.0, 0.1), Ok(LodThresholds::default()));
    }

    /// A monotone sweep through both thresholds changes tier exactly twice.
    #[test]
    fn test_full_sweep_changes_each_boundary_once() {
        let s = selector();
        let mut tier = s.select(LodTier::None, 100.0);
        let mut changes = 0;
        let mut d = 100.0;
        while d < 20_000.0 {
            let next = s.select(tier, d);
            if next != tier {
                changes += 1;
                tier = next;
            }
            d += 50.0;
        }
        assert_eq!(changes, 2);
        assert_eq!(tier, LodTier::Far);
    }

    proptest! {
        /// Oscillating within ±5% of a threshold never changes the tier
        /// after the initial assignment.
        #[test]
        fn prop_oscillation_near_threshold_is_stable(
            near_far in any::<bool>(),
            offsets in prop::collection::vec(-0.05f32..0.05, 1..64),
        ) {
            let s = selector();
            let threshold = if near_far { 10_000.0 } else { 3_000.0 };
            let mut tier = s.select(LodTier::None, threshold * (1.0 + offsets[0]));
            let initial = tier;
            for offset in &offsets[1..] {
                tier = s.select(tier, threshold * (1.0 + offset));
                prop_assert_eq!(tier, initial);
            }
        }
    }
}
