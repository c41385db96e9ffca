//! Needs model - two decaying scalars that drive the pet's goal priority.

use serde::{Deserialize, Serialize};

/// Fully satisfied need value
pub const NEED_MAX: f32 = 100.0;

/// Below this a need takes over goal selection
pub const NEED_URGENT: f32 = 40.0;

/// Below this the pet refuses to be petted
pub const NEED_GRUMPY: f32 = 30.0;

/// Below this a sleeping pet wakes up
pub const NEED_CRITICAL: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedKind {
    Hunger,
    Toilet,
}

/// Decay per simulated second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayRates {
    pub hunger_per_sec: f32,
    pub toilet_per_sec: f32,
}

impl Default for DecayRates {
    fn default() -> Self {
        Self {
            // Empty after two hours
            hunger_per_sec: NEED_MAX / 7200.0,
            // Empty after three hours
            toilet_per_sec: NEED_MAX / 10800.0,
        }
    }
}

/// Values run from 0.0 (desperate) to 100.0 (satisfied)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    pub hunger: f32,
    pub toilet: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            hunger: NEED_MAX,
            toilet: NEED_MAX,
        }
    }
}

impl Needs {
    pub fn new(hunger: f32, toilet: f32) -> Self {
        let mut needs = Self::default();
        needs.set(NeedKind::Hunger, hunger);
        needs.set(NeedKind::Toilet, toilet);
        needs
    }

    /// Apply decay over `dt` seconds. Negative or non-finite steps are ignored.
    pub fn decay(&mut self, dt: f32, rates: &DecayRates) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.hunger = (self.hunger - rates.hunger_per_sec.max(0.0) * dt).clamp(0.0, NEED_MAX);
        self.toilet = (self.toilet - rates.toilet_per_sec.max(0.0) * dt).clamp(0.0, NEED_MAX);
    }

    pub fn get(&self, kind: NeedKind) -> f32 {
        match kind {
            NeedKind::Hunger => self.hunger,
            NeedKind::Toilet => self.toilet,
        }
    }

    pub fn set(&mut self, kind: NeedKind, value: f32) {
        let value = if value.is_finite() { value.clamp(0.0, NEED_MAX) } else { NEED_MAX };
        match kind {
            NeedKind::Hunger => self.hunger = value,
            NeedKind::Toilet => self.toilet = value,
        }
    }

    /// Fully restore a need
    pub fn satisfy(&mut self, kind: NeedKind) {
        self.set(kind, NEED_MAX);
    }

    /// The first need below `threshold`, hunger before toilet
    pub fn most_pressing(&self, threshold: f32) -> Option<NeedKind> {
        [NeedKind::Hunger, NeedKind::Toilet]
            .into_iter()
            .find(|kind| self.get(*kind) < threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_needs_decay() {
        let mut needs = Needs::default();
        needs.decay(3600.0, &DecayRates::default());
        assert!((needs.hunger - 50.0).abs() < 0.01);
        assert!(needs.toilet > needs.hunger);
    }

    #[test]
    fn test_most_pressing_prefers_hunger() {
        let needs = Needs::new(20.0, 10.0);
        assert_eq!(needs.most_pressing(NEED_URGENT), Some(NeedKind::Hunger));

        let needs = Needs::new(80.0, 10.0);
        assert_eq!(needs.most_pressing(NEED_URGENT), Some(NeedKind::Toilet));
        assert_eq!(needs.most_pressing(5.0), None);
    }

    #[test]
    fn test_satisfy_restores_to_max() {
        let mut needs = Needs::new(3.0, 50.0);
        needs.satisfy(NeedKind::Hunger);
        assert_eq!(needs.hunger, NEED_MAX);
    }

    proptest! {
        #[test]
        fn needs_stay_in_range(
            hunger in -50.0f32..150.0,
            toilet in -50.0f32..150.0,
            steps in proptest::collection::vec(0.0f32..5000.0, 0..40),
            hunger_rate in 0.0f32..5.0,
            toilet_rate in 0.0f32..5.0,
        ) {
            let rates = DecayRates { hunger_per_sec: hunger_rate, toilet_per_sec: toilet_rate };
            let mut needs = Needs::new(hunger, toilet);
            for dt in steps {
                needs.decay(dt, &rates);
                prop_assert!((0.0..=NEED_MAX).contains(&needs.hunger));
                prop_assert!((0.0..=NEED_MAX).contains(&needs.toilet));
            }
        }
    }
}
