use crate::core::weather::Weather;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available tire compounds. Soft/medium/hard are the slicks, intermediate
/// and wet are the rain tires.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TireCompound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
}

impl TireCompound {
    pub fn is_slick(self) -> bool {
        matches!(
            self,
            TireCompound::Soft | TireCompound::Medium | TireCompound::Hard
        )
    }
}

impl fmt::Display for TireCompound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            TireCompound::Soft => "soft",
            TireCompound::Medium => "medium",
            TireCompound::Hard => "hard",
            TireCompound::Intermediate => "intermediate",
            TireCompound::Wet => "wet",
        };
        write!(f, "{}", label)
    }
}

/// * `grip_base` - Unitless grip penalty of a fresh set (1.0 = track-neutral, lower is faster)
/// * `degradation_rate` - Grip penalty added per lap of age
/// * `optimal_life` - (laps) Intended stint length, reference data for strategy screens
#[derive(Debug, Deserialize, Clone)]
pub struct TireSpec {
    pub grip_base: f64,
    pub degradation_rate: f64,
    pub optimal_life: u32,
}

/// Per-compound tire characteristics. The table is part of the static
/// configuration supplied by the hosting layer.
#[derive(Debug, Deserialize, Clone)]
pub struct TireTable {
    pub soft: TireSpec,
    pub medium: TireSpec,
    pub hard: TireSpec,
    pub intermediate: TireSpec,
    pub wet: TireSpec,
}

impl TireTable {
    pub fn spec(&self, compound: TireCompound) -> &TireSpec {
        match compound {
            TireCompound::Soft => &self.soft,
            TireCompound::Medium => &self.medium,
            TireCompound::Hard => &self.hard,
            TireCompound::Intermediate => &self.intermediate,
            TireCompound::Wet => &self.wet,
        }
    }

    /// Degradation per lap after the driver's tire management is applied.
    /// A rating of 100 halves the compound's base rate.
    pub fn effective_degradation(&self, compound: TireCompound, tire_management: f64) -> f64 {
        self.spec(compound).degradation_rate * (1.0 - tire_management * 0.005)
    }

    /// Grip penalty of a tire set after `laps_on_tire` laps. Grip is additive
    /// in the penalty sense: larger values are slower.
    pub fn grip(&self, compound: TireCompound, laps_on_tire: u32, tire_management: f64) -> f64 {
        self.spec(compound).grip_base
            + laps_on_tire as f64 * self.effective_degradation(compound, tire_management)
    }
}

impl Default for TireTable {
    fn default() -> TireTable {
        TireTable {
            soft: TireSpec {
                grip_base: 0.97,
                degradation_rate: 0.025,
                optimal_life: 10,
            },
            medium: TireSpec {
                grip_base: 1.0,
                degradation_rate: 0.015,
                optimal_life: 20,
            },
            hard: TireSpec {
                grip_base: 1.03,
                degradation_rate: 0.008,
                optimal_life: 35,
            },
            intermediate: TireSpec {
                grip_base: 0.95,
                degradation_rate: 0.012,
                optimal_life: 25,
            },
            wet: TireSpec {
                grip_base: 0.92,
                degradation_rate: 0.01,
                optimal_life: 30,
            },
        }
    }
}

/// Weather suitability of a compound as a lap time multiplier. Slicks are
/// neutral in the dry and fall off a cliff in heavy rain; rain tires pay a
/// penalty on a dry track and approach 1.0 as the rain intensifies.
pub fn weather_grip_multiplier(compound: TireCompound, weather: Weather) -> f64 {
    match (weather, compound) {
        (Weather::Dry, TireCompound::Intermediate) => 1.1,
        (Weather::Dry, TireCompound::Wet) => 1.2,
        (Weather::Dry, _) => 1.0,
        (Weather::LightRain, TireCompound::Intermediate) => 1.0,
        (Weather::LightRain, TireCompound::Wet) => 1.05,
        (Weather::LightRain, _) => 1.25,
        (Weather::HeavyRain, TireCompound::Intermediate) => 1.15,
        (Weather::HeavyRain, TireCompound::Wet) => 1.0,
        (Weather::HeavyRain, _) => 1.6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fresh_set_has_base_grip_regardless_of_skill() {
        let tires = TireTable::default();
        for skill in [0.0, 50.0, 100.0].iter() {
            assert_abs_diff_eq!(tires.grip(TireCompound::Soft, 0, *skill), 0.97);
        }
    }

    #[test]
    fn grip_penalty_grows_with_tire_age() {
        let tires = TireTable::default();
        let mut prev = tires.grip(TireCompound::Medium, 0, 50.0);
        for laps in 1..30 {
            let cur = tires.grip(TireCompound::Medium, laps, 50.0);
            assert!(cur > prev);
            prev = cur;
        }
    }

    #[test]
    fn tire_management_never_increases_degradation() {
        let tires = TireTable::default();
        let mut prev = tires.grip(TireCompound::Soft, 15, 0.0);
        for skill in 1..=100 {
            let cur = tires.grip(TireCompound::Soft, 15, skill as f64);
            assert!(cur <= prev);
            prev = cur;
        }
    }

    #[test]
    fn skill_100_halves_base_degradation() {
        let tires = TireTable::default();
        assert_abs_diff_eq!(
            tires.effective_degradation(TireCompound::Soft, 100.0),
            0.0125
        );
    }

    #[test]
    fn weather_grip_matrix_matches_reference_values() {
        assert_abs_diff_eq!(
            weather_grip_multiplier(TireCompound::Soft, Weather::Dry),
            1.0
        );
        assert_abs_diff_eq!(
            weather_grip_multiplier(TireCompound::Medium, Weather::HeavyRain),
            1.6
        );
        assert_abs_diff_eq!(
            weather_grip_multiplier(TireCompound::Wet, Weather::HeavyRain),
            1.0
        );
        assert_abs_diff_eq!(
            weather_grip_multiplier(TireCompound::Intermediate, Weather::LightRain),
            1.0
        );
        assert_abs_diff_eq!(
            weather_grip_multiplier(TireCompound::Wet, Weather::Dry),
            1.2
        );
    }
}
