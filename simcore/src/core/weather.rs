use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session weather state. Transitions only happen between neighbors on the
/// dry <-> light-rain <-> heavy-rain chain, there is no direct jump from dry
/// to heavy rain.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Weather {
    Dry,
    LightRain,
    HeavyRain,
}

impl Weather {
    pub fn is_raining(self) -> bool {
        !matches!(self, Weather::Dry)
    }

    fn neighbors(self) -> &'static [Weather] {
        match self {
            Weather::Dry => &[Weather::LightRain],
            Weather::LightRain => &[Weather::Dry, Weather::HeavyRain],
            Weather::HeavyRain => &[Weather::LightRain],
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Weather::Dry => "dry",
            Weather::LightRain => "light rain",
            Weather::HeavyRain => "heavy rain",
        };
        write!(f, "{}", label)
    }
}

/// next_weather picks uniformly among the states adjacent to `current`.
pub fn next_weather<R: Rng>(current: Weather, rng: &mut R) -> Weather {
    let options = current.neighbors();
    options[rng.gen_range(0..options.len())]
}

/// simulate_weather_for_lap is a Bernoulli trial invoked once per race lap:
/// with probability `change_chance` the weather moves to a neighboring state,
/// otherwise it stays.
pub fn simulate_weather_for_lap<R: Rng>(
    current: Weather,
    change_chance: f64,
    rng: &mut R,
) -> Weather {
    if rng.gen::<f64>() < change_chance {
        next_weather(current, rng)
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn dry_never_jumps_straight_to_heavy_rain() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert_eq!(next_weather(Weather::Dry, &mut rng), Weather::LightRain);
        }
    }

    #[test]
    fn light_rain_moves_to_both_neighbors() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen_dry = false;
        let mut seen_heavy = false;
        for _ in 0..200 {
            match next_weather(Weather::LightRain, &mut rng) {
                Weather::Dry => seen_dry = true,
                Weather::HeavyRain => seen_heavy = true,
                Weather::LightRain => panic!("light rain is not its own neighbor"),
            }
        }
        assert!(seen_dry && seen_heavy);
    }

    #[test]
    fn zero_change_chance_is_stable() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(
                simulate_weather_for_lap(Weather::HeavyRain, 0.0, &mut rng),
                Weather::HeavyRain
            );
        }
    }

    #[test]
    fn certain_change_chance_always_transitions() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert_ne!(
                simulate_weather_for_lap(Weather::Dry, 1.0, &mut rng),
                Weather::Dry
            );
        }
    }
}
