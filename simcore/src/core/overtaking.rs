use helpers::general::clamp01;
use rand::Rng;

/// A following car closes 70% of any pace advantage per lap.
const GAP_CLOSE_RATE: f64 = 0.7;

/// No pass attempt is possible beyond this gap in seconds.
const ATTACK_WINDOW: f64 = 0.5;

/// * `gap` - (s) Current gap between attacker and defender
/// * `attacker_aggression` - Attacker's aggression rating (0-100)
/// * `speed_diff` - Attacker top speed minus defender top speed
/// * `overtaking_difficulty` - Track rating (0-100, higher suppresses passing)
#[derive(Debug, Clone, Copy)]
pub struct OvertakeParams {
    pub gap: f64,
    pub attacker_aggression: f64,
    pub speed_diff: f64,
    pub overtaking_difficulty: f64,
}

/// reduce_gap shrinks the gap by a fraction of the lap time delta, never
/// below zero.
pub fn reduce_gap(current_gap: f64, time_difference: f64) -> f64 {
    (current_gap - time_difference * GAP_CLOSE_RATE).max(0.0)
}

/// attempt_overtake resolves a single pass attempt between two adjacent cars.
/// Outside the attack window the attempt always fails.
pub fn attempt_overtake<R: Rng>(params: &OvertakeParams, rng: &mut R) -> bool {
    if params.gap > ATTACK_WINDOW {
        return false;
    }
    let chance = (params.attacker_aggression * 0.4 + params.speed_diff * 0.3)
        * (1.0 - params.overtaking_difficulty * 0.01)
        / 100.0;
    rng.gen::<f64>() < clamp01(chance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn reduce_gap_closes_seventy_percent_of_the_delta() {
        assert_abs_diff_eq!(reduce_gap(2.0, 0.5), 1.65);
    }

    #[test]
    fn reduce_gap_never_goes_negative() {
        assert_abs_diff_eq!(reduce_gap(0.1, 2.0), 0.0);
    }

    #[test]
    fn no_attempt_outside_the_attack_window() {
        let params = OvertakeParams {
            gap: 1.0,
            attacker_aggression: 100.0,
            speed_diff: 100.0,
            overtaking_difficulty: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            assert!(!attempt_overtake(&params, &mut rng));
        }
    }

    #[test]
    fn overwhelming_advantage_always_passes() {
        // aggression 100 and speed_diff 200 push the raw chance above 1.0,
        // which clamps to a certain pass
        let params = OvertakeParams {
            gap: 0.2,
            attacker_aggression: 100.0,
            speed_diff: 200.0,
            overtaking_difficulty: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(19);
        for _ in 0..200 {
            assert!(attempt_overtake(&params, &mut rng));
        }
    }

    #[test]
    fn negative_chance_clamps_to_never() {
        let params = OvertakeParams {
            gap: 0.2,
            attacker_aggression: 0.0,
            speed_diff: -500.0,
            overtaking_difficulty: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..200 {
            assert!(!attempt_overtake(&params, &mut rng));
        }
    }
}
