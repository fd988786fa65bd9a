use crate::core::race::SimConstants;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentKind {
    Spin,
    Mechanical,
    Collision,
}

/// * `kind` - What happened, see [IncidentKind]
/// * `time_lost` - (s) Added to the car's cumulative time when it keeps running
/// * `dnf` - True if the car retires on the spot
#[derive(Debug, Clone, Copy)]
pub struct Incident {
    pub kind: IncidentKind,
    pub time_lost: f64,
    pub dnf: bool,
}

/// * `aggression` - Driver aggression rating (0-100)
/// * `reliability` - Team reliability rating (0-100)
/// * `extra_dnf_chance` - Full-race mechanical failure probability derived from
/// worn components, 0.0 when all components are healthy
/// * `incident_multiplier` - Track archetype risk scaling, 1.0 for a balanced track
#[derive(Debug, Clone, Copy)]
pub struct IncidentParams {
    pub aggression: f64,
    pub reliability: f64,
    pub extra_dnf_chance: f64,
    pub incident_multiplier: f64,
}

/// check_for_incident rolls the two per-car per-lap stochastic gates.
///
/// The component gate comes first: `extra_dnf_chance` is amortized over a
/// full-length race and causes an immediate mechanical DNF, short-circuiting
/// the regular incident roll. The regular gate branches uniformly into a
/// spin (time loss, keeps running), a mechanical failure (DNF) or a
/// collision (time loss, 30% chance of a DNF).
pub fn check_for_incident<R: Rng>(
    params: &IncidentParams,
    consts: &SimConstants,
    rng: &mut R,
) -> Option<Incident> {
    if params.extra_dnf_chance > 0.0
        && rng.gen::<f64>() < params.extra_dnf_chance / consts.dnf_amortization_laps
    {
        return Some(Incident {
            kind: IncidentKind::Mechanical,
            time_lost: 0.0,
            dnf: true,
        });
    }

    let modifier = 1.0 + params.aggression * 0.005 - params.reliability * 0.003;
    let chance = consts.incident_base_chance * modifier.max(0.1) * params.incident_multiplier;

    if rng.gen::<f64>() >= chance {
        return None;
    }

    let roll: f64 = rng.gen();
    if roll < 0.5 {
        Some(Incident {
            kind: IncidentKind::Spin,
            time_lost: rng.gen_range(3.0..7.0),
            dnf: false,
        })
    } else if roll < 0.8 {
        Some(Incident {
            kind: IncidentKind::Mechanical,
            time_lost: 0.0,
            dnf: true,
        })
    } else {
        Some(Incident {
            kind: IncidentKind::Collision,
            time_lost: rng.gen_range(5.0..15.0),
            dnf: rng.gen::<f64>() < 0.3,
        })
    }
}

/// compress_gaps re-spaces cumulative times to a fixed increment behind the
/// leader while a safety car is out. The input must already be sorted by
/// cumulative time; order is preserved.
pub fn compress_gaps(cumulative_times: &[f64], spacing: f64) -> Vec<f64> {
    match cumulative_times.first() {
        Some(&leader) => (0..cumulative_times.len())
            .map(|i| leader + i as f64 * spacing)
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn worn_out_components_force_a_mechanical_dnf() {
        let consts = SimConstants::default();
        let params = IncidentParams {
            aggression: 0.0,
            reliability: 100.0,
            // certain failure amortized over the race equals the divisor
            extra_dnf_chance: consts.dnf_amortization_laps,
            incident_multiplier: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let incident = check_for_incident(&params, &consts, &mut rng)
                .expect("guaranteed component failure did not trigger");
            assert_eq!(incident.kind, IncidentKind::Mechanical);
            assert!(incident.dnf);
            assert_abs_diff_eq!(incident.time_lost, 0.0);
        }
    }

    #[test]
    fn zero_multiplier_suppresses_regular_incidents() {
        let consts = SimConstants::default();
        let params = IncidentParams {
            aggression: 100.0,
            reliability: 0.0,
            extra_dnf_chance: 0.0,
            incident_multiplier: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..500 {
            assert!(check_for_incident(&params, &consts, &mut rng).is_none());
        }
    }

    #[test]
    fn incident_outcomes_stay_within_documented_ranges() {
        let consts = SimConstants::default();
        let params = IncidentParams {
            aggression: 100.0,
            reliability: 0.0,
            extra_dnf_chance: 0.0,
            incident_multiplier: 500.0,
        };
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen_any = false;
        for _ in 0..2000 {
            if let Some(incident) = check_for_incident(&params, &consts, &mut rng) {
                seen_any = true;
                match incident.kind {
                    IncidentKind::Spin => {
                        assert!(incident.time_lost >= 3.0 && incident.time_lost < 7.0);
                        assert!(!incident.dnf);
                    }
                    IncidentKind::Mechanical => {
                        assert_abs_diff_eq!(incident.time_lost, 0.0);
                        assert!(incident.dnf);
                    }
                    IncidentKind::Collision => {
                        assert!(incident.time_lost >= 5.0 && incident.time_lost < 15.0);
                    }
                }
            }
        }
        assert!(seen_any);
    }

    #[test]
    fn compress_gaps_spaces_cars_evenly_behind_the_leader() {
        let compressed = compress_gaps(&[0.0, 1.5, 3.2, 8.0], 0.2);
        assert_eq!(compressed.len(), 4);
        for pair in compressed.windows(2) {
            assert_abs_diff_eq!(pair[1] - pair[0], 0.2);
        }
        assert_abs_diff_eq!(compressed[0], 0.0);
    }

    #[test]
    fn compress_gaps_handles_an_empty_field() {
        assert!(compress_gaps(&[], 0.2).is_empty());
    }
}
