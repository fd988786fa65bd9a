use crate::core::driver::Driver;
use crate::core::laptime::{calculate_lap_time, LapTimeParams};
use crate::core::team::Team;
use crate::core::tires::{TireCompound, TireTable};
use crate::core::track::Track;
use crate::core::weather::Weather;
use helpers::general::{argsort, SortOrder};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

/// Risk level chosen for the timed lap. AI drivers always run `Push`; the
/// mode only matters for the human-controlled driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifyingMode {
    Safe,
    Push,
    FullSend,
}

struct ModeModifier {
    speed_boost: f64,
    error_chance: f64,
    error_penalty: f64,
}

impl QualifyingMode {
    fn modifier(self) -> ModeModifier {
        match self {
            QualifyingMode::Safe => ModeModifier {
                speed_boost: 0.9,
                error_chance: 0.02,
                error_penalty: 0.5,
            },
            QualifyingMode::Push => ModeModifier {
                speed_boost: 1.0,
                error_chance: 0.15,
                error_penalty: 1.5,
            },
            QualifyingMode::FullSend => ModeModifier {
                speed_boost: 1.05,
                error_chance: 0.35,
                error_penalty: 3.0,
            },
        }
    }
}

impl FromStr for QualifyingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "safe" => Ok(QualifyingMode::Safe),
            "push" => Ok(QualifyingMode::Push),
            "full-send" => Ok(QualifyingMode::FullSend),
            other => Err(format!("unknown qualifying mode: {}", other)),
        }
    }
}

/// * `position` - Final grid position (1-based)
/// * `driver_id` - Driver who set the time
/// * `team_id` - Their team
/// * `time` - (s) The timed lap including any error penalty
/// * `error` - True if the driver made a mistake on the lap
#[derive(Debug, Serialize, Clone)]
pub struct QualifyingResult {
    pub position: u32,
    pub driver_id: String,
    pub team_id: String,
    pub time: f64,
    pub error: bool,
}

/// simulate_qualifying runs a single session: one timed lap per driver on
/// soft tires with a near-empty tank, sorted ascending by time. Ties keep
/// the input order.
pub fn simulate_qualifying<R: Rng>(
    teams: &[Team],
    drivers: &[Driver],
    track: &Track,
    weather: Weather,
    player_driver_id: &str,
    player_mode: QualifyingMode,
    tires: &TireTable,
    rng: &mut R,
) -> Vec<QualifyingResult> {
    let team_map: HashMap<&str, &Team> = teams.iter().map(|t| (t.id.as_str(), t)).collect();

    let results: Vec<QualifyingResult> = drivers
        .iter()
        .filter_map(|driver| {
            let team = team_map.get(driver.team_id.as_str())?;
            let mode = if driver.id == player_driver_id {
                player_mode
            } else {
                QualifyingMode::Push
            };
            let modifier = mode.modifier();

            let base_lap = calculate_lap_time(
                &LapTimeParams {
                    top_speed: team.top_speed * modifier.speed_boost,
                    driver_speed: driver.speed,
                    tire_management: driver.tire_management,
                    compound: TireCompound::Soft,
                    laps_on_tire: 0,
                    fuel_load: 0.05,
                    weather,
                    base_lap_time: track.base_lap_time,
                    top_speed_weight: 1.0,
                },
                tires,
                rng,
            );

            let error = rng.gen::<f64>() < modifier.error_chance;
            let time = if error {
                base_lap + rng.gen_range(0.5..=modifier.error_penalty)
            } else {
                base_lap
            };

            Some(QualifyingResult {
                position: 0,
                driver_id: driver.id.clone(),
                team_id: driver.team_id.clone(),
                time,
                error,
            })
        })
        .collect();

    let times: Vec<f64> = results.iter().map(|r| r.time).collect();
    let order = argsort(&times, SortOrder::Ascending);
    order
        .iter()
        .enumerate()
        .map(|(rank, &idx)| {
            let mut result = results[idx].clone();
            result.position = rank as u32 + 1;
            result
        })
        .collect()
}

/// simulate_knockout_qualifying runs a three-stage style knockout: every
/// entry in `stage_cuts` is a non-final stage eliminating that many drivers
/// from the bottom of its session, who take grid slots counting down from
/// the stage's field size. One more session over the survivors decides the
/// top positions.
pub fn simulate_knockout_qualifying<R: Rng>(
    teams: &[Team],
    drivers: &[Driver],
    track: &Track,
    weather: Weather,
    player_driver_id: &str,
    player_mode: QualifyingMode,
    stage_cuts: &[usize],
    tires: &TireTable,
    rng: &mut R,
) -> Vec<QualifyingResult> {
    let mut pool: Vec<Driver> = drivers.to_vec();
    let mut final_grid: Vec<QualifyingResult> = Vec::with_capacity(drivers.len());

    for &cut in stage_cuts {
        let session = simulate_qualifying(
            teams,
            &pool,
            track,
            weather,
            player_driver_id,
            player_mode,
            tires,
            rng,
        );
        let field_size = session.len();
        let cut = cut.min(field_size);
        let survivors_count = field_size - cut;

        // everyone slower was knocked out in an earlier stage, so the session
        // rank of an eliminated driver is already their final grid slot
        for result in session[survivors_count..].iter() {
            final_grid.push(result.clone());
        }

        let survivor_ids: Vec<String> = session[..survivors_count]
            .iter()
            .map(|r| r.driver_id.clone())
            .collect();
        pool.retain(|d| survivor_ids.contains(&d.id));
    }

    let final_session = simulate_qualifying(
        teams,
        &pool,
        track,
        weather,
        player_driver_id,
        player_mode,
        tires,
        rng,
    );
    final_grid.extend(final_session);

    final_grid.sort_by_key(|r| r.position);
    final_grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pre::defaults::{default_drivers, default_teams, default_tracks};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixture() -> (Vec<Team>, Vec<Driver>, Track) {
        let teams = default_teams();
        let drivers = default_drivers();
        let track = default_tracks().remove(0);
        (teams, drivers, track)
    }

    #[test]
    fn single_session_classifies_the_whole_field() {
        let (teams, drivers, track) = fixture();
        let player = drivers[0].id.clone();
        let mut rng = StdRng::seed_from_u64(101);
        let results = simulate_qualifying(
            &teams,
            &drivers,
            &track,
            Weather::Dry,
            &player,
            QualifyingMode::Push,
            &TireTable::default(),
            &mut rng,
        );

        assert_eq!(results.len(), drivers.len());
        let mut positions: Vec<u32> = results.iter().map(|r| r.position).collect();
        positions.sort_unstable();
        assert_eq!(positions, (1..=drivers.len() as u32).collect::<Vec<u32>>());
        for pair in results.windows(2) {
            assert!(pair[0].time <= pair[1].time);
        }
    }

    #[test]
    fn knockout_assigns_every_grid_slot_once() {
        let (teams, drivers, track) = fixture();
        let player = drivers[0].id.clone();
        let mut rng = StdRng::seed_from_u64(202);
        let results = simulate_knockout_qualifying(
            &teams,
            &drivers,
            &track,
            Weather::Dry,
            &player,
            QualifyingMode::Safe,
            &[5, 5],
            &TireTable::default(),
            &mut rng,
        );

        assert_eq!(results.len(), drivers.len());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.position, i as u32 + 1);
        }
        let mut ids: Vec<&str> = results.iter().map(|r| r.driver_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), drivers.len());
    }

    #[test]
    fn knockout_final_stage_fills_the_front_rows() {
        let (teams, drivers, track) = fixture();
        let player = drivers[0].id.clone();
        let mut rng = StdRng::seed_from_u64(303);
        let field = drivers.len();
        let results = simulate_knockout_qualifying(
            &teams,
            &drivers,
            &track,
            Weather::Dry,
            &player,
            QualifyingMode::Push,
            &[5, 5],
            &TireTable::default(),
            &mut rng,
        );
        // survivors of both cuts occupy positions 1..=field-10
        assert_eq!(results.last().map(|r| r.position), Some(field as u32));
        assert_eq!(results.first().map(|r| r.position), Some(1));
    }
}
