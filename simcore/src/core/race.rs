use crate::core::driver::Driver;
use crate::core::incidents::{check_for_incident, compress_gaps, IncidentKind, IncidentParams};
use crate::core::laptime::{calculate_lap_time, LapTimeParams};
use crate::core::overtaking::{attempt_overtake, reduce_gap, OvertakeParams};
use crate::core::season::get_track_type_modifiers;
use crate::core::team::Team;
use crate::core::tires::{TireCompound, TireTable};
use crate::core::track::Track;
use crate::core::weather::{simulate_weather_for_lap, Weather};
use helpers::general::{argsort, SortOrder};
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;

/// Rank assigned to retired cars; they take no part in the ordering.
pub const RETIRED_POSITION: u32 = 99;

/// Anti-tie time offset between two grid slots at the start.
const GRID_SLOT_OFFSET: f64 = 0.5;

/// Time conceded by the old leader when a pass goes through.
const OVERTAKE_SWAP_MARGIN: f64 = 0.3;

/// Tuned probabilistic parameters of the race state machine. These are the
/// constants with no first-principles rationale, so they are kept
/// configurable instead of hard-coded.
///
/// * `incident_base_chance` - Per-car per-lap baseline incident probability
/// * `sc_pace_factor` - Lap time multiplier while the safety car is out
/// * `sc_min_laps` / `sc_max_laps` - Safety car duration range (inclusive)
/// * `sc_gap_spacing` - (s) Gap between cars after safety-car compression
/// * `dnf_amortization_laps` - Divisor spreading a component failure chance
/// over a full-length race
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimConstants {
    pub incident_base_chance: f64,
    pub sc_pace_factor: f64,
    pub sc_min_laps: u32,
    pub sc_max_laps: u32,
    pub sc_gap_spacing: f64,
    pub dnf_amortization_laps: f64,
}

impl Default for SimConstants {
    fn default() -> SimConstants {
        SimConstants {
            incident_base_chance: 0.002,
            sc_pace_factor: 1.3,
            sc_min_laps: 3,
            sc_max_laps: 5,
            sc_gap_spacing: 0.2,
            dnf_amortization_laps: 53.0,
        }
    }
}

/// Pace/degradation trade-off chosen for a car. AI cars stay neutral unless
/// the caller overrides them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverMode {
    Push,
    Neutral,
    Save,
}

impl DriverMode {
    pub fn speed_factor(self) -> f64 {
        match self {
            DriverMode::Push => 1.02,
            DriverMode::Neutral => 1.0,
            DriverMode::Save => 0.97,
        }
    }

    pub fn degradation_factor(self) -> f64 {
        match self {
            DriverMode::Push => 1.3,
            DriverMode::Neutral => 1.0,
            DriverMode::Save => 0.7,
        }
    }
}

/// Explicit car lifecycle. A car flagged for a stop serves it at the start
/// of the next lap; a retired car is frozen and excluded from everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarStatus {
    Racing,
    Pitting,
    Retired,
}

/// Per-car race state, lifecycle = one session.
#[derive(Debug, Clone)]
pub struct CarState {
    pub driver_id: String,
    pub team_id: String,
    pub tire_compound: TireCompound,
    pub laps_on_tire: u32,
    pub fuel_load: f64,
    pub cumulative_time: f64,
    pub last_lap_time: f64,
    pub position: u32,
    pub status: CarStatus,
    pub pit_this_lap: bool,
    pub compounds_used: Vec<TireCompound>,
    pub mode: DriverMode,
    /// Lap on which the car retired, `None` while it is still running.
    pub retired_on_lap: Option<u32>,
}

impl CarState {
    pub fn is_retired(&self) -> bool {
        self.status == CarStatus::Retired
    }

    /// True once the car has run on two distinct dry compounds. The
    /// simulator enforces the rule for AI cars only; whether a player with
    /// an illegal strategy may start at all is the hosting layer's call.
    pub fn used_two_dry_compounds(&self) -> bool {
        let mut slicks: Vec<TireCompound> = self
            .compounds_used
            .iter()
            .copied()
            .filter(|c| c.is_slick())
            .collect();
        slicks.dedup();
        slicks.len() >= 2
    }

    fn record_current_compound(&mut self) {
        if !self.compounds_used.contains(&self.tire_compound) {
            self.compounds_used.push(self.tire_compound);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Overtake,
    Incident,
    SafetyCar,
    WeatherChange,
    PitStop,
}

/// One entry of the per-lap event log. The log is transient: it is cleared
/// and rebuilt on every tick, not accumulated across the race.
#[derive(Debug, Clone)]
pub struct RaceEvent {
    pub lap: u32,
    pub kind: EventKind,
    pub driver_id: Option<String>,
    pub message: String,
}

/// Full per-lap snapshot of a race. `simulate_lap` consumes one snapshot and
/// produces the next; the caller owns the cadence and decides completion by
/// comparing `current_lap` against `total_laps`.
#[derive(Debug, Clone)]
pub struct RaceState {
    pub cars: Vec<CarState>,
    pub current_lap: u32,
    pub total_laps: u32,
    pub weather: Weather,
    pub safety_car: bool,
    pub safety_car_laps_left: u32,
    pub track: Track,
    pub teams: Vec<Team>,
    pub drivers: Vec<Driver>,
    pub tires: TireTable,
    pub player_driver_id: String,
    pub extra_dnf_chance: f64,
    pub events: Vec<RaceEvent>,
}

/// * `driver_id` - Driver starting from this slot
/// * `position` - Grid slot (1-based)
#[derive(Debug, Clone)]
pub struct GridEntry {
    pub driver_id: String,
    pub position: u32,
}

impl RaceState {
    pub fn is_finished(&self) -> bool {
        self.current_lap >= self.total_laps
    }

    /// Player control: switch the pace mode of the player's car.
    pub fn set_player_mode(&mut self, mode: DriverMode) {
        if let Some(car) = self.player_car_mut() {
            if !car.is_retired() {
                car.mode = mode;
            }
        }
    }

    /// Player control: flag a pit stop for the chosen compound. The stop is
    /// served at the start of the next simulated lap.
    pub fn call_player_pit_stop(&mut self, compound: TireCompound) {
        if let Some(car) = self.player_car_mut() {
            if car.status == CarStatus::Racing {
                car.status = CarStatus::Pitting;
                car.tire_compound = compound;
            }
        }
    }

    pub fn player_car(&self) -> Option<&CarState> {
        let id = self.player_driver_id.clone();
        self.cars.iter().find(|c| c.driver_id == id)
    }

    fn player_car_mut(&mut self) -> Option<&mut CarState> {
        let id = self.player_driver_id.clone();
        self.cars.iter_mut().find(|c| c.driver_id == id)
    }
}

// -------------------------------------------------------------------------
// INITIALIZATION ----------------------------------------------------------
// -------------------------------------------------------------------------

/// create_initial_race_state builds one car per grid entry, ordered by
/// starting position, everyone on fresh mediums with a full tank. A small
/// per-slot time offset avoids lap-one ties.
#[allow(clippy::too_many_arguments)]
pub fn create_initial_race_state(
    teams: &[Team],
    drivers: &[Driver],
    track: &Track,
    grid: &[GridEntry],
    weather: Weather,
    player_driver_id: &str,
    extra_dnf_chance: f64,
    tires: TireTable,
) -> RaceState {
    let driver_map: HashMap<&str, &Driver> = drivers.iter().map(|d| (d.id.as_str(), d)).collect();

    let mut slots: Vec<GridEntry> = grid.to_vec();
    slots.sort_by_key(|g| g.position);

    let cars: Vec<CarState> = slots
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| {
            let driver = driver_map.get(slot.driver_id.as_str())?;
            Some(CarState {
                driver_id: driver.id.clone(),
                team_id: driver.team_id.clone(),
                tire_compound: TireCompound::Medium,
                laps_on_tire: 0,
                fuel_load: 1.0,
                cumulative_time: i as f64 * GRID_SLOT_OFFSET,
                last_lap_time: 0.0,
                position: i as u32 + 1,
                status: CarStatus::Racing,
                pit_this_lap: false,
                compounds_used: vec![TireCompound::Medium],
                mode: DriverMode::Neutral,
                retired_on_lap: None,
            })
        })
        .collect();

    RaceState {
        cars,
        current_lap: 0,
        total_laps: track.total_laps,
        weather,
        safety_car: false,
        safety_car_laps_left: 0,
        track: track.clone(),
        teams: teams.to_vec(),
        drivers: drivers.to_vec(),
        tires,
        player_driver_id: player_driver_id.to_owned(),
        extra_dnf_chance,
        events: Vec::new(),
    }
}

// -------------------------------------------------------------------------
// MAIN METHOD -------------------------------------------------------------
// -------------------------------------------------------------------------

/// simulate_lap advances the race by one lap. The input state is left
/// untouched; a full new snapshot is returned.
///
/// Tick order: weather roll, safety-car countdown, per-car pit service / AI
/// strategy / lap time / incidents, safety-car gap compression, overtaking
/// (suppressed under the safety car), position recompute.
pub fn simulate_lap<R: Rng>(state: &RaceState, consts: &SimConstants, rng: &mut R) -> RaceState {
    let mut next = state.clone();
    next.current_lap += 1;
    next.events.clear();

    let lap = next.current_lap;
    let track_mods = get_track_type_modifiers(next.track.track_type);

    // one shared weather value per session, rolled once per lap
    let new_weather = simulate_weather_for_lap(next.weather, next.track.weather_change_chance, rng);
    if new_weather != next.weather {
        next.events.push(RaceEvent {
            lap,
            kind: EventKind::WeatherChange,
            driver_id: None,
            message: format!("Weather changed to {}", new_weather),
        });
        next.weather = new_weather;
    }

    if next.safety_car {
        next.safety_car_laps_left = next.safety_car_laps_left.saturating_sub(1);
        if next.safety_car_laps_left == 0 {
            next.safety_car = false;
            next.events.push(RaceEvent {
                lap,
                kind: EventKind::SafetyCar,
                driver_id: None,
                message: "Safety car in!".to_owned(),
            });
        }
    }

    let fuel_per_lap = 1.0 / next.total_laps as f64;

    // split the borrows so cars can be mutated while the reference data is read
    let RaceState {
        cars,
        total_laps,
        weather,
        safety_car,
        safety_car_laps_left,
        track,
        teams,
        drivers,
        tires,
        player_driver_id,
        extra_dnf_chance,
        events,
        ..
    } = &mut next;

    let team_map: HashMap<&str, &Team> = teams.iter().map(|t| (t.id.as_str(), t)).collect();
    let driver_map: HashMap<&str, &Driver> = drivers.iter().map(|d| (d.id.as_str(), d)).collect();
    let player_team_id = driver_map
        .get(player_driver_id.as_str())
        .map(|d| d.team_id.clone())
        .unwrap_or_default();

    for car in cars.iter_mut() {
        if car.is_retired() {
            continue;
        }

        let driver = match driver_map.get(car.driver_id.as_str()) {
            Some(d) => *d,
            None => continue,
        };
        let team = match team_map.get(car.team_id.as_str()) {
            Some(t) => *t,
            None => continue,
        };

        if car.status == CarStatus::Pitting {
            car.cumulative_time += track.pit_lane_time_loss;
            car.laps_on_tire = 0;
            car.status = CarStatus::Racing;
            car.pit_this_lap = true;
            car.record_current_compound();
            events.push(RaceEvent {
                lap,
                kind: EventKind::PitStop,
                driver_id: Some(car.driver_id.clone()),
                message: format!("{} pits for {} tires", driver.name, car.tire_compound),
            });
        } else {
            car.pit_this_lap = false;
            if car.driver_id != *player_driver_id {
                run_ai_pit_strategy(car, *weather, lap, *total_laps, rng);
            }
        }

        let lap_time = calculate_lap_time(
            &LapTimeParams {
                top_speed: team.top_speed * car.mode.speed_factor(),
                driver_speed: driver.speed,
                tire_management: driver.tire_management,
                compound: car.tire_compound,
                laps_on_tire: (car.laps_on_tire as f64 * car.mode.degradation_factor()).floor()
                    as u32,
                fuel_load: car.fuel_load,
                weather: *weather,
                base_lap_time: track.base_lap_time,
                top_speed_weight: track_mods.top_speed_weight,
            },
            tires,
            rng,
        );

        car.last_lap_time = if *safety_car {
            lap_time * consts.sc_pace_factor
        } else {
            lap_time
        };
        car.cumulative_time += car.last_lap_time;
        car.laps_on_tire += 1;
        car.fuel_load = (car.fuel_load - fuel_per_lap).max(0.0);

        // component risk only applies to the team whose components we track
        let extra = if car.team_id == player_team_id {
            *extra_dnf_chance
        } else {
            0.0
        };

        let incident = check_for_incident(
            &IncidentParams {
                aggression: driver.aggression,
                reliability: team.reliability,
                extra_dnf_chance: extra,
                incident_multiplier: track_mods.incident_multiplier,
            },
            consts,
            rng,
        );

        if let Some(incident) = incident {
            if incident.dnf {
                car.status = CarStatus::Retired;
                car.retired_on_lap = Some(lap);
                events.push(RaceEvent {
                    lap,
                    kind: EventKind::Incident,
                    driver_id: Some(car.driver_id.clone()),
                    message: format!("{} retires ({:?})", driver.name, incident.kind),
                });
                if !*safety_car && incident.kind == IncidentKind::Mechanical {
                    *safety_car = true;
                    *safety_car_laps_left = rng.gen_range(consts.sc_min_laps..=consts.sc_max_laps);
                    events.push(RaceEvent {
                        lap,
                        kind: EventKind::SafetyCar,
                        driver_id: None,
                        message: "Safety car deployed!".to_owned(),
                    });
                }
            } else {
                car.cumulative_time += incident.time_lost;
                events.push(RaceEvent {
                    lap,
                    kind: EventKind::Incident,
                    driver_id: Some(car.driver_id.clone()),
                    message: format!("{} has a {:?}!", driver.name, incident.kind),
                });
            }
        }
    }

    if next.safety_car {
        compress_field(&mut next, consts.sc_gap_spacing);
    } else {
        resolve_overtakes(&mut next, rng);
    }

    update_positions(&mut next.cars);

    next
}

// -------------------------------------------------------------------------
// RACE SIMULATOR PARTS ----------------------------------------------------
// -------------------------------------------------------------------------

/// AI pit strategy for non-player cars: weather-reactive tire swaps, age
/// thresholds per compound, and the forced stop that satisfies the
/// two-dry-compound rule in the 40-60% race window.
fn run_ai_pit_strategy<R: Rng>(
    car: &mut CarState,
    weather: Weather,
    current_lap: u32,
    total_laps: u32,
    rng: &mut R,
) {
    let mut should_pit = false;
    let mut new_compound = car.tire_compound;
    let on_slicks = car.tire_compound.is_slick();

    if weather.is_raining() && on_slicks && rng.gen::<f64>() < 0.5 {
        should_pit = true;
        new_compound = if weather == Weather::HeavyRain {
            TireCompound::Wet
        } else {
            TireCompound::Intermediate
        };
    } else if weather == Weather::Dry && !on_slicks && rng.gen::<f64>() < 0.5 {
        should_pit = true;
        new_compound = TireCompound::Medium;
    }

    if !should_pit {
        match car.tire_compound {
            TireCompound::Soft if car.laps_on_tire > 20 => {
                should_pit = true;
                new_compound = TireCompound::Hard;
            }
            TireCompound::Medium if car.laps_on_tire > 30 => {
                should_pit = true;
                new_compound = TireCompound::Hard;
            }
            TireCompound::Hard if car.laps_on_tire > 40 => {
                should_pit = true;
                new_compound = TireCompound::Medium;
            }
            _ => {}
        }
    }

    // the forced stop only applies to cars on a dry strategy; a car on rain
    // tires satisfies its compound obligations once the track dries
    let window_start = total_laps as f64 * 0.4;
    let window_end = total_laps as f64 * 0.6;
    if !should_pit
        && car.tire_compound.is_slick()
        && !car.used_two_dry_compounds()
        && (current_lap as f64) >= window_start
        && (current_lap as f64) <= window_end
    {
        should_pit = true;
        new_compound = match car.tire_compound {
            TireCompound::Medium => TireCompound::Hard,
            TireCompound::Hard => TireCompound::Medium,
            _ => TireCompound::Hard,
        };
    }

    if should_pit {
        car.status = CarStatus::Pitting;
        car.tire_compound = new_compound;
    }
}

/// Safety-car neutralization: active cars are re-spaced to a fixed gap
/// behind the leader, order preserved.
fn compress_field(state: &mut RaceState, spacing: f64) {
    let active: Vec<usize> = (0..state.cars.len())
        .filter(|&i| !state.cars[i].is_retired())
        .collect();
    let times: Vec<f64> = active
        .iter()
        .map(|&i| state.cars[i].cumulative_time)
        .collect();
    let order = argsort(&times, SortOrder::Ascending);

    let sorted_times: Vec<f64> = order.iter().map(|&k| times[k]).collect();
    let compressed = compress_gaps(&sorted_times, spacing);

    for (rank, &k) in order.iter().enumerate() {
        state.cars[active[k]].cumulative_time = compressed[rank];
    }
}

/// Adjacent-pair overtaking: for every defender/attacker pair in the
/// running order, close the gap by the lap time delta and roll a pass
/// attempt. A successful pass swaps the cumulative times with a small
/// margin for the new leader of the pair.
fn resolve_overtakes<R: Rng>(state: &mut RaceState, rng: &mut R) {
    let lap = state.current_lap;
    let team_map: HashMap<&str, &Team> =
        state.teams.iter().map(|t| (t.id.as_str(), t)).collect();
    let driver_map: HashMap<&str, &Driver> =
        state.drivers.iter().map(|d| (d.id.as_str(), d)).collect();

    let active: Vec<usize> = (0..state.cars.len())
        .filter(|&i| !state.cars[i].is_retired())
        .collect();
    let times: Vec<f64> = active
        .iter()
        .map(|&i| state.cars[i].cumulative_time)
        .collect();
    let order: Vec<usize> = argsort(&times, SortOrder::Ascending)
        .iter()
        .map(|&k| active[k])
        .collect();

    let mut new_events = Vec::new();

    for pair in order.windows(2) {
        let (def_idx, att_idx) = (pair[0], pair[1]);

        let gap = state.cars[att_idx].cumulative_time - state.cars[def_idx].cumulative_time;
        let pace_delta =
            state.cars[def_idx].last_lap_time - state.cars[att_idx].last_lap_time;
        let new_gap = reduce_gap(gap, pace_delta);

        let attacker = &state.cars[att_idx];
        let defender = &state.cars[def_idx];
        let attacker_driver = match driver_map.get(attacker.driver_id.as_str()) {
            Some(d) => *d,
            None => continue,
        };
        let defender_driver = match driver_map.get(defender.driver_id.as_str()) {
            Some(d) => *d,
            None => continue,
        };
        let attacker_speed = team_map
            .get(attacker.team_id.as_str())
            .map(|t| t.top_speed)
            .unwrap_or(0.0);
        let defender_speed = team_map
            .get(defender.team_id.as_str())
            .map(|t| t.top_speed)
            .unwrap_or(0.0);

        let passed = new_gap <= 0.0
            || attempt_overtake(
                &OvertakeParams {
                    gap: new_gap,
                    attacker_aggression: attacker_driver.aggression,
                    speed_diff: attacker_speed - defender_speed,
                    overtaking_difficulty: state.track.overtaking_difficulty,
                },
                rng,
            );

        if passed {
            let defender_time = state.cars[def_idx].cumulative_time;
            state.cars[def_idx].cumulative_time = state.cars[att_idx].cumulative_time;
            state.cars[att_idx].cumulative_time = defender_time - OVERTAKE_SWAP_MARGIN;
            new_events.push(RaceEvent {
                lap,
                kind: EventKind::Overtake,
                driver_id: Some(attacker_driver.id.clone()),
                message: format!(
                    "{} overtakes {}!",
                    attacker_driver.name, defender_driver.name
                ),
            });
        }
    }

    state.events.extend(new_events);
}

/// Active cars ranked 1..N by cumulative time; retired cars get the
/// sentinel rank.
fn update_positions(cars: &mut [CarState]) {
    let active: Vec<usize> = (0..cars.len()).filter(|&i| !cars[i].is_retired()).collect();
    let times: Vec<f64> = active.iter().map(|&i| cars[i].cumulative_time).collect();
    let order = argsort(&times, SortOrder::Ascending);

    for (rank, &k) in order.iter().enumerate() {
        cars[active[k]].position = rank as u32 + 1;
    }
    for car in cars.iter_mut() {
        if car.is_retired() {
            car.position = RETIRED_POSITION;
        }
    }
}
