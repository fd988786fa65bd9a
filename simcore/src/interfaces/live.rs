use crate::core::race::{CarStatus, RaceState};
use crate::post::race_result::RaceResult;

/// Wall-clock seconds per simulated lap at realtime factor 1.0.
pub const LAP_INTERVAL_S: f64 = 1.0;

/// One car on the live timing tower.
#[derive(Debug, Clone, Default)]
pub struct LiveCar {
    pub position: u32,
    pub driver_name: String,
    pub team_color: String,
    pub gap_to_leader: f64,
    pub tire_compound: String,
    pub laps_on_tire: u32,
    pub in_pit: bool,
    pub retired: bool,
}

/// Per-lap message streamed to a live consumer while a race runs in
/// real time.
#[derive(Debug, Clone, Default)]
pub struct LapUpdate {
    pub lap: u32,
    pub total_laps: u32,
    pub weather: String,
    pub safety_car: bool,
    pub cars: Vec<LiveCar>,
    pub events: Vec<String>,

    // final results payload (sent once when the race finishes)
    pub final_result: Option<RaceResult>,
}

impl LapUpdate {
    pub fn from_state(state: &RaceState) -> LapUpdate {
        let leader_time = state
            .cars
            .iter()
            .filter(|c| c.status != CarStatus::Retired)
            .map(|c| c.cumulative_time)
            .fold(f64::INFINITY, f64::min);

        let mut cars: Vec<LiveCar> = state
            .cars
            .iter()
            .map(|car| {
                let team_color = state
                    .teams
                    .iter()
                    .find(|t| t.id == car.team_id)
                    .map(|t| t.primary_color.clone())
                    .unwrap_or_default();
                let driver_name = state
                    .drivers
                    .iter()
                    .find(|d| d.id == car.driver_id)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| car.driver_id.clone());
                LiveCar {
                    position: car.position,
                    driver_name,
                    team_color,
                    gap_to_leader: if car.status == CarStatus::Retired {
                        0.0
                    } else {
                        car.cumulative_time - leader_time
                    },
                    tire_compound: car.tire_compound.to_string(),
                    laps_on_tire: car.laps_on_tire,
                    in_pit: car.pit_this_lap,
                    retired: car.status == CarStatus::Retired,
                }
            })
            .collect();
        cars.sort_by_key(|c| c.position);

        LapUpdate {
            lap: state.current_lap,
            total_laps: state.total_laps,
            weather: state.weather.to_string(),
            safety_car: state.safety_car,
            cars,
            events: state.events.iter().map(|e| e.message.clone()).collect(),
            final_result: None,
        }
    }
}
