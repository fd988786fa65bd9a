use serde::{Deserialize, Serialize};

/// Track archetype, used to scale incident risk and the weight of the car's
/// top speed in the lap time model.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TrackType {
    Street,
    HighSpeed,
    Technical,
    Balanced,
}

/// * `id` - Track id, e.g. "velodromo"
/// * `name` - Track name
/// * `country` - Host country
/// * `total_laps` - Race distance in laps
/// * `base_lap_time` - (s) Neutral reference lap time before any performance factors
/// * `overtaking_difficulty` - How hard passing is here (0-100, higher is harder)
/// * `pit_lane_time_loss` - (s) Total time lost for a pit stop (drive through + standstill)
/// * `weather_change_chance` - Per-lap probability of a weather transition
/// * `tire_wear` - Relative tire stress of the circuit (reference data)
/// * `fuel_consumption` - Relative fuel stress of the circuit (reference data)
/// * `track_type` - Archetype, see [TrackType]
/// * `has_sprint` - True if the race weekend includes a sprint race
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub country: String,
    pub total_laps: u32,
    pub base_lap_time: f64,
    pub overtaking_difficulty: f64,
    pub pit_lane_time_loss: f64,
    pub weather_change_chance: f64,
    pub tire_wear: f64,
    pub fuel_consumption: f64,
    #[serde(rename = "type")]
    pub track_type: TrackType,
    pub has_sprint: bool,
}

impl Track {
    /// The sprint format runs roughly a third of the full race distance.
    pub fn sprint_laps(&self) -> u32 {
        ((self.total_laps as f64) / 3.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pre::defaults::default_tracks;

    #[test]
    fn sprint_laps_is_a_third_of_race_distance() {
        let track = default_tracks()
            .into_iter()
            .find(|t| t.total_laps == 53)
            .expect("no 53-lap track in defaults");
        assert_eq!(track.sprint_laps(), 18);
    }
}
