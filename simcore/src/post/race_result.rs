use crate::core::race::{CarStatus, RaceState};
use crate::core::season::SessionClassification;
use std::fmt::Write;
use std::io::Write as IoWrite;

use serde::{Deserialize, Serialize};

/// One row of the final classification.
///
/// * `position` - Finishing position, retired cars are ranked after all
/// finishers in retirement order
/// * `total_time` - (s) Cumulative race time, frozen at retirement for DNFs
/// * `laps_completed` - Laps done before the flag or the retirement
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FinishEntry {
    pub position: u32,
    pub driver_id: String,
    pub driver_name: String,
    pub team_id: String,
    pub total_time: f64,
    pub laps_completed: u32,
    pub dnf: bool,
}

/// RaceResult contains all race information that is required for
/// post-processing the results.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RaceResult {
    pub track_name: String,
    pub total_laps: u32,
    pub classification: Vec<FinishEntry>,
    pub event_log: Vec<String>,
}

impl RaceResult {
    /// from_race_state builds the final classification from the last race
    /// snapshot: finishers ranked by position, then every retired car.
    pub fn from_race_state(state: &RaceState) -> RaceResult {
        let mut finishers: Vec<&crate::core::race::CarState> = state
            .cars
            .iter()
            .filter(|c| c.status != CarStatus::Retired)
            .collect();
        finishers.sort_by_key(|c| c.position);

        let mut classification: Vec<FinishEntry> = Vec::with_capacity(state.cars.len());
        for car in finishers {
            classification.push(make_entry(state, car, classification.len() as u32 + 1, false));
        }
        for car in state.cars.iter().filter(|c| c.status == CarStatus::Retired) {
            classification.push(make_entry(state, car, classification.len() as u32 + 1, true));
        }

        RaceResult {
            track_name: state.track.name.clone(),
            total_laps: state.total_laps,
            classification,
            event_log: state
                .events
                .iter()
                .map(|e| format!("Lap {:3}: {}", e.lap, e.message))
                .collect(),
        }
    }

    /// print_classification prints the final classification to the console
    /// output.
    pub fn print_classification(&self) {
        println!("RESULT: {} ({} laps)", self.track_name, self.total_laps);
        let leader_time = self.classification.first().map(|e| e.total_time);
        for entry in self.classification.iter() {
            let gap = match (leader_time, entry.dnf) {
                (_, true) => "DNF".to_owned(),
                (Some(leader), false) if entry.position == 1 => format_race_time(leader),
                (Some(leader), false) => format!("+{:.3}s", entry.total_time - leader),
                (None, false) => String::new(),
            };
            println!(
                "{:3}. {:24} {:>12}",
                entry.position, entry.driver_name, gap
            );
        }
    }

    /// write_classification_to_file writes the classification and the event
    /// log to a text file in output/. Returns the path to the written file.
    pub fn write_classification_to_file(
        &self,
        path: Option<&std::path::Path>,
    ) -> anyhow::Result<String> {
        let mut content = String::new();
        writeln!(&mut content, "RESULT: {} ({} laps)", self.track_name, self.total_laps)?;
        for entry in self.classification.iter() {
            writeln!(
                &mut content,
                "{:3}, {}, {}, {}, {}",
                entry.position,
                entry.driver_id,
                entry.team_id,
                if entry.dnf {
                    "DNF".to_owned()
                } else {
                    format_race_time(entry.total_time)
                },
                entry.laps_completed,
            )?;
        }
        writeln!(&mut content, "EVENTS:")?;
        for line in self.event_log.iter() {
            writeln!(&mut content, "{}", line)?;
        }

        let out_dir = std::path::Path::new("output");
        std::fs::create_dir_all(out_dir)?;
        let out_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            out_dir.join("last_race.txt")
        };
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&out_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        Ok(out_path.to_string_lossy().into_owned())
    }

    pub fn to_session_classification(&self) -> Vec<SessionClassification> {
        self.classification
            .iter()
            .map(|entry| SessionClassification {
                driver_id: entry.driver_id.clone(),
                position: entry.position,
                dnf: entry.dnf,
            })
            .collect()
    }
}

fn make_entry(
    state: &RaceState,
    car: &crate::core::race::CarState,
    position: u32,
    dnf: bool,
) -> FinishEntry {
    let driver_name = state
        .drivers
        .iter()
        .find(|d| d.id == car.driver_id)
        .map(|d| d.name.clone())
        .unwrap_or_else(|| car.driver_id.clone());
    FinishEntry {
        position,
        driver_id: car.driver_id.clone(),
        driver_name,
        team_id: car.team_id.clone(),
        total_time: car.cumulative_time,
        laps_completed: if dnf {
            car.retired_on_lap
                .unwrap_or(state.current_lap)
                .saturating_sub(1)
        } else {
            state.current_lap
        },
        dnf,
    }
}

/// format_race_time renders seconds as "m:ss.mmm".
pub fn format_race_time(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor() as u64;
    let rest = seconds - minutes as f64 * 60.0;
    format!("{}:{:06.3}", minutes, rest)
}
