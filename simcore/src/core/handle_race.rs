use crate::core::race::{simulate_lap, RaceState, SimConstants};
use crate::interfaces::live::{LapUpdate, LAP_INTERVAL_S};
use crate::post::race_result::RaceResult;
use anyhow::Context;
use flume::Sender;
use rand::Rng;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// handle_race runs an already initialized race to the flag and returns the
/// final state together with the result for post-processing.
///
/// When a sender is inserted, the race runs in real time: one lap per
/// interval (scaled by `realtime_factor`) with a [LapUpdate] streamed after
/// every lap and a final message carrying the result.
pub fn handle_race<R: Rng>(
    mut state: RaceState,
    sim_consts: &SimConstants,
    rng: &mut R,
    tx: Option<&Sender<LapUpdate>>,
    realtime_factor: f64,
    print_debug: bool,
) -> anyhow::Result<(RaceState, RaceResult)> {
    let mut event_log: Vec<String> = Vec::new();

    // check if sender was inserted -> in that case use real-time simulation
    let sim_realtime = tx.is_some();
    if !sim_realtime {
        while !state.is_finished() {
            state = simulate_lap(&state, sim_consts, rng);
            for event in state.events.iter() {
                event_log.push(format!("Lap {:3}: {}", event.lap, event.message));
                if print_debug {
                    println!("INFO: Lap {:3}: {}", event.lap, event.message);
                }
            }
            if print_debug {
                println!(
                    "INFO: Simulating... Completed lap {} of {}",
                    state.current_lap, state.total_laps
                );
            }
        }
    } else {
        while !state.is_finished() {
            let t_start = Instant::now();
            state = simulate_lap(&state, sim_consts, rng);
            for event in state.events.iter() {
                event_log.push(format!("Lap {:3}: {}", event.lap, event.message));
            }

            tx.unwrap()
                .send(LapUpdate::from_state(&state))
                .context("Failed to send lap update to the live consumer!")?;

            // sleep until the lap interval is over in real-time as well (in ms)
            let t_sleep = (LAP_INTERVAL_S * 1000.0 / realtime_factor) as i64
                - t_start.elapsed().as_millis() as i64;
            if t_sleep > 0 {
                sleep(Duration::from_millis(t_sleep as u64));
            } else {
                println!("WARNING: Could not keep up with real-time!")
            }
        }
    }

    let mut result = RaceResult::from_race_state(&state);
    result.event_log = event_log;

    // after the real-time loop finishes, send the final result once
    if let Some(tx) = tx {
        let mut final_msg = LapUpdate::from_state(&state);
        final_msg.final_result = Some(result.clone());
        tx.send(final_msg)
            .context("Failed to send the final race result to the live consumer!")?;
    }

    Ok((state, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::race::{create_initial_race_state, GridEntry};
    use crate::core::tires::TireTable;
    use crate::core::weather::Weather;
    use crate::pre::defaults::{default_drivers, default_teams, default_tracks};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn race_runs_to_the_flag_without_a_sender() {
        let teams = default_teams();
        let drivers = default_drivers();
        let track = default_tracks().remove(0);
        let grid: Vec<GridEntry> = drivers
            .iter()
            .enumerate()
            .map(|(i, d)| GridEntry {
                driver_id: d.id.clone(),
                position: i as u32 + 1,
            })
            .collect();
        let state = create_initial_race_state(
            &teams,
            &drivers,
            &track,
            &grid,
            Weather::Dry,
            &drivers[0].id,
            0.0,
            TireTable::default(),
        );
        let mut rng = StdRng::seed_from_u64(77);
        let (final_state, result) =
            handle_race(state, &SimConstants::default(), &mut rng, None, 1.0, false)
                .expect("race simulation failed");

        assert!(final_state.is_finished());
        assert_eq!(result.classification.len(), drivers.len());
    }
}
