use clap::Parser;
use helpers::general::{argsort, SortOrder};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use simcore::core::handle_race::handle_race;
use simcore::core::qualifying::{
    simulate_knockout_qualifying, simulate_qualifying, QualifyingMode, QualifyingResult,
};
use simcore::core::race::{create_initial_race_state, GridEntry, RaceState};
use simcore::core::season::{
    get_component_dnf_chance, get_modified_team_stats, summarize_session, SeasonState, SessionType,
};
use simcore::core::team::Team;
use simcore::core::tires::TireCompound;
use simcore::core::track::Track;
use simcore::core::weather::Weather;
use simcore::interfaces::live::LapUpdate;
use simcore::post::race_result::{format_race_time, RaceResult};
use simcore::pre::config::{read_game_config, GameConfig};
use simcore::pre::sim_opts::SimOpts;
use std::thread;
use std::time::Instant;

/// Cut sizes of the two elimination stages in knockout qualifying.
const KNOCKOUT_STAGE_CUTS: [usize; 2] = [5, 5];

/// Sprint grids start split by strategy: the front runners take softs, the
/// rest start on mediums.
const SPRINT_SOFT_CUTOFF: u32 = 10;

fn print_grid(results: &[QualifyingResult], config: &GameConfig) {
    println!("RESULT: Qualifying");
    for entry in results {
        let name = config
            .drivers
            .iter()
            .find(|d| d.id == entry.driver_id)
            .map(|d| d.name.as_str())
            .unwrap_or(entry.driver_id.as_str());
        println!(
            "{:3}. {:24} {:>10} {}",
            entry.position,
            name,
            format_race_time(entry.time),
            if entry.error { "(mistake)" } else { "" }
        );
    }
}

fn print_standings(season: &SeasonState, config: &GameConfig) {
    println!("RESULT: Driver standings");
    let points: Vec<f64> = season.driver_standings.iter().map(|s| s.points as f64).collect();
    for (rank, &idx) in argsort(&points, SortOrder::Descending).iter().enumerate() {
        let standing = &season.driver_standings[idx];
        let name = config
            .drivers
            .iter()
            .find(|d| d.id == standing.driver_id)
            .map(|d| d.name.as_str())
            .unwrap_or(standing.driver_id.as_str());
        println!("{:3}. {:24} {:3} pts", rank + 1, name, standing.points);
    }

    println!("RESULT: Team standings");
    let points: Vec<f64> = season.team_standings.iter().map(|s| s.points as f64).collect();
    for (rank, &idx) in argsort(&points, SortOrder::Descending).iter().enumerate() {
        let standing = &season.team_standings[idx];
        let name = config
            .teams
            .iter()
            .find(|t| t.id == standing.team_id)
            .map(|t| t.name.as_str())
            .unwrap_or(standing.team_id.as_str());
        println!("{:3}. {:24} {:3} pts", rank + 1, name, standing.points);
    }
}

fn export_classification_csv(
    result: &RaceResult,
    path: &std::path::Path,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["position", "driver_id", "team_id", "total_time_s", "laps", "dnf"])?;
    for entry in result.classification.iter() {
        writer.write_record([
            entry.position.to_string(),
            entry.driver_id.clone(),
            entry.team_id.clone(),
            format!("{:.3}", entry.total_time),
            entry.laps_completed.to_string(),
            entry.dnf.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn export_standings_csv(
    season: &SeasonState,
    config: &GameConfig,
    path: &std::path::Path,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["rank", "kind", "id", "name", "points"])?;

    let points: Vec<f64> = season.driver_standings.iter().map(|s| s.points as f64).collect();
    for (rank, &idx) in argsort(&points, SortOrder::Descending).iter().enumerate() {
        let standing = &season.driver_standings[idx];
        let name = config
            .drivers
            .iter()
            .find(|d| d.id == standing.driver_id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| standing.driver_id.clone());
        writer.write_record([
            (rank + 1).to_string(),
            "driver".to_owned(),
            standing.driver_id.clone(),
            name,
            standing.points.to_string(),
        ])?;
    }

    let points: Vec<f64> = season.team_standings.iter().map(|s| s.points as f64).collect();
    for (rank, &idx) in argsort(&points, SortOrder::Descending).iter().enumerate() {
        let standing = &season.team_standings[idx];
        let name = config
            .teams
            .iter()
            .find(|t| t.id == standing.team_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| standing.team_id.clone());
        writer.write_record([
            (rank + 1).to_string(),
            "team".to_owned(),
            standing.team_id.clone(),
            name,
            standing.points.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn print_live_update(update: &LapUpdate) {
    println!(
        "INFO: Lap {}/{} | {}{}",
        update.lap,
        update.total_laps,
        update.weather,
        if update.safety_car { " | SAFETY CAR" } else { "" }
    );
    for event in update.events.iter() {
        println!("INFO:   {}", event);
    }
    for car in update.cars.iter().take(3) {
        if !car.retired {
            println!(
                "INFO:   P{} {} (+{:.1}s, {} {} laps)",
                car.position, car.driver_name, car.gap_to_leader, car.tire_compound, car.laps_on_tire
            );
        }
    }
}

/// Runs one race session (sprint or grand prix) and returns its result.
fn run_session(
    state: RaceState,
    config: &GameConfig,
    sim_opts: &SimOpts,
    rng: &mut StdRng,
) -> anyhow::Result<RaceResult> {
    if sim_opts.live {
        let (tx, rx) = flume::unbounded();
        let consts = config.sim_constants.clone();
        let realtime_factor = sim_opts.realtime_factor;
        let mut thread_rng = StdRng::seed_from_u64(rng.next_u64());

        let handle = thread::spawn(move || {
            handle_race(state, &consts, &mut thread_rng, Some(&tx), realtime_factor, false)
        });

        for update in rx.iter() {
            if update.final_result.is_some() {
                break;
            }
            print_live_update(&update);
        }

        let (_, result) = handle
            .join()
            .map_err(|_| anyhow::anyhow!("Race simulation thread panicked!"))??;
        Ok(result)
    } else {
        let t_start = Instant::now();
        let (_, result) = handle_race(
            state,
            &config.sim_constants,
            rng,
            None,
            1.0,
            sim_opts.debug,
        )?;
        println!("INFO: Execution time: {}ms", t_start.elapsed().as_millis());
        Ok(result)
    }
}

fn settle_session(
    season: &mut SeasonState,
    result: &RaceResult,
    session: SessionType,
    player_team_id: &str,
    config: &GameConfig,
    best_qualifying: Option<u32>,
    engine_wear_mod: f64,
    rng: &mut StdRng,
) {
    let classification = result.to_session_classification();
    let results = summarize_session(
        &classification,
        session,
        player_team_id,
        &config.drivers,
        &season.active_sponsors,
        0.0,
        best_qualifying,
    );
    season.apply_session_results(&results, &classification, &config.drivers);
    season.wear_components(session, engine_wear_mod, rng);

    println!(
        "INFO: Session settlement: prize {} | sponsors {} | RP +{}",
        results.prize_money, results.sponsor_payouts, results.research_points
    );
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    // get season reference data
    let config = if let Some(parfile_path) = &sim_opts.parfile_path {
        println!("INFO: Reading parameters from {:?}", parfile_path);
        read_game_config(parfile_path)?
    } else {
        println!("INFO: No parameter file provided, using built-in season data");
        GameConfig::default()
    };

    let mut rng = match sim_opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let track: Track = match &sim_opts.track {
        Some(id) => config
            .tracks
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown track id {}!", id))?,
        None => config
            .tracks
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No tracks in the parameter file!"))?,
    };

    let player_driver = match &sim_opts.player_driver {
        Some(id) => config
            .drivers
            .iter()
            .find(|d| &d.id == id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown driver id {}!", id))?,
        None => config
            .drivers
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No drivers in the parameter file!"))?,
    };
    let player_mode: QualifyingMode = sim_opts
        .qualifying_mode
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    println!(
        "INFO: Simulating a race weekend at {} ({} laps) as {}",
        track.name, track.total_laps, player_driver.name
    );

    let mut season = SeasonState::new(&config.teams, &config.drivers, &config.sponsor_pool, &mut rng);

    // fold R&D upgrades into the player team's ratings
    let teams: Vec<Team> = config
        .teams
        .iter()
        .map(|t| {
            if t.id == player_driver.team_id {
                let stats = get_modified_team_stats(t, &season.rd_upgrades, &config.rd_tree);
                let mut modified = t.clone();
                modified.top_speed = stats.top_speed;
                modified.cornering = stats.cornering;
                modified
            } else {
                t.clone()
            }
        })
        .collect();
    let engine_wear_mod =
        get_modified_team_stats(
            teams
                .iter()
                .find(|t| t.id == player_driver.team_id)
                .unwrap_or(&teams[0]),
            &season.rd_upgrades,
            &config.rd_tree,
        )
        .engine_wear_mod;

    let weather = Weather::Dry;

    // EXECUTION -----------------------------------------------------------------------------------
    // qualifying decides the grid for every race of the weekend
    let quali_results = if sim_opts.knockout {
        simulate_knockout_qualifying(
            &teams,
            &config.drivers,
            &track,
            weather,
            &player_driver.id,
            player_mode,
            &KNOCKOUT_STAGE_CUTS,
            &config.tires,
            &mut rng,
        )
    } else {
        simulate_qualifying(
            &teams,
            &config.drivers,
            &track,
            weather,
            &player_driver.id,
            player_mode,
            &config.tires,
            &mut rng,
        )
    };
    print_grid(&quali_results, &config);

    let grid: Vec<GridEntry> = quali_results
        .iter()
        .map(|r| GridEntry {
            driver_id: r.driver_id.clone(),
            position: r.position,
        })
        .collect();
    let best_qualifying = quali_results
        .iter()
        .filter(|r| r.team_id == player_driver.team_id)
        .map(|r| r.position)
        .min();

    // sprint race on sprint weekends
    if track.has_sprint && !sim_opts.no_sprint {
        let mut sprint_track = track.clone();
        sprint_track.total_laps = track.sprint_laps();
        println!("INFO: Sprint race over {} laps", sprint_track.total_laps);

        let mut sprint_state = create_initial_race_state(
            &teams,
            &config.drivers,
            &sprint_track,
            &grid,
            weather,
            &player_driver.id,
            get_component_dnf_chance(&season.components),
            config.tires.clone(),
        );
        for car in sprint_state.cars.iter_mut() {
            if car.position <= SPRINT_SOFT_CUTOFF {
                car.tire_compound = TireCompound::Soft;
                car.compounds_used = vec![TireCompound::Soft];
            }
        }

        let sprint_result = run_session(sprint_state, &config, &sim_opts, &mut rng)?;
        sprint_result.print_classification();
        settle_session(
            &mut season,
            &sprint_result,
            SessionType::Sprint,
            &player_driver.team_id,
            &config,
            best_qualifying,
            engine_wear_mod,
            &mut rng,
        );
    }

    // grand prix
    let race_state = create_initial_race_state(
        &teams,
        &config.drivers,
        &track,
        &grid,
        weather,
        &player_driver.id,
        get_component_dnf_chance(&season.components),
        config.tires.clone(),
    );
    let race_result = run_session(race_state, &config, &sim_opts, &mut rng)?;

    // POST-PROCESSING -----------------------------------------------------------------------------
    race_result.print_classification();
    settle_session(
        &mut season,
        &race_result,
        SessionType::Race,
        &player_driver.team_id,
        &config,
        best_qualifying,
        engine_wear_mod,
        &mut rng,
    );
    season.advance_to_next_race(&config.sponsor_pool, &mut rng);

    let out_path = race_result.write_classification_to_file(None)?;
    println!("INFO: Classification written to {}", out_path);
    if let Some(csv_path) = &sim_opts.export_csv {
        export_classification_csv(&race_result, csv_path)?;
        let standings_path = csv_path.with_file_name(format!(
            "{}_standings.csv",
            csv_path.file_stem().and_then(|s| s.to_str()).unwrap_or("season")
        ));
        export_standings_csv(&season, &config, &standings_path)?;
        println!("INFO: CSV exports written to {:?} and {:?}", csv_path, standings_path);
    }

    print_standings(&season, &config);
    println!(
        "INFO: Budget: {} | Research points: {}",
        season.budget, season.research_points
    );

    Ok(())
}
