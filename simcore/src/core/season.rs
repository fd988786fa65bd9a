use crate::core::driver::Driver;
use crate::core::team::Team;
use crate::core::track::TrackType;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const RACE_ENTRY_FEE: i64 = 100_000;
pub const SEASON_STARTING_BUDGET: i64 = 10_000_000;

const RACE_POINTS: [u32; 10] = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1];
const SPRINT_POINTS: [u32; 8] = [8, 7, 6, 5, 4, 3, 2, 1];
const RACE_PRIZE_MONEY: [i64; 10] = [
    500_000, 450_000, 400_000, 350_000, 300_000, 250_000, 200_000, 150_000, 100_000, 50_000,
];
const SPRINT_PRIZE_MONEY: [i64; 8] = [
    100_000, 85_000, 70_000, 60_000, 50_000, 40_000, 25_000, 10_000,
];
const RP_TABLE: [u32; 10] = [15, 12, 10, 8, 7, 6, 5, 4, 3, 2];

/// Sponsor offers visible at any one time.
const SPONSOR_OFFER_COUNT: usize = 4;
/// Sponsor contracts that may run in parallel.
const MAX_ACTIVE_SPONSORS: usize = 3;

// -------------------------------------------------------------------------
// R&D TREE ----------------------------------------------------------------
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RdArea {
    Motor,
    Aero,
    Chassis,
    PitCrew,
}

impl RdArea {
    pub const ALL: [RdArea; 4] = [RdArea::Motor, RdArea::Aero, RdArea::Chassis, RdArea::PitCrew];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RdBranch {
    A,
    B,
}

/// Additive stat deltas granted by one R&D node. Every field defaults to
/// zero so config files only list the effects a node actually has.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RdEffects {
    pub top_speed: f64,
    pub cornering: f64,
    pub tire_life: f64,
    pub pit_time: f64,
    pub fuel_consumption: f64,
    pub engine_wear: f64,
    pub pit_error_chance: f64,
}

/// * `name` - Display name of the upgrade
/// * `effects` - Stat deltas applied once unlocked
/// * `cost_rp` - Research point cost
/// * `cost_money` - Budget cost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdNode {
    pub name: String,
    pub effects: RdEffects,
    pub cost_rp: u32,
    pub cost_money: i64,
}

/// One development area: a base node that must be unlocked first, then a
/// choice between two mutually exclusive branches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdAreaTree {
    pub base: RdNode,
    pub branch_a: RdNode,
    pub branch_b: RdNode,
}

impl RdAreaTree {
    pub fn branch(&self, branch: RdBranch) -> &RdNode {
        match branch {
            RdBranch::A => &self.branch_a,
            RdBranch::B => &self.branch_b,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdTree {
    pub motor: RdAreaTree,
    pub aero: RdAreaTree,
    pub chassis: RdAreaTree,
    pub pit_crew: RdAreaTree,
}

impl RdTree {
    pub fn area(&self, area: RdArea) -> &RdAreaTree {
        match area {
            RdArea::Motor => &self.motor,
            RdArea::Aero => &self.aero,
            RdArea::Chassis => &self.chassis,
            RdArea::PitCrew => &self.pit_crew,
        }
    }
}

/// Unlock state of one area. `branch` stays `None` until a branch has been
/// bought; the base must come first.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RdAreaState {
    pub base: bool,
    pub branch: Option<RdBranch>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RdUpgrades {
    pub motor: RdAreaState,
    pub aero: RdAreaState,
    pub chassis: RdAreaState,
    pub pit_crew: RdAreaState,
}

impl RdUpgrades {
    pub fn area(&self, area: RdArea) -> &RdAreaState {
        match area {
            RdArea::Motor => &self.motor,
            RdArea::Aero => &self.aero,
            RdArea::Chassis => &self.chassis,
            RdArea::PitCrew => &self.pit_crew,
        }
    }

    fn area_mut(&mut self, area: RdArea) -> &mut RdAreaState {
        match area {
            RdArea::Motor => &mut self.motor,
            RdArea::Aero => &mut self.aero,
            RdArea::Chassis => &mut self.chassis,
            RdArea::PitCrew => &mut self.pit_crew,
        }
    }
}

/// Team ratings after folding in every unlocked R&D node. All effects are
/// additive, so the fold order across areas is irrelevant.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifiedTeamStats {
    pub top_speed: f64,
    pub cornering: f64,
    pub tire_life_bonus: f64,
    pub pit_time_bonus: f64,
    pub fuel_consumption_mod: f64,
    pub engine_wear_mod: f64,
    pub pit_error_mod: f64,
}

impl ModifiedTeamStats {
    fn add(&mut self, effects: &RdEffects) {
        self.top_speed += effects.top_speed;
        self.cornering += effects.cornering;
        self.tire_life_bonus += effects.tire_life;
        self.pit_time_bonus += effects.pit_time;
        self.fuel_consumption_mod += effects.fuel_consumption;
        self.engine_wear_mod += effects.engine_wear;
        self.pit_error_mod += effects.pit_error_chance;
    }
}

pub fn get_modified_team_stats(
    team: &Team,
    upgrades: &RdUpgrades,
    tree: &RdTree,
) -> ModifiedTeamStats {
    let mut stats = ModifiedTeamStats {
        top_speed: team.top_speed,
        cornering: team.cornering,
        ..ModifiedTeamStats::default()
    };

    for area in RdArea::ALL {
        let state = upgrades.area(area);
        let area_tree = tree.area(area);
        if state.base {
            stats.add(&area_tree.base.effects);
        }
        if let Some(branch) = state.branch {
            stats.add(&area_tree.branch(branch).effects);
        }
    }

    stats
}

// -------------------------------------------------------------------------
// CAR COMPONENTS ----------------------------------------------------------
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    Engine,
    Gearbox,
    EnergyRecovery,
}

impl ComponentType {
    pub const ALL: [ComponentType; 3] = [
        ComponentType::Engine,
        ComponentType::Gearbox,
        ComponentType::EnergyRecovery,
    ];

    /// Below this health the component starts contributing failure risk.
    fn critical_threshold(self) -> f64 {
        match self {
            ComponentType::Engine => 20.0,
            ComponentType::Gearbox | ComponentType::EnergyRecovery => 15.0,
        }
    }

    pub fn replacement_cost(self) -> i64 {
        match self {
            ComponentType::Engine => 1_500_000,
            ComponentType::Gearbox => 800_000,
            ComponentType::EnergyRecovery => 600_000,
        }
    }

    fn wear_range(self, session: SessionType) -> (f64, f64) {
        match (self, session) {
            (ComponentType::Engine, SessionType::Race) => (3.0, 5.0),
            (ComponentType::Engine, SessionType::Sprint) => (2.0, 3.0),
            (ComponentType::Gearbox, SessionType::Race) => (2.0, 4.0),
            (ComponentType::Gearbox, SessionType::Sprint) => (1.0, 2.0),
            (ComponentType::EnergyRecovery, SessionType::Race) => (2.0, 3.0),
            (ComponentType::EnergyRecovery, SessionType::Sprint) => (1.0, 2.0),
        }
    }
}

/// * `kind` - Which component this is
/// * `health_percent` - 0-100, only replacement raises it
/// * `races_used` - Sessions since the last replacement
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComponentState {
    pub kind: ComponentType,
    pub health_percent: f64,
    pub races_used: u32,
}

impl ComponentState {
    pub fn fresh(kind: ComponentType) -> ComponentState {
        ComponentState {
            kind,
            health_percent: 100.0,
            races_used: 0,
        }
    }
}

pub fn fresh_components() -> Vec<ComponentState> {
    ComponentType::ALL.iter().map(|&k| ComponentState::fresh(k)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    Race,
    Sprint,
}

/// get_component_dnf_chance maps component health to a full-race mechanical
/// failure probability. A dead component is a certain failure; otherwise
/// each component below its critical threshold contributes
/// `0.3*severity + 0.1` and the maximum wins, chances do not stack.
pub fn get_component_dnf_chance(components: &[ComponentState]) -> f64 {
    if components.iter().any(|c| c.health_percent <= 0.0) {
        return 1.0;
    }

    let mut max_chance: f64 = 0.0;
    for c in components {
        let threshold = c.kind.critical_threshold();
        if c.health_percent < threshold {
            let severity = (threshold - c.health_percent) / threshold;
            max_chance = max_chance.max(0.3 * severity + 0.1);
        }
    }
    max_chance
}

/// apply_component_wear returns a worn copy of the component set after one
/// session. Race sessions wear harder than sprints; the engine additionally
/// takes any R&D branch penalty. Health floors at zero.
pub fn apply_component_wear<R: Rng>(
    components: &[ComponentState],
    session: SessionType,
    extra_engine_wear: f64,
    rng: &mut R,
) -> Vec<ComponentState> {
    components
        .iter()
        .map(|c| {
            let (lo, hi) = c.kind.wear_range(session);
            let mut wear = rng.gen_range(lo..hi);
            if c.kind == ComponentType::Engine {
                wear += extra_engine_wear;
            }
            ComponentState {
                kind: c.kind,
                health_percent: (c.health_percent - wear).max(0.0),
                races_used: c.races_used + 1,
            }
        })
        .collect()
}

/// replace_component resets exactly the named component to factory state.
pub fn replace_component(components: &[ComponentState], kind: ComponentType) -> Vec<ComponentState> {
    components
        .iter()
        .map(|c| {
            if c.kind == kind {
                ComponentState::fresh(kind)
            } else {
                *c
            }
        })
        .collect()
}

// -------------------------------------------------------------------------
// POINTS, PRIZES, RESEARCH ------------------------------------------------
// -------------------------------------------------------------------------

// Out-of-range positions (0, retired-sentinel) fall off the end of every
// table and score nothing.

pub fn calculate_race_points(position: u32) -> u32 {
    match position {
        1..=10 => RACE_POINTS[position as usize - 1],
        _ => 0,
    }
}

pub fn calculate_sprint_points(position: u32) -> u32 {
    match position {
        1..=8 => SPRINT_POINTS[position as usize - 1],
        _ => 0,
    }
}

pub fn calculate_race_prize_money(position: u32) -> i64 {
    match position {
        1..=10 => RACE_PRIZE_MONEY[position as usize - 1],
        _ => 0,
    }
}

pub fn calculate_sprint_prize_money(position: u32) -> i64 {
    match position {
        1..=8 => SPRINT_PRIZE_MONEY[position as usize - 1],
        _ => 0,
    }
}

/// calculate_rp awards research points from the race result, plus a flat
/// bonus when practice data collection was completed.
pub fn calculate_rp(race_position: u32, practice_data_percent: f64) -> u32 {
    let base = match race_position {
        1..=10 => RP_TABLE[race_position as usize - 1],
        _ => 1,
    };
    let bonus = if practice_data_percent >= 100.0 { 5 } else { 0 };
    base + bonus
}

// -------------------------------------------------------------------------
// SPONSORS ----------------------------------------------------------------
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SponsorObjective {
    FinishTop { position: u32 },
    BothFinish,
    Win,
    QualifyTop { position: u32 },
    ScoreSprintPoints,
}

/// * `id` - Unique sponsor id within the pool
/// * `objective` - Per-weekend condition for the payout
/// * `payout` - Money paid every weekend the objective is met
/// * `duration` - Contract length in race weekends
/// * `races_remaining` - Weekends left on a signed contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: String,
    pub name: String,
    pub objective: SponsorObjective,
    pub payout: i64,
    pub duration: u32,
    #[serde(default)]
    pub races_remaining: u32,
}

/// What the player team achieved over one race weekend, as seen by sponsor
/// contracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SponsorOutcome {
    pub best_finish: Option<u32>,
    pub both_finished: bool,
    pub won: bool,
    pub best_qualifying: Option<u32>,
    pub scored_sprint_points: bool,
}

/// check_sponsor_objective evaluates one contract against the weekend
/// outcome. Missing outcome data never satisfies a positional objective.
pub fn check_sponsor_objective(sponsor: &Sponsor, outcome: &SponsorOutcome) -> bool {
    match sponsor.objective {
        SponsorObjective::FinishTop { position } => {
            outcome.best_finish.map_or(false, |best| best <= position)
        }
        SponsorObjective::BothFinish => outcome.both_finished,
        SponsorObjective::Win => outcome.won,
        SponsorObjective::QualifyTop { position } => {
            outcome.best_qualifying.map_or(false, |best| best <= position)
        }
        SponsorObjective::ScoreSprintPoints => outcome.scored_sprint_points,
    }
}

fn pick_random_sponsors<R: Rng>(
    pool: &[Sponsor],
    exclude_ids: &[String],
    count: usize,
    rng: &mut R,
) -> Vec<Sponsor> {
    let mut available: Vec<Sponsor> = pool
        .iter()
        .filter(|s| !exclude_ids.contains(&s.id))
        .cloned()
        .collect();
    available.shuffle(rng);
    available.truncate(count);
    for sponsor in available.iter_mut() {
        sponsor.races_remaining = sponsor.duration;
    }
    available
}

// -------------------------------------------------------------------------
// TRACK ARCHETYPES --------------------------------------------------------
// -------------------------------------------------------------------------

/// * `incident_multiplier` - Scales the per-lap incident chance
/// * `top_speed_weight` - Scales the top speed rating in the lap time model
/// * `cornering_weight` - Scales the cornering rating
#[derive(Debug, Clone, Copy)]
pub struct TrackTypeModifiers {
    pub incident_multiplier: f64,
    pub top_speed_weight: f64,
    pub cornering_weight: f64,
}

pub fn get_track_type_modifiers(track_type: TrackType) -> TrackTypeModifiers {
    match track_type {
        TrackType::Street => TrackTypeModifiers {
            incident_multiplier: 1.5,
            top_speed_weight: 0.8,
            cornering_weight: 1.2,
        },
        TrackType::HighSpeed => TrackTypeModifiers {
            incident_multiplier: 0.9,
            top_speed_weight: 1.3,
            cornering_weight: 0.8,
        },
        TrackType::Technical => TrackTypeModifiers {
            incident_multiplier: 1.1,
            top_speed_weight: 0.8,
            cornering_weight: 1.3,
        },
        TrackType::Balanced => TrackTypeModifiers {
            incident_multiplier: 1.0,
            top_speed_weight: 1.0,
            cornering_weight: 1.0,
        },
    }
}

// -------------------------------------------------------------------------
// STANDINGS ---------------------------------------------------------------
// -------------------------------------------------------------------------

/// * `positions` - Finishing position history across the season, append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverStanding {
    pub driver_id: String,
    pub points: u32,
    pub positions: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_id: String,
    pub points: u32,
}

// -------------------------------------------------------------------------
// SEASON STATE ------------------------------------------------------------
// -------------------------------------------------------------------------

/// One driver's outcome of a session, as fed into the season settlement.
#[derive(Debug, Clone)]
pub struct SessionClassification {
    pub driver_id: String,
    pub position: u32,
    pub dnf: bool,
}

/// Financial and sporting settlement of one session for the player team,
/// computed by [summarize_session] and applied via
/// [SeasonState::apply_session_results].
#[derive(Debug, Clone)]
pub struct SessionResults {
    pub session: SessionType,
    pub prize_money: i64,
    pub sponsor_payouts: i64,
    pub research_points: u32,
    pub points_per_driver: Vec<(String, u32)>,
    pub met_sponsor_ids: Vec<String>,
}

/// summarize_session turns a finishing classification into the player
/// team's settlement: prize money for the team's best finisher, points for
/// every scorer, research points from the race, and sponsor payouts for
/// objectives met this weekend. Sprint sessions pay the sprint tables and
/// award no research points.
pub fn summarize_session(
    classification: &[SessionClassification],
    session: SessionType,
    player_team_id: &str,
    drivers: &[Driver],
    active_sponsors: &[Sponsor],
    practice_data_percent: f64,
    best_qualifying: Option<u32>,
) -> SessionResults {
    let points_per_driver: Vec<(String, u32)> = classification
        .iter()
        .map(|entry| {
            let points = match session {
                SessionType::Race => calculate_race_points(entry.position),
                SessionType::Sprint => calculate_sprint_points(entry.position),
            };
            (entry.driver_id.clone(), points)
        })
        .collect();

    let player_entries: Vec<&SessionClassification> = classification
        .iter()
        .filter(|entry| {
            drivers
                .iter()
                .any(|d| d.id == entry.driver_id && d.team_id == player_team_id)
        })
        .collect();

    let best_finish = player_entries
        .iter()
        .filter(|e| !e.dnf)
        .map(|e| e.position)
        .min();
    let both_finished = !player_entries.is_empty() && player_entries.iter().all(|e| !e.dnf);
    let scored_sprint_points = session == SessionType::Sprint
        && player_entries
            .iter()
            .any(|e| !e.dnf && calculate_sprint_points(e.position) > 0);

    let outcome = SponsorOutcome {
        best_finish,
        both_finished,
        won: best_finish == Some(1),
        best_qualifying,
        scored_sprint_points,
    };

    let prize_money = best_finish.map_or(0, |position| match session {
        SessionType::Race => calculate_race_prize_money(position),
        SessionType::Sprint => calculate_sprint_prize_money(position),
    });

    let research_points = match session {
        SessionType::Race => {
            best_finish.map_or(1, |position| calculate_rp(position, practice_data_percent))
        }
        SessionType::Sprint => 0,
    };

    let mut sponsor_payouts = 0;
    let mut met_sponsor_ids = Vec::new();
    for sponsor in active_sponsors {
        if check_sponsor_objective(sponsor, &outcome) {
            sponsor_payouts += sponsor.payout;
            met_sponsor_ids.push(sponsor.id.clone());
        }
    }

    SessionResults {
        session,
        prize_money,
        sponsor_payouts,
        research_points,
        points_per_driver,
        met_sponsor_ids,
    }
}

/// Cross-race progression of the player team plus the championship
/// standings. Validation failures (insufficient budget, already unlocked,
/// base missing) surface as `false` returns and leave everything untouched.
#[derive(Debug, Clone)]
pub struct SeasonState {
    pub budget: i64,
    pub research_points: u32,
    pub rd_upgrades: RdUpgrades,
    pub components: Vec<ComponentState>,
    pub active_sponsors: Vec<Sponsor>,
    pub available_sponsors: Vec<Sponsor>,
    pub driver_standings: Vec<DriverStanding>,
    pub team_standings: Vec<TeamStanding>,
    pub current_race_index: usize,
}

impl SeasonState {
    pub fn new<R: Rng>(
        teams: &[Team],
        drivers: &[Driver],
        sponsor_pool: &[Sponsor],
        rng: &mut R,
    ) -> SeasonState {
        SeasonState {
            budget: SEASON_STARTING_BUDGET,
            research_points: 0,
            rd_upgrades: RdUpgrades::default(),
            components: fresh_components(),
            active_sponsors: Vec::new(),
            available_sponsors: pick_random_sponsors(sponsor_pool, &[], SPONSOR_OFFER_COUNT, rng),
            driver_standings: drivers
                .iter()
                .map(|d| DriverStanding {
                    driver_id: d.id.clone(),
                    points: 0,
                    positions: Vec::new(),
                })
                .collect(),
            team_standings: teams
                .iter()
                .map(|t| TeamStanding {
                    team_id: t.id.clone(),
                    points: 0,
                })
                .collect(),
            current_race_index: 0,
        }
    }

    pub fn purchase_base_upgrade(&mut self, area: RdArea, tree: &RdTree) -> bool {
        if self.rd_upgrades.area(area).base {
            return false;
        }
        let node = &tree.area(area).base;
        if self.budget < node.cost_money || self.research_points < node.cost_rp {
            return false;
        }
        self.budget -= node.cost_money;
        self.research_points -= node.cost_rp;
        self.rd_upgrades.area_mut(area).base = true;
        true
    }

    pub fn purchase_branch_upgrade(&mut self, area: RdArea, branch: RdBranch, tree: &RdTree) -> bool {
        let state = *self.rd_upgrades.area(area);
        if !state.base || state.branch.is_some() {
            return false;
        }
        let node = tree.area(area).branch(branch);
        if self.budget < node.cost_money || self.research_points < node.cost_rp {
            return false;
        }
        self.budget -= node.cost_money;
        self.research_points -= node.cost_rp;
        self.rd_upgrades.area_mut(area).branch = Some(branch);
        true
    }

    pub fn replace_component(&mut self, kind: ComponentType) -> bool {
        let cost = kind.replacement_cost();
        if self.budget < cost {
            return false;
        }
        self.budget -= cost;
        self.components = replace_component(&self.components, kind);
        true
    }

    pub fn wear_components<R: Rng>(&mut self, session: SessionType, extra_engine_wear: f64, rng: &mut R) {
        self.components = apply_component_wear(&self.components, session, extra_engine_wear, rng);
    }

    pub fn sign_sponsor(&mut self, sponsor_id: &str) -> bool {
        if self.active_sponsors.len() >= MAX_ACTIVE_SPONSORS {
            return false;
        }
        let idx = match self.available_sponsors.iter().position(|s| s.id == sponsor_id) {
            Some(idx) => idx,
            None => return false,
        };
        let sponsor = self.available_sponsors.remove(idx);
        self.active_sponsors.push(sponsor);
        true
    }

    pub fn drop_sponsor(&mut self, sponsor_id: &str) {
        self.active_sponsors.retain(|s| s.id != sponsor_id);
    }

    pub fn refresh_available_sponsors<R: Rng>(&mut self, pool: &[Sponsor], rng: &mut R) {
        let exclude: Vec<String> = self.active_sponsors.iter().map(|s| s.id.clone()).collect();
        self.available_sponsors = pick_random_sponsors(pool, &exclude, SPONSOR_OFFER_COUNT, rng);
    }

    /// Weekend rollover: contracts tick down and expire, a new slate of
    /// offers is drawn.
    pub fn advance_to_next_race<R: Rng>(&mut self, pool: &[Sponsor], rng: &mut R) {
        for sponsor in self.active_sponsors.iter_mut() {
            sponsor.races_remaining = sponsor.races_remaining.saturating_sub(1);
        }
        self.active_sponsors.retain(|s| s.races_remaining > 0);
        self.refresh_available_sponsors(pool, rng);
        self.current_race_index += 1;
    }

    /// Books a settlement into the budget, research points and both
    /// championship tables. The entry fee is charged on race sessions only,
    /// once per weekend.
    pub fn apply_session_results(
        &mut self,
        results: &SessionResults,
        classification: &[SessionClassification],
        drivers: &[Driver],
    ) {
        self.budget += results.prize_money + results.sponsor_payouts;
        if results.session == SessionType::Race {
            self.budget -= RACE_ENTRY_FEE;
        }
        self.research_points += results.research_points;

        for standing in self.driver_standings.iter_mut() {
            if let Some((_, points)) = results
                .points_per_driver
                .iter()
                .find(|(id, _)| *id == standing.driver_id)
            {
                standing.points += points;
            }
            if let Some(entry) = classification
                .iter()
                .find(|e| e.driver_id == standing.driver_id)
            {
                standing.positions.push(entry.position);
            }
        }

        for standing in self.team_standings.iter_mut() {
            let team_points: u32 = results
                .points_per_driver
                .iter()
                .filter(|(id, _)| {
                    drivers
                        .iter()
                        .any(|d| d.id == *id && d.team_id == standing.team_id)
                })
                .map(|(_, points)| points)
                .sum();
            standing.points += team_points;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pre::defaults::{default_drivers, default_rd_tree, default_sponsor_pool, default_teams};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn race_points_follow_the_table() {
        assert_eq!(calculate_race_points(1), 25);
        assert_eq!(calculate_race_points(2), 18);
        assert_eq!(calculate_race_points(10), 1);
        assert_eq!(calculate_race_points(11), 0);
        assert_eq!(calculate_race_points(0), 0);
        assert_eq!(calculate_race_points(99), 0);
    }

    #[test]
    fn sprint_tables_stop_at_eighth() {
        assert_eq!(calculate_sprint_points(1), 8);
        assert_eq!(calculate_sprint_points(8), 1);
        assert_eq!(calculate_sprint_points(9), 0);
        assert_eq!(calculate_sprint_prize_money(1), 100_000);
        assert_eq!(calculate_sprint_prize_money(8), 10_000);
        assert_eq!(calculate_sprint_prize_money(9), 0);
    }

    #[test]
    fn rp_rewards_practice_completion() {
        assert_eq!(calculate_rp(1, 0.0), 15);
        assert_eq!(calculate_rp(10, 0.0), 2);
        assert_eq!(calculate_rp(15, 0.0), 1);
        assert_eq!(calculate_rp(1, 100.0), 20);
        assert_eq!(calculate_rp(15, 100.0), 6);
    }

    #[test]
    fn healthy_components_carry_no_risk() {
        assert_abs_diff_eq!(get_component_dnf_chance(&fresh_components()), 0.0);
    }

    #[test]
    fn worn_engine_risk_scales_with_severity() {
        let mut components = fresh_components();
        components[0].health_percent = 10.0;
        // engine threshold 20: severity 0.5, chance 0.3*0.5 + 0.1
        assert_abs_diff_eq!(get_component_dnf_chance(&components), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn dead_component_means_certain_failure() {
        let mut components = fresh_components();
        components[2].health_percent = 0.0;
        assert_abs_diff_eq!(get_component_dnf_chance(&components), 1.0);
    }

    #[test]
    fn wear_floors_at_zero_and_counts_sessions() {
        let mut components = fresh_components();
        components[0].health_percent = 1.0;
        let mut rng = StdRng::seed_from_u64(31);
        let worn = apply_component_wear(&components, SessionType::Race, 0.0, &mut rng);
        for (before, after) in components.iter().zip(worn.iter()) {
            assert!(after.health_percent >= 0.0);
            assert!(after.health_percent < before.health_percent);
            assert_eq!(after.races_used, before.races_used + 1);
        }
        assert_abs_diff_eq!(worn[0].health_percent, 0.0);
    }

    #[test]
    fn sprints_wear_less_than_races() {
        let components = fresh_components();
        let mut rng = StdRng::seed_from_u64(37);
        for _ in 0..50 {
            let sprint = apply_component_wear(&components, SessionType::Sprint, 0.0, &mut rng);
            // engine sprint wear tops out below the race minimum
            assert!(100.0 - sprint[0].health_percent < 3.0);
        }
    }

    #[test]
    fn replacement_resets_only_the_named_component() {
        let mut components = fresh_components();
        for c in components.iter_mut() {
            c.health_percent = 40.0;
            c.races_used = 6;
        }
        let replaced = replace_component(&components, ComponentType::Gearbox);
        for c in replaced.iter() {
            if c.kind == ComponentType::Gearbox {
                assert_abs_diff_eq!(c.health_percent, 100.0);
                assert_eq!(c.races_used, 0);
            } else {
                assert_abs_diff_eq!(c.health_percent, 40.0);
                assert_eq!(c.races_used, 6);
            }
        }
    }

    #[test]
    fn modified_stats_fold_all_unlocked_nodes() {
        let tree = default_rd_tree();
        let team = Team {
            id: "t".to_owned(),
            name: "Test".to_owned(),
            engine: "Test".to_owned(),
            primary_color: "#fff".to_owned(),
            top_speed: 80.0,
            cornering: 75.0,
            reliability: 90.0,
        };
        let upgrades = RdUpgrades {
            motor: RdAreaState { base: true, branch: Some(RdBranch::A) },
            aero: RdAreaState { base: true, branch: Some(RdBranch::B) },
            chassis: RdAreaState { base: true, branch: Some(RdBranch::A) },
            pit_crew: RdAreaState { base: true, branch: Some(RdBranch::B) },
        };
        let stats = get_modified_team_stats(&team, &upgrades, &tree);
        assert_abs_diff_eq!(stats.top_speed, 87.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.cornering, 77.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.tire_life_bonus, 23.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.pit_time_bonus, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.fuel_consumption_mod, 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.engine_wear_mod, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.pit_error_mod, -50.0, epsilon = 1e-12);
    }

    #[test]
    fn no_upgrades_means_stock_stats() {
        let tree = default_rd_tree();
        let teams = default_teams();
        let stats = get_modified_team_stats(&teams[0], &RdUpgrades::default(), &tree);
        assert_abs_diff_eq!(stats.top_speed, teams[0].top_speed);
        assert_abs_diff_eq!(stats.cornering, teams[0].cornering);
        assert_abs_diff_eq!(stats.tire_life_bonus, 0.0);
    }

    #[test]
    fn branch_requires_the_base_first() {
        let tree = default_rd_tree();
        let teams = default_teams();
        let drivers = default_drivers();
        let pool = default_sponsor_pool();
        let mut rng = StdRng::seed_from_u64(41);
        let mut season = SeasonState::new(&teams, &drivers, &pool, &mut rng);
        season.research_points = 1000;

        assert!(!season.purchase_branch_upgrade(RdArea::Motor, RdBranch::A, &tree));
        assert!(season.purchase_base_upgrade(RdArea::Motor, &tree));
        assert!(!season.purchase_base_upgrade(RdArea::Motor, &tree));
        assert!(season.purchase_branch_upgrade(RdArea::Motor, RdBranch::A, &tree));
        // branch choice is exclusive
        assert!(!season.purchase_branch_upgrade(RdArea::Motor, RdBranch::B, &tree));
    }

    #[test]
    fn purchases_fail_without_funds_and_leave_state_untouched() {
        let tree = default_rd_tree();
        let teams = default_teams();
        let drivers = default_drivers();
        let pool = default_sponsor_pool();
        let mut rng = StdRng::seed_from_u64(43);
        let mut season = SeasonState::new(&teams, &drivers, &pool, &mut rng);
        season.budget = 0;
        season.research_points = 1000;

        assert!(!season.purchase_base_upgrade(RdArea::Aero, &tree));
        assert!(!season.rd_upgrades.aero.base);
        assert_eq!(season.research_points, 1000);

        assert!(!season.replace_component(ComponentType::Engine));
        assert_eq!(season.budget, 0);
    }

    #[test]
    fn component_replacement_charges_the_budget() {
        let teams = default_teams();
        let drivers = default_drivers();
        let pool = default_sponsor_pool();
        let mut rng = StdRng::seed_from_u64(47);
        let mut season = SeasonState::new(&teams, &drivers, &pool, &mut rng);
        season.components[0].health_percent = 5.0;

        let before = season.budget;
        assert!(season.replace_component(ComponentType::Engine));
        assert_eq!(season.budget, before - 1_500_000);
        assert_abs_diff_eq!(season.components[0].health_percent, 100.0);
    }

    #[test]
    fn sponsor_slots_are_capped_at_three() {
        let teams = default_teams();
        let drivers = default_drivers();
        let pool = default_sponsor_pool();
        let mut rng = StdRng::seed_from_u64(53);
        let mut season = SeasonState::new(&teams, &drivers, &pool, &mut rng);

        assert_eq!(season.available_sponsors.len(), 4);
        let ids: Vec<String> = season.available_sponsors.iter().map(|s| s.id.clone()).collect();
        assert!(season.sign_sponsor(&ids[0]));
        assert!(season.sign_sponsor(&ids[1]));
        assert!(season.sign_sponsor(&ids[2]));
        assert!(!season.sign_sponsor(&ids[3]));
        assert!(!season.sign_sponsor("no-such-sponsor"));
        assert_eq!(season.active_sponsors.len(), 3);
    }

    #[test]
    fn contracts_expire_on_rollover() {
        let teams = default_teams();
        let drivers = default_drivers();
        let pool = default_sponsor_pool();
        let mut rng = StdRng::seed_from_u64(59);
        let mut season = SeasonState::new(&teams, &drivers, &pool, &mut rng);

        let id = season.available_sponsors[0].id.clone();
        assert!(season.sign_sponsor(&id));
        season.active_sponsors[0].races_remaining = 1;
        season.advance_to_next_race(&pool, &mut rng);
        assert!(season.active_sponsors.is_empty());
        assert_eq!(season.current_race_index, 1);
        // expired contracts may be offered again
        assert_eq!(season.available_sponsors.len(), 4);
    }

    #[test]
    fn finish_top_objective_checks_the_best_finish() {
        let sponsor = Sponsor {
            id: "s".to_owned(),
            name: "Test".to_owned(),
            objective: SponsorObjective::FinishTop { position: 5 },
            payout: 100_000,
            duration: 3,
            races_remaining: 3,
        };
        let mut outcome = SponsorOutcome::default();
        assert!(!check_sponsor_objective(&sponsor, &outcome));
        outcome.best_finish = Some(6);
        assert!(!check_sponsor_objective(&sponsor, &outcome));
        outcome.best_finish = Some(5);
        assert!(check_sponsor_objective(&sponsor, &outcome));
    }

    #[test]
    fn settlement_books_points_money_and_rp() {
        let teams = default_teams();
        let drivers = default_drivers();
        let pool = default_sponsor_pool();
        let mut rng = StdRng::seed_from_u64(61);
        let mut season = SeasonState::new(&teams, &drivers, &pool, &mut rng);

        let player_team_id = drivers[0].team_id.clone();
        let classification: Vec<SessionClassification> = drivers
            .iter()
            .enumerate()
            .map(|(i, d)| SessionClassification {
                driver_id: d.id.clone(),
                position: i as u32 + 1,
                dnf: false,
            })
            .collect();

        let results = summarize_session(
            &classification,
            SessionType::Race,
            &player_team_id,
            &drivers,
            &[],
            100.0,
            Some(1),
        );
        assert_eq!(results.prize_money, 500_000);
        assert_eq!(results.research_points, 20);

        let budget_before = season.budget;
        season.apply_session_results(&results, &classification, &drivers);
        assert_eq!(season.budget, budget_before + 500_000 - RACE_ENTRY_FEE);
        assert_eq!(season.research_points, 20);

        let winner = season
            .driver_standings
            .iter()
            .find(|s| s.driver_id == drivers[0].id)
            .unwrap();
        assert_eq!(winner.points, 25);
        assert_eq!(winner.positions, vec![1]);

        let team = season
            .team_standings
            .iter()
            .find(|s| s.team_id == player_team_id)
            .unwrap();
        // both team cars score: P1 and whichever slot the teammate holds
        assert!(team.points >= 25);
    }

    #[test]
    fn track_archetypes_match_the_table() {
        let street = get_track_type_modifiers(TrackType::Street);
        assert_abs_diff_eq!(street.incident_multiplier, 1.5);
        assert_abs_diff_eq!(street.top_speed_weight, 0.8);
        let balanced = get_track_type_modifiers(TrackType::Balanced);
        assert_abs_diff_eq!(balanced.incident_multiplier, 1.0);
        assert_abs_diff_eq!(balanced.cornering_weight, 1.0);
    }
}
