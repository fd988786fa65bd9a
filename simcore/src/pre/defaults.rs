//! Built-in season data used when no parameter file is inserted: a ten-team
//! grid with two drivers per team, a short calendar and the default R&D and
//! sponsor tables.

use crate::core::driver::Driver;
use crate::core::season::{
    RdAreaTree, RdEffects, RdNode, RdTree, Sponsor, SponsorObjective,
};
use crate::core::team::Team;
use crate::core::track::{Track, TrackType};

fn team(
    id: &str,
    name: &str,
    engine: &str,
    primary_color: &str,
    top_speed: f64,
    cornering: f64,
    reliability: f64,
) -> Team {
    Team {
        id: id.to_owned(),
        name: name.to_owned(),
        engine: engine.to_owned(),
        primary_color: primary_color.to_owned(),
        top_speed,
        cornering,
        reliability,
    }
}

pub fn default_teams() -> Vec<Team> {
    vec![
        team("crimson", "Crimson Grand Prix", "Crimson", "#d32f2f", 92.0, 88.0, 90.0),
        team("azzurro", "Azzurro Corse", "Azzurro", "#c62828", 90.0, 91.0, 85.0),
        team("silverhawk", "Silverhawk Racing", "Silverhawk", "#9e9e9e", 89.0, 90.0, 92.0),
        team("orange-arrow", "Orange Arrow F1", "Nakata", "#ef6c00", 86.0, 85.0, 88.0),
        team("bleu-royal", "Bleu Royal", "Bleu", "#1565c0", 83.0, 84.0, 86.0),
        team("verdant", "Verdant Motorsport", "Nakata", "#2e7d32", 82.0, 80.0, 84.0),
        team("albion", "Albion Racing", "Silverhawk", "#00695c", 80.0, 82.0, 87.0),
        team("tempesta", "Tempesta F1", "Azzurro", "#6a1b9a", 79.0, 78.0, 80.0),
        team("polaris", "Polaris Team", "Crimson", "#0277bd", 77.0, 76.0, 82.0),
        team("meridian", "Meridian Apex", "Bleu", "#4e342e", 75.0, 74.0, 78.0),
    ]
}

fn driver(
    id: &str,
    name: &str,
    team_id: &str,
    speed: f64,
    aggression: f64,
    tire_management: f64,
    wet_skill: f64,
) -> Driver {
    Driver {
        id: id.to_owned(),
        name: name.to_owned(),
        team_id: team_id.to_owned(),
        speed,
        aggression,
        tire_management,
        wet_skill,
    }
}

pub fn default_drivers() -> Vec<Driver> {
    vec![
        driver("m_soler", "Marco Soler", "crimson", 94.0, 70.0, 85.0, 88.0),
        driver("j_vance", "Jack Vance", "crimson", 90.0, 82.0, 78.0, 80.0),
        driver("l_bernardi", "Luca Bernardi", "azzurro", 93.0, 75.0, 82.0, 86.0),
        driver("a_fontaine", "Antoine Fontaine", "azzurro", 89.0, 68.0, 88.0, 84.0),
        driver("k_larsen", "Kai Larsen", "silverhawk", 92.0, 65.0, 90.0, 91.0),
        driver("t_okada", "Takeshi Okada", "silverhawk", 88.0, 72.0, 84.0, 79.0),
        driver("r_duarte", "Rafael Duarte", "orange-arrow", 87.0, 85.0, 75.0, 77.0),
        driver("s_kowalski", "Stefan Kowalski", "orange-arrow", 85.0, 78.0, 80.0, 82.0),
        driver("e_moreau", "Emile Moreau", "bleu-royal", 84.0, 74.0, 79.0, 85.0),
        driver("d_castillo", "Diego Castillo", "bleu-royal", 83.0, 88.0, 70.0, 73.0),
        driver("o_lindgren", "Oskar Lindgren", "verdant", 82.0, 66.0, 86.0, 83.0),
        driver("h_weber", "Hans Weber", "verdant", 80.0, 71.0, 81.0, 76.0),
        driver("w_hargreaves", "William Hargreaves", "albion", 81.0, 69.0, 83.0, 87.0),
        driver("c_nduka", "Chidi Nduka", "albion", 79.0, 80.0, 74.0, 75.0),
        driver("g_ricci", "Giorgio Ricci", "tempesta", 78.0, 86.0, 68.0, 72.0),
        driver("p_novak", "Petr Novak", "tempesta", 76.0, 73.0, 77.0, 74.0),
        driver("n_eriksson", "Nils Eriksson", "polaris", 77.0, 64.0, 85.0, 81.0),
        driver("y_tanaka", "Yuki Tanaka", "polaris", 75.0, 76.0, 72.0, 78.0),
        driver("b_mckenzie", "Brodie McKenzie", "meridian", 74.0, 79.0, 69.0, 71.0),
        driver("f_almeida", "Fernando Almeida", "meridian", 73.0, 67.0, 80.0, 76.0),
    ]
}

#[allow(clippy::too_many_arguments)]
fn track(
    id: &str,
    name: &str,
    country: &str,
    total_laps: u32,
    base_lap_time: f64,
    overtaking_difficulty: f64,
    pit_lane_time_loss: f64,
    weather_change_chance: f64,
    tire_wear: f64,
    fuel_consumption: f64,
    track_type: TrackType,
    has_sprint: bool,
) -> Track {
    Track {
        id: id.to_owned(),
        name: name.to_owned(),
        country: country.to_owned(),
        total_laps,
        base_lap_time,
        overtaking_difficulty,
        pit_lane_time_loss,
        weather_change_chance,
        tire_wear,
        fuel_consumption,
        track_type,
        has_sprint,
    }
}

pub fn default_tracks() -> Vec<Track> {
    vec![
        track("valverde", "Circuito Valverde", "Spain", 53, 81.5, 55.0, 21.0, 0.04, 1.0, 1.0, TrackType::Balanced, true),
        track("porto-vecchio", "Porto Vecchio Street Circuit", "Italy", 62, 74.0, 85.0, 18.5, 0.03, 0.8, 0.9, TrackType::Street, false),
        track("velodromo", "Velodromo Nazionale", "Italy", 48, 79.0, 35.0, 20.0, 0.05, 1.1, 1.2, TrackType::HighSpeed, true),
        track("lakeside", "Lakeside International", "Canada", 58, 73.5, 50.0, 19.0, 0.08, 1.0, 1.1, TrackType::Balanced, false),
        track("kiefernring", "Kiefernring", "Germany", 56, 77.0, 60.0, 22.0, 0.10, 0.9, 0.95, TrackType::Technical, false),
        track("bahia-dorada", "Bahia Dorada GP", "Mexico", 61, 72.0, 45.0, 20.5, 0.02, 1.2, 1.05, TrackType::HighSpeed, true),
    ]
}

fn node(name: &str, effects: RdEffects, cost_rp: u32, cost_money: i64) -> RdNode {
    RdNode {
        name: name.to_owned(),
        effects,
        cost_rp,
        cost_money,
    }
}

pub fn default_rd_tree() -> RdTree {
    RdTree {
        motor: RdAreaTree {
            base: node(
                "Engine Map Update",
                RdEffects { top_speed: 2.0, ..RdEffects::default() },
                25,
                800_000,
            ),
            branch_a: node(
                "High-Power Mode",
                RdEffects {
                    top_speed: 3.0,
                    fuel_consumption: 0.05,
                    engine_wear: 0.5,
                    ..RdEffects::default()
                },
                40,
                1_500_000,
            ),
            branch_b: node(
                "Efficiency Package",
                RdEffects {
                    top_speed: 1.5,
                    fuel_consumption: -0.03,
                    ..RdEffects::default()
                },
                40,
                1_500_000,
            ),
        },
        aero: RdAreaTree {
            base: node(
                "Revised Front Wing",
                RdEffects { cornering: 2.0, ..RdEffects::default() },
                25,
                800_000,
            ),
            branch_a: node(
                "High-Downforce Kit",
                RdEffects { cornering: 3.0, top_speed: -1.0, ..RdEffects::default() },
                40,
                1_400_000,
            ),
            branch_b: node(
                "Low-Drag Package",
                RdEffects { cornering: 1.0, top_speed: 2.0, ..RdEffects::default() },
                40,
                1_400_000,
            ),
        },
        chassis: RdAreaTree {
            base: node(
                "Suspension Upgrade",
                RdEffects { tire_life: 8.0, ..RdEffects::default() },
                20,
                700_000,
            ),
            branch_a: node(
                "Tire-Friendly Setup",
                RdEffects { tire_life: 15.0, cornering: -1.0, ..RdEffects::default() },
                35,
                1_200_000,
            ),
            branch_b: node(
                "Stiff Chassis",
                RdEffects { tire_life: 5.0, cornering: 1.5, ..RdEffects::default() },
                35,
                1_200_000,
            ),
        },
        pit_crew: RdAreaTree {
            base: node(
                "Crew Training",
                RdEffects { pit_time: -0.3, ..RdEffects::default() },
                15,
                500_000,
            ),
            branch_a: node(
                "Rapid-Stop Drills",
                RdEffects { pit_time: -0.5, pit_error_chance: 30.0, ..RdEffects::default() },
                30,
                900_000,
            ),
            branch_b: node(
                "Consistency Program",
                RdEffects { pit_time: -0.2, pit_error_chance: -50.0, ..RdEffects::default() },
                30,
                900_000,
            ),
        },
    }
}

fn sponsor(id: &str, name: &str, objective: SponsorObjective, payout: i64, duration: u32) -> Sponsor {
    Sponsor {
        id: id.to_owned(),
        name: name.to_owned(),
        objective,
        payout,
        duration,
        races_remaining: 0,
    }
}

pub fn default_sponsor_pool() -> Vec<Sponsor> {
    vec![
        sponsor("aurora-fuels", "Aurora Fuels", SponsorObjective::FinishTop { position: 10 }, 150_000, 4),
        sponsor("vertex-watches", "Vertex Watches", SponsorObjective::FinishTop { position: 5 }, 300_000, 3),
        sponsor("helios-energy", "Helios Energy Drinks", SponsorObjective::Win, 800_000, 3),
        sponsor("stratos-air", "Stratos Airlines", SponsorObjective::BothFinish, 200_000, 5),
        sponsor("quanta-systems", "Quanta Systems", SponsorObjective::QualifyTop { position: 8 }, 180_000, 4),
        sponsor("nordwind-bank", "Nordwind Bank", SponsorObjective::QualifyTop { position: 3 }, 400_000, 2),
        sponsor("rapido-delivery", "Rapido Delivery", SponsorObjective::ScoreSprintPoints, 250_000, 3),
        sponsor("cobalt-telecom", "Cobalt Telecom", SponsorObjective::FinishTop { position: 3 }, 500_000, 2),
        sponsor("terra-tires", "Terra Lubricants", SponsorObjective::BothFinish, 120_000, 6),
        sponsor("zephyr-apparel", "Zephyr Apparel", SponsorObjective::FinishTop { position: 8 }, 170_000, 4),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_driver_belongs_to_a_known_team() {
        let teams = default_teams();
        for d in default_drivers() {
            assert!(
                teams.iter().any(|t| t.id == d.team_id),
                "driver {} has unknown team {}",
                d.id,
                d.team_id
            );
        }
    }

    #[test]
    fn each_team_fields_exactly_two_drivers() {
        let drivers = default_drivers();
        for t in default_teams() {
            let count = drivers.iter().filter(|d| d.team_id == t.id).count();
            assert_eq!(count, 2, "team {}", t.id);
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<String> = default_drivers().into_iter().map(|d| d.id).collect();
        ids.extend(default_teams().into_iter().map(|t| t.id));
        ids.extend(default_tracks().into_iter().map(|t| t.id));
        ids.extend(default_sponsor_pool().into_iter().map(|s| s.id));
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn calendar_has_sprint_weekends() {
        assert!(default_tracks().iter().any(|t| t.has_sprint));
    }
}
