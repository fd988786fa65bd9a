use crate::core::driver::Driver;
use crate::core::race::SimConstants;
use crate::core::season::{RdTree, Sponsor};
use crate::core::team::Team;
use crate::core::tires::TireTable;
use crate::core::track::Track;
use crate::pre::defaults;
use anyhow::Context;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

/// GameConfig is used to store all season reference data. Every section may
/// be omitted in the parameter file, in which case the built-in defaults
/// are used.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub teams: Vec<Team>,
    pub drivers: Vec<Driver>,
    pub tracks: Vec<Track>,
    pub tires: TireTable,
    pub rd_tree: RdTree,
    pub sponsor_pool: Vec<Sponsor>,
    pub sim_constants: SimConstants,
}

impl Default for GameConfig {
    fn default() -> GameConfig {
        GameConfig {
            teams: defaults::default_teams(),
            drivers: defaults::default_drivers(),
            tracks: defaults::default_tracks(),
            tires: TireTable::default(),
            rd_tree: defaults::default_rd_tree(),
            sponsor_pool: defaults::default_sponsor_pool(),
            sim_constants: SimConstants::default(),
        }
    }
}

/// read_game_config reads the JSON file and decodes the JSON string into
/// the game configuration struct.
pub fn read_game_config(filepath: &Path) -> anyhow::Result<GameConfig> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let config: GameConfig = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(config)
}
