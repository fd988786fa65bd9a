use serde::{Deserialize, Serialize};

/// * `id` - Driver id, e.g. "m_soler"
/// * `name` - Driver name, e.g. "Marco Soler"
/// * `team_id` - Id of the team the driver belongs to for the whole season
/// * `speed` - Raw pace rating (0-100)
/// * `aggression` - Risk appetite rating (0-100), raises incident and overtake chances
/// * `tire_management` - Tire conservation rating (0-100), lowers degradation
/// * `wet_skill` - Rain driving rating (0-100)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub team_id: String,
    pub speed: f64,
    pub aggression: f64,
    pub tire_management: f64,
    pub wet_skill: f64,
}
