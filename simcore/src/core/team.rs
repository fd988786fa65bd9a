use serde::{Deserialize, Serialize};

/// * `id` - Team id, e.g. "crimson"
/// * `name` - Team name, e.g. "Crimson Grand Prix"
/// * `engine` - Engine supplier label (presentation only, ignored by the core)
/// * `primary_color` - Hex color string (presentation only, ignored by the core)
/// * `top_speed` - Straight-line performance rating (0-100)
/// * `cornering` - Cornering performance rating (0-100)
/// * `reliability` - Mechanical reliability rating (0-100)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub engine: String,
    pub primary_color: String,
    pub top_speed: f64,
    pub cornering: f64,
    pub reliability: f64,
}
