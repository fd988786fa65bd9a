pub mod driver;
pub mod handle_race;
pub mod incidents;
pub mod laptime;
pub mod overtaking;
pub mod qualifying;
pub mod race;
pub mod season;
pub mod team;
pub mod tires;
pub mod track;
pub mod weather;
