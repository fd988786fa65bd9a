pub mod config;
pub mod defaults;
pub mod sim_opts;
