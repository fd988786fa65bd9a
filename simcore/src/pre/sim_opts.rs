use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "apex-season",
    about = "A lap-discrete racing management simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing (only for non-live mode)
    #[clap(short, long)]
    pub debug: bool,

    /// Stream the race lap by lap in real time instead of simulating instantly
    #[clap(short, long)]
    pub live: bool,

    /// Run knockout qualifying (two elimination stages) instead of a single session
    #[clap(short, long)]
    pub knockout: bool,

    /// Skip the sprint race on sprint weekends
    #[clap(long)]
    pub no_sprint: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the parameter file (OPTIONAL: if not set, uses the built-in season data)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set real-time factor (only relevant in live mode)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set RNG seed for a reproducible weekend
    #[clap(short, long)]
    pub seed: Option<u64>,

    /// Set the player qualifying mode: safe, push or full-send
    #[clap(short, long, default_value = "push")]
    pub qualifying_mode: String,

    /// Set the player driver id (defaults to the first driver in the data)
    #[clap(long)]
    pub player_driver: Option<String>,

    /// Set the track id to race on (defaults to the first track in the calendar)
    #[clap(short, long)]
    pub track: Option<String>,

    /// Write the final classification as CSV to this path
    #[clap(long)]
    pub export_csv: Option<PathBuf>,
}
