//! Command-line interface parsing for the Pokédex REPL
//!
//! Startup flags only; interactive commands are parsed by the `commands`
//! module once the session is running.

use clap::Parser;

/// Default cache expiry interval, one hour
const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// Interactive Pokédex for exploring the PokeAPI catalog
#[derive(Parser, Debug)]
#[command(name = "rustdex")]
#[command(about = "Explore locations, catch and inspect Pokemon, and run toy battles")]
#[command(version)]
pub struct Cli {
    /// Cache expiry interval in seconds
    ///
    /// API responses older than this are swept from the in-memory cache;
    /// the sweep itself runs once per interval.
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: u64,

    /// Override the PokeAPI base URL (used by tests)
    #[arg(long, value_name = "URL", hide = true)]
    pub base_url: Option<String>,
}
