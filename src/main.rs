//! Rustdex - an interactive command-line Pokédex
//!
//! Reads one command per line, fetches data from PokeAPI through an
//! expiring in-memory response cache, and prints colored, formatted text.

use std::io::{self, Write};
use std::time::Duration;

use clap::Parser;
use crossterm::style::Stylize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use rustdex::api::ApiClient;
use rustdex::app::App;
use rustdex::cache::Cache;
use rustdex::cli::Cli;
use rustdex::commands::{Command, ParseError};
use rustdex::save::SaveManager;

fn print_welcome() {
    println!("{}", "Welcome to the Pokedex!\n".dark_green());
    println!("Please note that the Pokedex CLI is using a cache to quickly");
    println!("access data and reduce the load on the PokeAPI servers.\n");
    println!("Use 'help' to find out about Pokemon world exploration commands.\n");
}

fn print_prompt() -> io::Result<()> {
    print!("rustdex > ");
    io::stdout().flush()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let cache = Cache::new(Duration::from_secs(cli.interval));
    let client = match &cli.base_url {
        Some(url) => ApiClient::with_base_url(url, cache),
        None => ApiClient::new(cache),
    };

    let saves = SaveManager::new();
    if saves.is_none() {
        eprintln!("{}", "warning: no data directory found, progress will not be saved".red());
    }

    let mut app = App::new(client, saves);
    if let Err(err) = app.load_progress() {
        eprintln!("{}", format!("warning: could not load saved progress: {}", err).red());
    }

    print_welcome();
    print_prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(Some(command)) => {
                if let Err(err) = app.execute(command).await {
                    eprintln!("{}", err.to_string().red());
                }
            }
            Ok(None) => {}
            Err(err) => {
                eprintln!("{}", err.to_string().red());
                if matches!(err, ParseError::Unknown(_)) {
                    println!("Use 'help' to view the available commands");
                }
            }
        }

        if app.should_quit {
            break;
        }
        print_prompt()?;
    }

    // Reached on `exit` and on end-of-input alike.
    if let Err(err) = app.save_progress() {
        eprintln!("{}", format!("warning: could not save progress: {}", err).red());
    }

    Ok(())
}
