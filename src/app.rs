//! Application state and command execution
//!
//! `App` owns everything the REPL needs between commands: the caching API
//! client, the set of caught Pokémon, and the pagination cursor for the
//! location listing. Command handlers print their own output; errors are
//! returned to the loop, printed, and never terminate the session.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use chrono::Utc;
use crossterm::cursor::MoveTo;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use thiserror::Error;
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::battle::{self, BattleEvent, Battler};
use crate::commands::{Command, USAGE};
use crate::data::CaughtPokemon;
use crate::draw::{self, DrawError};
use crate::save::{SaveError, SaveManager};

/// Pause between battle blows so the fight reads like a play-by-play
const BATTLE_TURN_DELAY: Duration = Duration::from_millis(800);

/// Errors surfaced by command handlers
#[derive(Debug, Error)]
pub enum CommandError {
    /// Walked past either end of the location listing
    #[error("no more locations")]
    NoMoreLocations,

    /// PokeAPI request failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Save file access failed
    #[error(transparent)]
    Save(#[from] SaveError),

    /// Sprite rendering failed
    #[error(transparent)]
    Draw(#[from] DrawError),

    /// Terminal manipulation failed
    #[error("failed to clear the screen: {0}")]
    Terminal(#[from] io::Error),
}

/// Which way to walk the paginated location listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Next,
    Previous,
}

/// Interactive session state
pub struct App {
    client: ApiClient,
    /// Caught Pokémon keyed by name
    caught: HashMap<String, CaughtPokemon>,
    /// Save file access, absent when no data directory exists
    saves: Option<SaveManager>,
    /// `next` link from the last listing page
    next_page: Option<String>,
    /// `previous` link from the last listing page
    previous_page: Option<String>,
    /// Whether the listing has been requested at least once
    visited_listing: bool,
    turn_delay: Duration,
    pub should_quit: bool,
}

impl App {
    pub fn new(client: ApiClient, saves: Option<SaveManager>) -> Self {
        Self {
            client,
            caught: HashMap::new(),
            saves,
            next_page: None,
            previous_page: None,
            visited_listing: false,
            turn_delay: BATTLE_TURN_DELAY,
            should_quit: false,
        }
    }

    /// Loads previously caught Pokémon from the save file
    pub fn load_progress(&mut self) -> Result<(), SaveError> {
        if let Some(saves) = &self.saves {
            self.caught = saves.load()?;
            debug!(count = self.caught.len(), "loaded caught Pokemon");
        }
        Ok(())
    }

    /// Writes the caught set to the save file
    pub fn save_progress(&self) -> Result<(), SaveError> {
        if let Some(saves) = &self.saves {
            saves.save(&self.caught)?;
        }
        Ok(())
    }

    /// Runs a single parsed command
    pub async fn execute(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::Help => {
                println!("{}", USAGE.yellow());
                Ok(())
            }
            Command::Exit => {
                self.should_quit = true;
                Ok(())
            }
            Command::Clear => self.clear_screen(),
            Command::Map => self.map(Direction::Next).await,
            Command::MapBack => self.map(Direction::Previous).await,
            Command::Explore { area } => self.explore(&area).await,
            Command::Catch { name } => self.catch(&name).await,
            Command::Inspect { name } => self.inspect(&name).await,
            Command::Pokedex => {
                self.pokedex();
                Ok(())
            }
            Command::Battle { first, second } => self.battle(&first, &second).await,
        }
    }

    fn clear_screen(&self) -> Result<(), CommandError> {
        crossterm::execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    /// Walks the paginated location listing one page at a time
    async fn map(&mut self, direction: Direction) -> Result<(), CommandError> {
        let page_url = match direction {
            // The very first `map` starts at the front of the listing.
            Direction::Next if !self.visited_listing => None,
            Direction::Next => Some(
                self.next_page
                    .clone()
                    .ok_or(CommandError::NoMoreLocations)?,
            ),
            Direction::Previous => Some(
                self.previous_page
                    .clone()
                    .ok_or(CommandError::NoMoreLocations)?,
            ),
        };

        let page = self.client.location_areas(page_url.as_deref()).await?;
        self.visited_listing = true;
        self.next_page = page.next.clone();
        self.previous_page = page.previous.clone();

        for area in &page.results {
            println!(" - {}", area.name);
        }
        Ok(())
    }

    async fn explore(&self, name: &str) -> Result<(), CommandError> {
        let area = self.client.location_area(name).await?;

        println!("{}", format!("Exploring {}...", name).dark_blue());
        println!("{}", "Found Pokemon:".dark_blue());
        for encounter in &area.pokemon_encounters {
            println!(" - {}", encounter.pokemon.name);
        }
        Ok(())
    }

    async fn catch(&mut self, name: &str) -> Result<(), CommandError> {
        let name = name.to_lowercase();
        if self.caught.contains_key(&name) {
            println!("You already caught {}!", name);
            return Ok(());
        }

        let pokemon = self.client.pokemon(&name).await?;
        println!("Throwing a Pokeball at {}...", pokemon.name);

        if !battle::catch_roll(pokemon.base_experience, &mut rand::thread_rng()) {
            println!("{} escaped!", pokemon.name);
            return Ok(());
        }

        println!("{} was caught!", pokemon.name.as_str().dark_green());
        println!("You may now inspect it with the 'inspect' command.");
        self.caught.insert(
            pokemon.name.clone(),
            CaughtPokemon {
                pokemon,
                caught_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn inspect(&self, name: &str) -> Result<(), CommandError> {
        let caught = match self.caught.get(&name.to_lowercase()) {
            Some(caught) => caught,
            None => {
                println!("You have not caught that pokemon!");
                return Ok(());
            }
        };
        let pokemon = &caught.pokemon;

        println!("Name: {}", pokemon.name);
        println!("Height: {}", pokemon.height);
        println!("Weight: {}", pokemon.weight);
        println!("Stats:");
        for stat in &pokemon.stats {
            println!(" - {}: {}", stat.stat.name, stat.base_stat);
        }
        println!("Types:");
        for entry in &pokemon.types {
            println!(" - {}", entry.kind.name);
        }

        if let Some(url) = pokemon.artwork_url() {
            let bytes = self.client.sprite(url).await?;
            for line in draw::render_sprite(&bytes)? {
                println!("{}", line);
            }
        }
        Ok(())
    }

    fn pokedex(&self) {
        if self.caught.is_empty() {
            println!("Your pokedex is empty! Try to catch Pokemon with 'catch' command");
            return;
        }

        println!("Your pokedex:");
        for caught in self.caught.values() {
            println!(" - {} ID:{}", caught.pokemon.name, caught.pokemon.id);
        }
    }

    async fn battle(&self, first: &str, second: &str) -> Result<(), CommandError> {
        let first = first.to_lowercase();
        let second = second.to_lowercase();
        let (a, b) = match (self.caught.get(&first), self.caught.get(&second)) {
            (Some(a), Some(b)) => (&a.pokemon, &b.pokemon),
            _ => {
                println!("You have not caught that pokemon!");
                return Ok(());
            }
        };
        println!("{}", format!("{} vs {}!", a.name, b.name).dark_blue());

        let events = battle::simulate(
            Battler::from_pokemon(a),
            Battler::from_pokemon(b),
            &mut rand::thread_rng(),
        );
        for event in events {
            tokio::time::sleep(self.turn_delay).await;
            match event {
                BattleEvent::Hit {
                    attacker,
                    defender,
                    remaining,
                } => println!(
                    "{} attacked! {}'s health is {}",
                    attacker, defender, remaining
                ),
                BattleEvent::Miss { attacker } => println!("{} missed", attacker),
                BattleEvent::Win { winner } => {
                    println!("{}", format!("{} is the WINNER!", winner).green());
                }
                BattleEvent::Draw => {
                    println!("Neither side could land a finishing blow. It's a draw!");
                }
            }
        }
        Ok(())
    }
}
