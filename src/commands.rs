//! REPL command parsing
//!
//! Splits a line of user input into a [`Command`]. Parsing is strictly
//! whitespace-based; argument validation beyond presence is left to the
//! handlers.

use thiserror::Error;

/// Errors produced while parsing a line of input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The first word is not a known command
    #[error("{0}: command not found")]
    Unknown(String),

    /// A known command is missing a required argument
    #[error("{command} command error: {message}")]
    MissingArgument {
        command: &'static str,
        message: &'static str,
    },
}

/// One parsed REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print usage
    Help,
    /// Save progress and quit
    Exit,
    /// Clear the terminal screen
    Clear,
    /// List the next page of location areas
    Map,
    /// List the previous page of location areas
    MapBack,
    /// List the Pokémon found in a location area
    Explore { area: String },
    /// Attempt to catch a Pokémon
    Catch { name: String },
    /// Show a caught Pokémon's details and artwork
    Inspect { name: String },
    /// List all caught Pokémon
    Pokedex,
    /// Battle two Pokémon against each other
    Battle { first: String, second: String },
}

impl Command {
    /// Parses a line of input; `Ok(None)` means the line was blank.
    pub fn parse(input: &str) -> Result<Option<Command>, ParseError> {
        let mut words = input.split_whitespace();
        let name = match words.next() {
            Some(name) => name,
            None => return Ok(None),
        };

        let command = match name {
            "help" => Command::Help,
            "exit" => Command::Exit,
            "clear" => Command::Clear,
            "map" => Command::Map,
            "mapb" => Command::MapBack,
            "pokedex" => Command::Pokedex,
            "explore" => Command::Explore {
                area: required(words.next(), "explore", "no location provided")?,
            },
            "catch" => Command::Catch {
                name: required(words.next(), "catch", "no Pokemon name provided")?,
            },
            "inspect" => Command::Inspect {
                name: required(words.next(), "inspect", "no Pokemon name provided")?,
            },
            "battle" => Command::Battle {
                first: required(words.next(), "battle", "two Pokemon names required")?,
                second: required(words.next(), "battle", "two Pokemon names required")?,
            },
            other => return Err(ParseError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

fn required(
    word: Option<&str>,
    command: &'static str,
    message: &'static str,
) -> Result<String, ParseError> {
    word.map(str::to_string)
        .ok_or(ParseError::MissingArgument { command, message })
}

/// Usage text printed by the `help` command
pub const USAGE: &str = "Usage:
  help\t\t\t\tDisplays a help message
  exit\t\t\t\tSave progress and exit the Pokedex
  clear\t\t\t\tClear the terminal screen
  pokedex\t\t\tDisplays all caught Pokemon
  map\t\t\t\tDisplays the names of the next 20 location areas
  mapb\t\t\t\tDisplays the names of the previous 20 location areas
  explore {location_area}\tDisplays all the Pokemon in a given area
  catch {pokemon_name}\t\tCatch Pokemon with a certain chance
  inspect {pokemon_name}\tInspect a caught Pokemon
  battle {name} {name}\t\tBattle two Pokemon against each other
";
