//! Data models for PokeAPI resources
//!
//! Serde mappings for the subset of the PokeAPI schema the application
//! consumes: paginated location-area listings, per-area encounter lists,
//! and full Pokémon records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A name plus the URL of the full resource, PokeAPI's standard reference shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// One page of the location-area listing (20 results per page)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationAreaPage {
    /// Total number of location areas
    pub count: u32,
    /// URL of the next page, if any
    pub next: Option<String>,
    /// URL of the previous page, if any
    pub previous: Option<String>,
    /// Areas on this page
    pub results: Vec<NamedResource>,
}

/// A single location area with its Pokémon encounters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationArea {
    pub name: String,
    #[serde(default)]
    pub pokemon_encounters: Vec<PokemonEncounter>,
}

/// One possible encounter within a location area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonEncounter {
    pub pokemon: NamedResource,
}

/// A full Pokémon record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    /// Experience granted for defeating this Pokémon; null in the API for
    /// some forms, mapped to 0
    #[serde(default, deserialize_with = "null_as_zero")]
    pub base_experience: u32,
    pub height: u32,
    pub weight: u32,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    #[serde(default)]
    pub types: Vec<PokemonType>,
    #[serde(default)]
    pub sprites: Sprites,
}

impl Pokemon {
    /// Returns the base value of the named stat ("hp", "attack", ...),
    /// or 0 when the record does not carry it.
    pub fn base_stat(&self, name: &str) -> u32 {
        self.stats
            .iter()
            .find(|stat| stat.stat.name == name)
            .map(|stat| stat.base_stat)
            .unwrap_or(0)
    }

    /// URL of the official-artwork sprite, if the record has one
    pub fn artwork_url(&self) -> Option<&str> {
        self.sprites
            .other
            .official_artwork
            .front_default
            .as_deref()
    }
}

/// Maps an absent or explicitly-null number to 0
fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<u32>::deserialize(deserializer)?;
    Ok(value.unwrap_or(0))
}

/// A single stat entry on a Pokémon record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonStat {
    pub base_stat: u32,
    pub stat: NamedResource,
}

/// A single type entry on a Pokémon record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonType {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

/// Sprite URLs; only the official artwork is used
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub other: OtherSprites,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Artwork,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artwork {
    pub front_default: Option<String>,
}

/// A caught Pokémon as persisted in the save file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaughtPokemon {
    pub pokemon: Pokemon,
    /// When the catch happened
    pub caught_at: DateTime<Utc>,
}
