//! On-disk persistence of caught Pokémon
//!
//! Stores the caught set as a pretty-printed JSON file in an XDG-compliant
//! data directory (`~/.local/share/rustdex/` on Linux). A missing file is
//! treated as an empty Pokédex; a corrupt one is an error so a bad save is
//! never silently discarded.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;

use crate::data::CaughtPokemon;

/// File name of the save file inside the data directory
const SAVE_FILE: &str = "pokedex.json";

/// Errors that can occur when saving or loading progress
#[derive(Debug, Error)]
pub enum SaveError {
    /// Reading or writing the save file failed
    #[error("failed to access save file: {0}")]
    Io(#[from] std::io::Error),

    /// The save file exists but does not parse
    #[error("save file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Reads and writes the caught-Pokémon save file
#[derive(Debug, Clone)]
pub struct SaveManager {
    /// Directory where the save file lives
    data_dir: PathBuf,
}

impl SaveManager {
    /// Creates a SaveManager using the XDG data directory.
    ///
    /// Returns `None` if the data directory cannot be determined (e.g. no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "rustdex")?;
        let data_dir = project_dirs.data_dir().to_path_buf();
        Some(Self { data_dir })
    }

    /// Creates a SaveManager with a custom directory, for tests
    pub fn with_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn save_path(&self) -> PathBuf {
        self.data_dir.join(SAVE_FILE)
    }

    /// Writes the caught set, creating the data directory if needed
    pub fn save(&self, caught: &HashMap<String, CaughtPokemon>) -> Result<(), SaveError> {
        fs::create_dir_all(&self.data_dir)?;
        let json = serde_json::to_string_pretty(caught)?;
        fs::write(self.save_path(), json)?;
        Ok(())
    }

    /// Reads the caught set; a missing file yields an empty map
    pub fn load(&self) -> Result<HashMap<String, CaughtPokemon>, SaveError> {
        let content = match fs::read_to_string(self.save_path()) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HashMap::new());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }
}
