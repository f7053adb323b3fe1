//! Durable high score storage
//!
//! The high score lives in a single key-value slot. Reads never fail: an
//! absent or unusable value counts as zero.

pub mod json_file;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub use json_file::JsonFileStore;

/// Key under which the best score is stored
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

pub trait HighScoreStore {
    /// Read the stored high score, treating anything unusable as 0
    fn load(&self) -> u32;

    /// Overwrite the stored high score
    fn save(&mut self, score: u32) -> Result<()>;
}

impl<T: HighScoreStore + ?Sized> HighScoreStore for Box<T> {
    fn load(&self) -> u32 {
        (**self).load()
    }

    fn save(&mut self, score: u32) -> Result<()> {
        (**self).save(score)
    }
}

/// In-process store, used for `--no-persist` and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<u32>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: u32) -> Self {
        Self {
            value: Some(value),
            writes: 0,
        }
    }

    pub fn value(&self) -> Option<u32> {
        self.value
    }

    /// Number of `save` calls seen so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> u32 {
        self.value.unwrap_or(0)
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.value = Some(score);
        self.writes += 1;
        Ok(())
    }
}

/// Per-user data directory for the game's files
pub fn data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "tui_snake")
        .context("Could not resolve a data directory for this user")?;
    Ok(dirs.data_local_dir().to_path_buf())
}

/// Default location of the high score file
pub fn default_high_score_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("highscore.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_defaults_to_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.load(), 0);
        assert_eq!(store.value(), None);
    }

    #[test]
    fn test_memory_store_last_write_wins() {
        let mut store = MemoryStore::with_value(30);
        store.save(50).unwrap();
        store.save(70).unwrap();

        assert_eq!(store.load(), 70);
        assert_eq!(store.writes(), 2);
    }
}
