use anyhow::{Result, ensure};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Points awarded for each piece of food
pub const FOOD_SCORE: u32 = 10;

/// Smallest grid the game accepts on either axis
pub const MIN_GRID_SIZE: usize = 5;

/// Largest grid the game accepts on either axis
pub const MAX_GRID_SIZE: usize = 100;

/// Difficulty tier, selecting the delay between ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 200ms per tick
    Easy,
    /// 150ms per tick
    #[default]
    Medium,
    /// 100ms per tick
    Hard,
    /// 70ms per tick
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Delay between two ticks while the game is running
    pub fn tick_delay(&self) -> Duration {
        match self {
            Self::Easy => Duration::from_millis(200),
            Self::Medium => Duration::from_millis(150),
            Self::Hard => Duration::from_millis(100),
            Self::Expert => Duration::from_millis(70),
        }
    }

    /// Label shown in the status line
    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Expert => "Expert",
        }
    }
}

/// Configuration for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Difficulty selected when the session starts
    pub difficulty: Difficulty,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            difficulty: Difficulty::default(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Check the grid fits between [`MIN_GRID_SIZE`] and [`MAX_GRID_SIZE`]
    pub fn validate(&self) -> Result<()> {
        for (axis, size) in [("width", self.grid_width), ("height", self.grid_height)] {
            ensure!(
                (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size),
                "Grid {} must be between {} and {}, got {}",
                axis,
                MIN_GRID_SIZE,
                MAX_GRID_SIZE,
                size
            );
        }
        Ok(())
    }

    /// Total number of cells on the grid
    pub fn cell_count(&self) -> usize {
        self.grid_width * self.grid_height
    }
}
