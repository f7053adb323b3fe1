//! Core game logic module for Snake
//!
//! The board rules (`engine`, `state`) are free of I/O. `session` adds the
//! start/pause/restart state machine on top, driven by the tick timer in
//! `clock`.

pub mod action;
pub mod clock;
pub mod config;
pub mod engine;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use clock::TickTimer;
pub use config::{Difficulty, FOOD_SCORE, GameConfig, MAX_GRID_SIZE, MIN_GRID_SIZE};
pub use engine::{GameEngine, StepResult};
pub use session::GameSession;
pub use state::{CollisionType, GameOutcome, GameState, GameStatus, Position, Snake};
