//! Snake in the terminal
//!
//! This library provides:
//! - Core game logic and the session state machine (game module)
//! - Keyboard mapping and the terminal input stream (input module)
//! - TUI rendering (render module)
//! - High score persistence (storage module)
//! - The interactive game loop (modes module)

pub mod game;
pub mod input;
pub mod logging;
pub mod modes;
pub mod render;
pub mod storage;
