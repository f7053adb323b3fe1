use anyhow::Result;
use clap::Parser;
use simplelog::LevelFilter;
use std::path::PathBuf;
use tui_snake::game::{Difficulty, GameConfig, GameSession};
use tui_snake::logging;
use tui_snake::modes::HumanMode;
use tui_snake::storage::{self, HighScoreStore, JsonFileStore, MemoryStore};

#[derive(Parser)]
#[command(name = "tui_snake")]
#[command(version, about = "Snake in the terminal")]
struct Cli {
    /// Starting difficulty (can be changed in game with keys 1-4)
    #[arg(long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// Width and height of the square grid (5 to 100)
    #[arg(long, default_value = "20")]
    grid_size: usize,

    /// Where to keep the high score (defaults to the user data directory)
    #[arg(long)]
    high_score_file: Option<PathBuf>,

    /// Keep the high score in memory only
    #[arg(long, conflicts_with = "high_score_file")]
    no_persist: bool,

    /// Log file (defaults to the user data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log verbosity: off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn open_store(cli: &Cli) -> Result<Box<dyn HighScoreStore>> {
    if cli.no_persist {
        return Ok(Box::new(MemoryStore::new()));
    }

    let path = match &cli.high_score_file {
        Some(path) => path.clone(),
        None => storage::default_high_score_path()?,
    };
    log::info!("High score file: {:?}", path);
    Ok(Box::new(JsonFileStore::new(path)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Create game configuration from CLI arguments
    let config = GameConfig::new(cli.grid_size, cli.grid_size).with_difficulty(cli.difficulty);
    config.validate()?;

    let log_path = match &cli.log_file {
        Some(path) => path.clone(),
        None => logging::default_log_path()?,
    };
    logging::init(&log_path, cli.log_level)?;

    log::info!("Starting with {:?}", config);

    let session = GameSession::new(config, open_store(&cli)?);
    let mut human_mode = HumanMode::new(session);
    human_mode.run().await?;

    Ok(())
}
