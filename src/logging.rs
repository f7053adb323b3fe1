//! File logging
//!
//! The terminal belongs to the game screen, so log records go to a file.

use anyhow::{Context, Result};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::storage::data_dir;

/// Default log file next to the high score file
pub fn default_log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("snake.log"))
}

/// Install a global logger writing to `path`, truncating any previous log.
/// `LevelFilter::Off` installs nothing.
pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_location_level(LevelFilter::Off)
        .build();

    WriteLogger::init(level, config, file).context("Failed to initialize logger")?;
    Ok(())
}
