use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{HIGH_SCORE_KEY, HighScoreStore};

/// High score kept in a small JSON object file.
///
/// The value is written as a decimal string under [`HIGH_SCORE_KEY`]; any
/// other keys already in the file are left alone.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File contents, or `None` when there is no file yet
    fn read_text(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read high score file {:?}", self.path))
            }
        }
    }

    fn parse_object(&self, text: &str) -> Result<Map<String, Value>> {
        match serde_json::from_str::<Value>(text)
            .with_context(|| format!("Malformed high score file {:?}", self.path))?
        {
            Value::Object(map) => Ok(map),
            _ => anyhow::bail!("High score file {:?} is not a JSON object", self.path),
        }
    }

    fn read_object(&self) -> Result<Option<Map<String, Value>>> {
        self.read_text()?.map(|text| self.parse_object(&text)).transpose()
    }
}

/// Accepts the canonical decimal string, and a bare JSON number for
/// hand-edited files.
fn parse_score(value: &Value) -> Option<u32> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> u32 {
        let map = match self.read_object() {
            Ok(Some(map)) => map,
            Ok(None) => {
                log::debug!("No high score file at {:?}, starting from 0", self.path);
                return 0;
            }
            Err(e) => {
                log::warn!("Ignoring stored high score: {e:#}");
                return 0;
            }
        };

        match map.get(HIGH_SCORE_KEY) {
            None => 0,
            Some(value) => parse_score(value).unwrap_or_else(|| {
                log::warn!("Ignoring non-numeric high score {value} in {:?}", self.path);
                0
            }),
        }
    }

    fn save(&mut self, score: u32) -> Result<()> {
        // Keep unrelated keys. Only unparsable contents are replaced.
        let mut map = match self.read_text()? {
            Some(text) => self.parse_object(&text).unwrap_or_else(|e| {
                log::warn!("Replacing unusable high score file: {e:#}");
                Map::new()
            }),
            None => Map::new(),
        };
        map.insert(HIGH_SCORE_KEY.to_string(), Value::String(score.to_string()));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let data = serde_json::to_vec_pretty(&Value::Object(map))
            .context("Failed to serialize high score")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).with_context(|| format!("Failed to write {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to move {:?} into place", tmp))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("highscore.json"))
    }

    #[test]
    fn test_missing_file_reads_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.save(120).unwrap();

        assert_eq!(store.load(), 120);
        let raw = fs::read_to_string(store.path()).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[HIGH_SCORE_KEY], Value::String("120".into()));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested/deeper/highscore.json"));

        store.save(40).unwrap();

        assert_eq!(store.load(), 40);
    }

    #[test]
    fn test_corrupt_values_read_as_zero() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for contents in [
            "not json at all",
            "[1, 2, 3]",
            r#"{"snakeHighScore": "abc"}"#,
            r#"{"snakeHighScore": "-20"}"#,
            r#"{"snakeHighScore": null}"#,
            r#"{"otherKey": "50"}"#,
        ] {
            fs::write(store.path(), contents).unwrap();
            assert_eq!(store.load(), 0, "contents: {contents}");
        }
    }

    #[test]
    fn test_numeric_value_is_accepted() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"snakeHighScore": 90}"#).unwrap();

        assert_eq!(store.load(), 90);
    }

    #[test]
    fn test_save_preserves_other_keys() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        fs::write(store.path(), r#"{"theme": "dark", "snakeHighScore": "10"}"#).unwrap();

        store.save(30).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["theme"], Value::String("dark".into()));
        assert_eq!(store.load(), 30);
    }

    #[test]
    fn test_save_replaces_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        fs::write(store.path(), "garbage").unwrap();

        store.save(60).unwrap();

        assert_eq!(store.load(), 60);
    }

    #[test]
    fn test_save_fails_when_file_cannot_be_read() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        // A directory at the file's path makes the read fail with an I/O error
        fs::create_dir(store.path()).unwrap();

        let err = store.save(80).unwrap_err();

        assert!(format!("{err:#}").contains("Failed to read high score file"));
        assert!(store.path().is_dir());
        assert!(!store.path().with_extension("json.tmp").exists());
    }
}
