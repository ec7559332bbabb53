//! Application settings.
//!
//! Layered lowest to highest: built-in defaults, the TOML config file,
//! `TASKBOOK_*` environment variables. Command-line flags are applied by the
//! caller on top of the result.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::planner::storage::TASKS_KEY;

const ENV_PREFIX: &str = "TASKBOOK";
const APP_DIR: &str = "taskbook";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Directory holding the task file and the log.
    pub data_dir: PathBuf,
    /// Storage key; the task file is `<data_dir>/<storage_key>.json`.
    pub storage_key: String,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Settings {
    /// Reads `config_file`, or the per-user default location when `None`.
    pub fn load(config_file: Option<&Path>) -> Result<Self, AppError> {
        let path = match config_file {
            Some(path) => path.to_path_buf(),
            None => default_config_file(),
        };
        let env = Environment::with_prefix(ENV_PREFIX);
        Ok(Self::build(&path, config_file.is_some(), env)?)
    }

    fn build(
        path: &Path,
        required: bool,
        env: Environment,
    ) -> Result<Self, config::ConfigError> {
        Config::builder()
            .set_default("data_dir", default_data_dir().to_string_lossy().into_owned())?
            .set_default("storage_key", TASKS_KEY)?
            .set_default("log_level", "info")?
            .add_source(File::from(path).required(required))
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(format!("{}.log", APP_DIR))
    }
}

fn default_data_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join(APP_DIR),
        None => PathBuf::from(format!(".{}", APP_DIR)),
    }
}

fn default_config_file() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(APP_DIR).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::build(&dir.path().join("missing.toml"), false, env(&[])).unwrap();

        assert_eq!(settings.storage_key, "tasks");
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.data_dir, default_data_dir());
        assert_eq!(settings.log_file(), default_data_dir().join("taskbook.log"));
    }

    #[test]
    fn test_missing_required_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::build(&dir.path().join("missing.toml"), true, env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "data_dir = \"/srv/notes\"\nstorage_key = \"work\"\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let settings = Settings::build(&path, true, env(&[])).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/srv/notes"));
        assert_eq!(settings.storage_key, "work");
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "storage_key = \"work\"\n").unwrap();

        let settings = Settings::build(
            &path,
            true,
            env(&[("TASKBOOK_STORAGE_KEY", "home"), ("TASKBOOK_LOG_LEVEL", "warn")]),
        )
        .unwrap();
        assert_eq!(settings.storage_key, "home");
        assert_eq!(settings.log_level, "warn");
    }
}
