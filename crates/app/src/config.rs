//! Admin tool configuration
//!
//! Read from `keyward.toml` in the user's config directory, or from the path
//! given with `--config`. Every key is optional.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, Result};

const CONFIG_FILE: &str = "keyward.toml";
const DEFAULT_LOG_FILTER: &str = "keyward=info,keyward_core=info";
const DEFAULT_SESSION_HOURS: i64 = 8;
const MAX_SESSION_HOURS: i64 = 24 * 30;

/// Config file contents as written by the operator
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    database: Option<PathBuf>,
    session_file: Option<PathBuf>,
    log_filter: Option<String>,
    session_hours: Option<i64>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database file
    pub database: PathBuf,
    /// Where the id of the open session is kept between invocations
    pub session_file: PathBuf,
    /// Used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Lifetime of sessions opened by `login`
    pub session_hours: i64,
}

impl Config {
    /// Load from an explicit path, or from the default location if present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "keyward", "keyward");

        let file = match (path, &dirs) {
            (Some(path), _) => read_config(path)?,
            (None, Some(dirs)) => {
                let default_path = dirs.config_dir().join(CONFIG_FILE);
                if default_path.exists() {
                    read_config(&default_path)?
                } else {
                    ConfigFile::default()
                }
            }
            (None, None) => ConfigFile::default(),
        };

        Self::from_file(file, dirs.as_ref().map(|d| d.data_dir()))
    }

    fn from_file(file: ConfigFile, data_dir: Option<&Path>) -> Result<Self> {
        let in_data_dir = |name: &str| {
            data_dir
                .map(|dir| dir.join(name))
                .ok_or(AppError::MissingDirectory("data"))
        };

        let database = match file.database {
            Some(path) => path,
            None => in_data_dir("keyward.db")?,
        };
        let session_file = match file.session_file {
            Some(path) => path,
            None => in_data_dir("session")?,
        };

        let session_hours = file.session_hours.unwrap_or(DEFAULT_SESSION_HOURS);
        if !(1..=MAX_SESSION_HOURS).contains(&session_hours) {
            return Err(AppError::InvalidConfig(format!(
                "session_hours must be between 1 and {MAX_SESSION_HOURS}, got {session_hours}"
            )));
        }

        Ok(Self {
            database,
            session_file,
            log_filter: file
                .log_filter
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            session_hours,
        })
    }
}

fn read_config(path: &Path) -> Result<ConfigFile> {
    debug!(path = %path.display(), "Reading config");
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}
