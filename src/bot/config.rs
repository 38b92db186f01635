use std::{
    env,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;

/* Config holds the static ranch setup of the bot.
 * It is loaded once at startup from a JSON file, and never mutated afterwards.
 * Ranch entries are allowed to be incomplete here; the payout processor
 * decides what to do with them.
 */

const CONFIG_PATH_VAR: &str = "RANCH_CONFIG";
const CONFIG_PATH_DEFAULT: &str = "config.json";
const BACKUP_DIR_DEFAULT: &str = "backups";
const TRACKING_LENGTH_DEFAULT: u32 = 7;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Json(serde_json::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(io_error: std::io::Error) -> ConfigError {
        ConfigError::Io(io_error)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(json_error: serde_json::Error) -> ConfigError {
        ConfigError::Json(json_error)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranch {
    pub name: String,
    pub data_file: Option<PathBuf>,
    pub payout_channel_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingConfig {
    pub anchor: NaiveDate,
    #[serde(default = "default_tracking_length")]
    pub length_days: u32,
    #[serde(default = "default_time_zone")]
    pub time_zone: Tz,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub ranches: Vec<Ranch>,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    #[serde(default)]
    pub tracking: Option<TrackingConfig>,
    #[serde(default)]
    pub admin_ids: Vec<u64>,
}

fn default_tracking_length() -> u32 {
    TRACKING_LENGTH_DEFAULT
}

fn default_time_zone() -> Tz {
    Tz::UTC
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from(BACKUP_DIR_DEFAULT)
}

impl Config {
    // Parses config from a JSON string.
    pub fn parse(text: &str) -> Result<Config, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    // Reads and parses the config file at the given path.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Config::parse(&text)
    }

    /* Loads config from the path given by RANCH_CONFIG.
     * Falls back to config.json in the working directory.
     */
    pub fn from_env() -> Result<Config, ConfigError> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| CONFIG_PATH_DEFAULT.to_string());
        log::info!("Loading ranch config from {path}");
        Config::load(Path::new(&path))
    }

    // An empty admin list leaves the privileged commands open to everyone.
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.is_empty() || self.admin_ids.contains(&user_id)
    }
}
