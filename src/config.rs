//! Application settings
//!
//! Settings are layered with the `config` crate: built-in defaults, then
//! `<config_dir>/partsdesk/settings.json` (or an explicit `--config` file),
//! then `PARTSDESK_*` environment variables. Nested keys use a double
//! underscore, e.g. `PARTSDESK_API__BASE_URL`. A missing default settings
//! file is not an error.

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trends::{TimeWindow, DEFAULT_MOVING_AVERAGE_WINDOW};

const ENV_PREFIX: &str = "PARTSDESK";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// HTTP source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the stock API, e.g. `https://erp.example.com/api`
    pub base_url: Option<String>,
    /// Bearer token sent with every request
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: PathBuf,
    /// Directory scanned and watched for trend files
    pub import_dir: PathBuf,
    pub export_dir: PathBuf,
    pub default_window: TimeWindow,
    /// Number of changes averaged in chart series
    pub moving_average_window: usize,
    pub api: ApiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: crate::db::default_db_path(),
            import_dir: default_import_dir(),
            export_dir: crate::export::get_export_directory(),
            default_window: TimeWindow::default(),
            moving_average_window: DEFAULT_MOVING_AVERAGE_WINDOW,
            api: ApiSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, a settings file and the environment
    ///
    /// An explicit `path` must exist; the default settings file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (default_config_path(), false),
        };
        tracing::debug!("Loading settings from {:?} (required: {})", file, required);

        let settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(
                File::from(file.as_path())
                    .format(FileFormat::Json)
                    .required(required),
            )
            .add_source(env)
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

/// `PARTSDESK_*` variables, `__` between nested keys
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Get the default settings file path
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("partsdesk")
        .join("settings.json")
}

/// Get the default import directory
pub fn default_import_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("partsdesk")
        .join("imports")
}
