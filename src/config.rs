use std::{env, path::PathBuf, str::FromStr, time::Duration};

use tracing::info;

use crate::error::ConfigError;

const DEFAULT_IDENTITY_URL: &str = "https://api.byu.edu:443/byuapi";
const DEFAULT_DINING_URL: &str = "https://api.byu.edu:443";
const DEFAULT_RECIPE_URL: &str = "https://www.themealdb.com/api/json/v1/1";
const APP_DIR: &str = "cougar-craves";

/// Base URLs of the upstream APIs, without trailing slashes.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub identity: String,
    pub dining: String,
    pub recipe: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    /// Create the database file and table when they are missing.
    pub bootstrap: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoints: Endpoints,
    pub store: StoreConfig,
    pub secrets_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let timeout_secs: u64 = try_load("CRAVES_HTTP_TIMEOUT_SECS", "30")?;
        let endpoints = Endpoints {
            identity: url_var("CRAVES_IDENTITY_URL", DEFAULT_IDENTITY_URL),
            dining: url_var("CRAVES_DINING_URL", DEFAULT_DINING_URL),
            recipe: url_var("CRAVES_RECIPE_URL", DEFAULT_RECIPE_URL),
            timeout: Duration::from_secs(timeout_secs),
        };
        let store = StoreConfig {
            path: path_var("CRAVES_DATABASE", || {
                dirs::data_dir().map(|d| d.join(APP_DIR).join("preferences.db"))
            })?,
            bootstrap: try_load("CRAVES_BOOTSTRAP_SCHEMA", "false")?,
        };
        let secrets_dir = path_var("CRAVES_SECRETS_DIR", || {
            dirs::config_dir().map(|d| d.join(APP_DIR).join("secrets"))
        })?;

        Ok(Self {
            endpoints,
            store,
            secrets_dir,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn url_var(key: &str, default: &str) -> String {
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .trim_end_matches('/')
        .to_string()
}

fn path_var(
    key: &'static str,
    default: impl FnOnce() -> Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(value) = var(key) {
        return Ok(PathBuf::from(value));
    }
    let path = default().ok_or_else(|| ConfigError {
        key,
        reason: "not set and no platform default directory exists".into(),
    })?;
    info!("{key} not set, using default: {}", path.display());
    Ok(path)
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    let raw = var(key).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|e: T::Err| ConfigError {
        key,
        reason: format!("{raw:?}: {e}"),
    })
}
