use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::error::StartupError;

/// Optional JSON file named by `CONFIG_PATH`. Environment variables win.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ConfigFile {
    model_path: Option<PathBuf>,
    scaler_path: Option<PathBuf>,
    meta_path: Option<PathBuf>,
    port: Option<u16>,
    reference_year: Option<i32>,
    log_pred: Option<bool>,
}

impl ConfigFile {
    fn load(path: PathBuf) -> Result<Self, StartupError> {
        let data = fs::read_to_string(&path).map_err(|source| StartupError::Read {
            what: "config file",
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| StartupError::Parse {
            what: "config file",
            path,
            source,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub meta_path: PathBuf,
    pub port: u16,
    /// Year the car-age labels are computed against.
    pub reference_year: i32,
    /// Log a summary of every encoded feature vector.
    pub log_pred: bool,
}

impl AppConfig {
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_REFERENCE_YEAR: i32 = 2025;

    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup` (the environment in production),
    /// falling back to the config file, then to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StartupError> {
        let file = match lookup("CONFIG_PATH") {
            Some(p) => ConfigFile::load(PathBuf::from(p))?,
            None => ConfigFile::default(),
        };

        let path = |key: &'static str, fallback: Option<PathBuf>| {
            lookup(key)
                .map(PathBuf::from)
                .or(fallback)
                .ok_or(StartupError::MissingSetting(key))
        };

        Ok(Self {
            model_path: path("MODEL_PATH", file.model_path)?,
            scaler_path: path("SCALER_PATH", file.scaler_path)?,
            meta_path: path("META_PATH", file.meta_path)?,
            port: parse(&lookup, "PORT")?
                .or(file.port)
                .unwrap_or(Self::DEFAULT_PORT),
            reference_year: parse(&lookup, "REFERENCE_YEAR")?
                .or(file.reference_year)
                .unwrap_or(Self::DEFAULT_REFERENCE_YEAR),
            log_pred: lookup("LOG_PRED")
                .map(|v| v == "1")
                .or(file.log_pred)
                .unwrap_or(false),
        })
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, StartupError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| StartupError::InvalidSetting { key, value }),
    }
}
