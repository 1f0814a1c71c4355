use std::{env, path::PathBuf};

use grid::RouteTable;
use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::warn;

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase();
    pub static ref DATA_FOLDER: Option<PathBuf> = env::var(format!("{}_DATA", PROJECT_NAME.clone()))
        .ok()
        .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

/// Runtime settings. Every key has a default, so a missing config file is
/// not an error.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Read fixtures from this directory instead of the built-in set.
    #[serde(default)]
    pub fixtures_dir: Option<PathBuf>,
    pub fetch_timeout_ms: u64,
    pub page_size: usize,
    pub tick_rate: f64,
    pub frame_rate: f64,
    pub log_level: String,
    /// Merged over the built-in route table.
    #[serde(default)]
    pub routes: RouteTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fixtures_dir: None,
            fetch_timeout_ms: 5_000,
            page_size: 10,
            tick_rate: 4.0,
            frame_rate: 30.0,
            log_level: "info".into(),
            routes: RouteTable::default(),
        }
    }
}

impl Config {
    /// Layer `<app>.json5` and `<app>.toml` from `config_dir` over the
    /// defaults, then `DESK_*` environment variables over both.
    pub fn load(config_dir: &std::path::Path, app_id: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("fetch_timeout_ms", defaults.fetch_timeout_ms as i64)?
            .set_default("page_size", defaults.page_size as i64)?
            .set_default("tick_rate", defaults.tick_rate)?
            .set_default("frame_rate", defaults.frame_rate)?
            .set_default("log_level", defaults.log_level)?;

        let config_files = [
            (format!("{app_id}.json5"), config::FileFormat::Json5),
            (format!("{app_id}.toml"), config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let path = config_dir.join(file);
            if path.exists() {
                found_config = true;
            }
            builder = builder.add_source(config::File::from(path).format(*format).required(false));
        }
        if !found_config {
            warn!(dir = %config_dir.display(), "no configuration file found, using defaults");
        }

        builder = builder.add_source(
            config::Environment::with_prefix(PROJECT_NAME.as_str())
                .try_parsing(true)
                .ignore_empty(true),
        );

        builder.build()?.try_deserialize()
    }
}

/// Config directory override from the environment.
pub fn config_dir_override() -> Option<PathBuf> {
    CONFIG_FOLDER.clone()
}

/// Data directory override from the environment.
pub fn data_dir_override() -> Option<PathBuf> {
    DATA_FOLDER.clone()
}
