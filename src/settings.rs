use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

pub const DEFAULT_DB_PATH: &str = "data/catalog.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub db_path: String,
    pub log_level: String,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("db_path", DEFAULT_DB_PATH)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?)
}

impl Settings {
    /// Defaults, then `catalog.toml` if present, then `CATALOG_*` variables.
    pub fn load() -> Result<Settings> {
        defaults()?
            .add_source(File::with_name("catalog").required(false))
            .add_source(Environment::with_prefix("CATALOG").try_parsing(true))
            .build()
            .context("reading settings")?
            .try_deserialize()
            .context("invalid settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize() {
        let settings: Settings = defaults().unwrap().build().unwrap().try_deserialize().unwrap();
        assert_eq!(settings.db_path, DEFAULT_DB_PATH);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn later_sources_override_defaults() {
        let settings: Settings = defaults()
            .unwrap()
            .set_override("db_path", "/tmp/other.db")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.db_path, "/tmp/other.db");
        assert_eq!(settings.log_level, DEFAULT_LOG_LEVEL);
    }
}
