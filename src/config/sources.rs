use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "KRSITE_DL_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/krsite-dl.toml";
const ENV_PREFIX: &str = "KRSITE_DL";
const ENV_SEPARATOR: &str = "__";

/// Reads `.env` into the process environment, then resolves the file path
/// from `KRSITE_DL_CONFIG` and layers file and environment over defaults.
pub fn load() -> Result<Config, ConfigError> {
    // A missing .env is normal
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Struct defaults, then `config_path` if present, then `KRSITE_DL__*`
/// variables. Later layers win.
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::debug!(path = %config_path.display(), "Reading config file");
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            path = %config_path.display(),
            "No config file, using defaults and environment"
        );
    }

    // KRSITE_DL__DOWNLOAD__DESTINATION -> download.destination
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}
