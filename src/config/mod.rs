//! Layered settings for krsite-dl
//!
//! Struct defaults sit at the bottom, an optional TOML file above them and
//! environment variables on top. The binary applies command-line flags last
//! and validates again.
//!
//! # Environment
//!
//! Any key can be set as `KRSITE_DL__<SECTION>__<KEY>`:
//! - `KRSITE_DL__DOWNLOAD__DESTINATION=/srv/pictures`
//! - `KRSITE_DL__DOWNLOAD__WORKERS=8`
//! - `KRSITE_DL__HTTP__REQUEST_TIMEOUT=45s`
//!
//! # File
//!
//! `config/krsite-dl.toml` relative to the working directory, unless
//! `KRSITE_DL_CONFIG` names another path. A missing file is not an error.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{Config, DownloadConfig, HttpSettings, NamingConfig};
pub use validation::{MAX_WORKERS, ValidationError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// File from `KRSITE_DL_CONFIG` (or the default path) plus environment.
    ///
    /// # Errors
    ///
    /// A malformed file, an unparsable variable or a value out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Same as [`Config::load`] with an explicit file, as given by `--config`.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Re-run validation after command-line overrides were applied
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)?;
        Ok(())
    }
}
