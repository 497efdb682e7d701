use super::models::Config;
use thiserror::Error;

/// Upper bound on per-post image concurrency
pub const MAX_WORKERS: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("download.workers must be between 1 and {max}, got {actual}")]
    InvalidWorkers { actual: usize, max: usize },

    #[error("http.max_attempts must be at least 1")]
    NoAttempts,

    #[error("Timeout must be positive: {field}")]
    ZeroTimeout { field: &'static str },

    #[error("http.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("download.destination must not be empty")]
    EmptyDestination,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_download(config)?;
    validate_http(config)?;
    Ok(())
}

fn validate_download(config: &Config) -> Result<(), ValidationError> {
    let workers = config.download.workers;
    if workers == 0 || workers > MAX_WORKERS {
        return Err(ValidationError::InvalidWorkers {
            actual: workers,
            max: MAX_WORKERS,
        });
    }

    if config.download.destination.as_os_str().is_empty() {
        return Err(ValidationError::EmptyDestination);
    }

    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    let http = &config.http;

    if http.max_attempts == 0 {
        return Err(ValidationError::NoAttempts);
    }

    if http.connect_timeout.as_duration().is_zero() {
        return Err(ValidationError::ZeroTimeout {
            field: "http.connect_timeout",
        });
    }
    if http.request_timeout.as_duration().is_zero() {
        return Err(ValidationError::ZeroTimeout {
            field: "http.request_timeout",
        });
    }

    if http.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }

    Ok(())
}
