//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, RetrySettings};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        validate_retry("retry.encode", &self.retry.encode)?;
        validate_retry("retry.summarize", &self.retry.summarize)?;
        if self.cache.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "cache.capacity must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.pipeline_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.pipeline_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

fn validate_retry(section: &str, settings: &RetrySettings) -> Result<(), ConfigError> {
    if settings.max_attempts == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{section}.max_attempts must be > 0"
        )));
    }
    if !settings.backoff_factor.is_finite() || settings.backoff_factor < 1.0 {
        return Err(ConfigError::ValidationError(format!(
            "{section}.backoff_factor must be >= 1.0"
        )));
    }
    if settings.max_delay_ms < settings.initial_delay_ms {
        return Err(ConfigError::ValidationError(format!(
            "{section}.max_delay_ms must be >= initial_delay_ms"
        )));
    }
    Ok(())
}
