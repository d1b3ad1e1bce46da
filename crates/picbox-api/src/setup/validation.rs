//! Configuration validation
//!
//! Startup checks on top of `Config::validate`; fails fast before a socket is bound.

use anyhow::Result;
use picbox_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!(
            "CORS allows all origins (*) in production - set CORS_ORIGINS to restrict it"
        );
    }

    if config.upload_dir().is_relative() {
        tracing::debug!(
            upload_dir = %config.upload_dir().display(),
            "Upload directory is relative to the working directory"
        );
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn zero_size_limit_fails() {
        let config = Config::default().with_max_file_size_bytes(0);
        assert!(validate_config(&config).is_err());
    }
}
