//! Configuration module
//!
//! Configuration is read once at startup, validated, and then passed around read-only.
//! Nothing in the request path consults the environment.

use std::env;
use std::path::{Path, PathBuf};

use crate::allow_list::AllowList;
use crate::naming::FilenameStrategy;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_ALLOWED_TYPES: &str = "jpeg|jpg|png|gif";
const MAX_FILE_SIZE_MB: usize = 10;
const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Requests processed at once; the rest wait
    pub http_concurrency_limit: usize,
    /// `pretty` or `json`; unset picks by environment
    pub log_format: Option<String>,
}

/// Upload intake settings
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
    pub allowed_types: String,
    pub max_file_size_bytes: usize,
    pub filename_strategy: FilenameStrategy,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub upload: UploadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base: BaseConfig {
                server_host: "0.0.0.0".to_string(),
                server_port: DEFAULT_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                http_concurrency_limit: DEFAULT_HTTP_CONCURRENCY_LIMIT,
                log_format: None,
            },
            upload: UploadConfig {
                upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
                allowed_types: DEFAULT_ALLOWED_TYPES.to_string(),
                max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
                filename_strategy: FilenameStrategy::default(),
            },
        }
    }
}

impl Config {
    /// Load from the process environment (and a `.env` file when present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or(defaults.base.environment);

        let server_port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number, got '{}'", port))?,
            None => defaults.base.server_port,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.base.cors_origins);

        let max_file_size_bytes = match lookup("MAX_FILE_SIZE_MB") {
            Some(mb) => mb
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|mb| mb.checked_mul(1024 * 1024))
                .ok_or_else(|| {
                    anyhow::anyhow!("MAX_FILE_SIZE_MB must be a valid number, got '{}'", mb)
                })?,
            None => defaults.upload.max_file_size_bytes,
        };

        let http_concurrency_limit = match lookup("HTTP_CONCURRENCY_LIMIT") {
            Some(limit) => limit.trim().parse::<usize>().map_err(|_| {
                anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be a valid number, got '{}'", limit)
            })?,
            None => defaults.base.http_concurrency_limit,
        };

        let filename_strategy = match lookup("FILENAME_STRATEGY") {
            Some(s) => s.parse()?,
            None => defaults.upload.filename_strategy,
        };

        let config = Config {
            base: BaseConfig {
                server_host: lookup("HOST").unwrap_or(defaults.base.server_host),
                server_port,
                cors_origins,
                environment,
                http_concurrency_limit,
                log_format: lookup("LOG_FORMAT"),
            },
            upload: UploadConfig {
                upload_dir: lookup("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.upload.upload_dir),
                allowed_types: lookup("ALLOWED_TYPES").unwrap_or(defaults.upload.allowed_types),
                max_file_size_bytes,
                filename_strategy,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR cannot be empty"));
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.base.cors_origins.is_empty() {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS must list at least one origin (use '*' for any)"
            ));
        }

        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be greater than 0"));
        }

        AllowList::new(&self.upload.allowed_types)?;

        Ok(())
    }

    /// Same configuration, storing uploads under `dir`.
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload.upload_dir = dir.into();
        self
    }

    pub fn with_filename_strategy(mut self, strategy: FilenameStrategy) -> Self {
        self.upload.filename_strategy = strategy;
        self
    }

    pub fn with_max_file_size_bytes(mut self, bytes: usize) -> Self {
        self.upload.max_file_size_bytes = bytes;
        self
    }

    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_host(&self) -> &str {
        &self.base.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.base.http_concurrency_limit
    }

    pub fn log_format(&self) -> Option<&str> {
        self.base.log_format.as_deref()
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload.upload_dir
    }

    pub fn allowed_types(&self) -> &str {
        &self.upload.allowed_types
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.upload.max_file_size_bytes
    }

    pub fn filename_strategy(&self) -> FilenameStrategy {
        self.upload.filename_strategy
    }
}
