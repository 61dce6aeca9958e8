//! Configuration System
//!
//! Configuration comes from environment variables only. Every setting has a
//! default so an unconfigured process talks to `http://localhost`.

use reqwest::Url;

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// API access configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Entrypoint every root-relative path and IRI is resolved against
    pub entrypoint: Url,

    /// Timeout for regular requests in milliseconds (not applied to live updates)
    pub request_timeout_ms: u64,

    /// Fixed page size; when unset the member count of a page is used
    pub page_size: Option<u64>,

    /// Maximum number of cached query results
    pub cache_capacity: usize,
}

fn default_entrypoint() -> Url {
    Url::parse("http://localhost").expect("static entrypoint is a valid URL")
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_cache_capacity() -> usize {
    crate::fetch::DEFAULT_CACHE_CAPACITY
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            entrypoint: default_entrypoint(),
            request_timeout_ms: default_request_timeout(),
            page_size: None,
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl ApiConfig {
    /// Build a config for the given entrypoint with default settings
    pub fn with_entrypoint(entrypoint: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            entrypoint: parse_entrypoint(entrypoint)?,
            ..Self::default()
        })
    }

    /// Point an existing config at another entrypoint
    pub fn set_entrypoint(&mut self, entrypoint: &str) -> Result<(), ConfigError> {
        self.entrypoint = parse_entrypoint(entrypoint)?;
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error
    pub level: String,

    /// pretty (for development) or json
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Used by [`Config::from_env`]; tests pass a map instead of touching the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        // API overrides
        if let Some(entrypoint) = lookup("HYDRA_ADMIN_ENTRYPOINT") {
            config.api.entrypoint = parse_entrypoint(&entrypoint)?;
        }
        if let Some(timeout) = lookup("HYDRA_ADMIN_REQUEST_TIMEOUT_MS") {
            config.api.request_timeout_ms =
                timeout.parse().map_err(|_| ConfigError::Invalid {
                    key: "HYDRA_ADMIN_REQUEST_TIMEOUT_MS",
                    value: timeout.clone(),
                })?;
        }
        if let Some(size) = lookup("HYDRA_ADMIN_PAGE_SIZE") {
            match size.parse::<u64>() {
                Ok(n) if n > 0 => config.api.page_size = Some(n),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "HYDRA_ADMIN_PAGE_SIZE",
                        value: size,
                    })
                }
            }
        }

        if let Some(capacity) = lookup("HYDRA_ADMIN_CACHE_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(n) if n > 0 => config.api.cache_capacity = n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "HYDRA_ADMIN_CACHE_CAPACITY",
                        value: capacity,
                    })
                }
            }
        }

        // Logging overrides
        if let Some(level) = lookup("HYDRA_ADMIN_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = lookup("HYDRA_ADMIN_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn parse_entrypoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Entrypoint {
        value: raw.to_string(),
        error: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Entrypoint {
            value: raw.to_string(),
            error: "not a base URL".to_string(),
        });
    }
    Ok(url)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid entrypoint {value:?}: {error}")]
    Entrypoint { value: String, error: String },

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
