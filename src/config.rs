// Client configuration: API endpoints, transport timeout, cache and retry tuning

use crate::error::ClientError;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_MEDIA_BASE_URL: &str = "http://localhost:8000";
pub const APP_NAME: &str = "Tripffer";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub media_base_url: String,
    pub timeout_ms: u64,
    // Where the bearer token pair is persisted between runs
    pub token_path: PathBuf,
    pub stale_time_secs: u64,
    pub max_cache_entries: usize,
    pub retry: RetryConfig,
    pub default_currency: String,
    pub items_per_page: usize,
}

// Applies to reads only; writes are sent exactly once
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    // Exponential backoff with jitter
    pub fn backoff(&self, retry_attempt: u32) -> Duration {
        let base_backoff_ms = (self.initial_backoff_ms as f64
            * self.backoff_multiplier.powf(retry_attempt as f64))
        .min(self.max_backoff_ms as f64);

        let jitter = rand::random::<f64>() * self.jitter_factor * base_backoff_ms;
        let backoff_ms = base_backoff_ms * (1.0 - self.jitter_factor / 2.0) + jitter;

        Duration::from_millis(backoff_ms as u64)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            media_base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
            timeout_ms: 30000,
            token_path: default_token_path(),
            stale_time_secs: 300,
            max_cache_entries: 256,
            retry: RetryConfig::default(),
            default_currency: "USD".to_string(),
            items_per_page: 12,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        dotenv().ok();

        let defaults = Self::default();
        let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

        let config = Self {
            api_base_url: get_env("TRIPFFER_API_URL").unwrap_or(defaults.api_base_url),
            media_base_url: get_env("TRIPFFER_MEDIA_URL").unwrap_or(defaults.media_base_url),
            timeout_ms: parse_env("TRIPFFER_TIMEOUT_MS", get_env("TRIPFFER_TIMEOUT_MS"))?
                .unwrap_or(defaults.timeout_ms),
            token_path: get_env("TRIPFFER_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_path),
            stale_time_secs: parse_env("TRIPFFER_STALE_SECS", get_env("TRIPFFER_STALE_SECS"))?
                .unwrap_or(defaults.stale_time_secs),
            max_cache_entries: parse_env(
                "TRIPFFER_CACHE_MAX_ENTRIES",
                get_env("TRIPFFER_CACHE_MAX_ENTRIES"),
            )?
            .unwrap_or(defaults.max_cache_entries),
            retry: RetryConfig {
                max_retries: parse_env("TRIPFFER_READ_RETRIES", get_env("TRIPFFER_READ_RETRIES"))?
                    .unwrap_or(defaults.retry.max_retries),
                ..defaults.retry
            },
            default_currency: get_env("TRIPFFER_CURRENCY").unwrap_or(defaults.default_currency),
            items_per_page: parse_env("TRIPFFER_PAGE_SIZE", get_env("TRIPFFER_PAGE_SIZE"))?
                .unwrap_or(defaults.items_per_page),
        };

        config.validate()?;
        tracing::debug!(api = %config.api_base_url, media = %config.media_base_url, "Client configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        self.api_url()?;
        Url::parse(&self.media_base_url).map_err(|e| {
            ClientError::ConfigError(format!("Invalid media URL '{}': {}", self.media_base_url, e))
        })?;
        if self.items_per_page == 0 {
            return Err(ClientError::ConfigError(
                "items_per_page must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    // API base with a trailing slash so relative joins keep the `/api` segment
    pub fn api_url(&self) -> Result<Url, ClientError> {
        let mut base = self.api_base_url.trim_end_matches('/').to_string();
        base.push('/');
        Url::parse(&base).map_err(|e| {
            ClientError::ConfigError(format!("Invalid API URL '{}': {}", self.api_base_url, e))
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>, ClientError>
where
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ClientError::ConfigError(format!("Invalid {}: {}", name, e)))
    })
    .transpose()
}

fn default_token_path() -> PathBuf {
    let home = env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".tripffer").join("token.json")
}
