// src/config.rs
//
// Runtime configuration
//
// PRINCIPLES:
// - Loaded once at startup, then passed explicitly
// - No global state
// - Remote backend is enabled only when both URL and key are present

use std::path::PathBuf;
use std::time::Duration;

use crate::db::default_database_path;
use crate::error::{AppError, AppResult};
use crate::repositories::DEFAULT_QUOTA_BYTES;

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_TIMEOUT_MS: &str = "COFFEE_TRACKER_TIMEOUT_MS";
pub const ENV_DATABASE: &str = "COFFEE_TRACKER_DB";
pub const ENV_QUOTA_BYTES: &str = "COFFEE_TRACKER_QUOTA_BYTES";

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Connection details for the hosted backend
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSettings {
    pub url: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub quota_bytes: usize,
    pub remote_url: Option<String>,
    pub remote_key: Option<String>,
    pub timeout: Duration,
}

impl AppConfig {
    /// Local-only configuration with default limits
    pub fn local(database_path: PathBuf) -> Self {
        Self {
            database_path,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            remote_url: None,
            remote_key: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Read configuration from process environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = match non_empty(lookup(ENV_DATABASE)) {
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };

        let quota_bytes = match non_empty(lookup(ENV_QUOTA_BYTES)) {
            Some(raw) => parse_number::<usize>(ENV_QUOTA_BYTES, &raw)?,
            None => DEFAULT_QUOTA_BYTES,
        };

        let timeout_ms = match non_empty(lookup(ENV_TIMEOUT_MS)) {
            Some(raw) => parse_number::<u64>(ENV_TIMEOUT_MS, &raw)?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            database_path,
            quota_bytes,
            remote_url: non_empty(lookup(ENV_SUPABASE_URL)),
            remote_key: non_empty(lookup(ENV_SUPABASE_KEY)),
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.database_path = path;
        self
    }

    pub fn with_remote(mut self, url: Option<String>, key: Option<String>) -> Self {
        if let Some(url) = non_empty(url) {
            self.remote_url = Some(url);
        }
        if let Some(key) = non_empty(key) {
            self.remote_key = Some(key);
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Remote connection details, present only when both URL and key are set
    pub fn remote_settings(&self) -> Option<RemoteSettings> {
        match (&self.remote_url, &self.remote_key) {
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                Some(RemoteSettings {
                    url: url.trim().to_string(),
                    api_key: key.trim().to_string(),
                    timeout: self.timeout,
                })
            }
            _ => None,
        }
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote_settings().is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::Other(format!("{} must be a whole number, got '{}'", name, raw)))
}
