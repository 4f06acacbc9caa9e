// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! The API base is resolved once per process, first match wins:
//! - `OCAT_API_BASE` environment variable
//! - `api_base` in the config file (`--config` or `<config dir>/ocat/config.toml`)
//! - `http://localhost:3000`
//!
//! The push channel target is derived from the same base. Changing the base
//! means building a new connection manager.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use ocat_core::protocol::DEFAULT_NAMESPACE;

use crate::error::{Error, Result};

/// Environment variable overriding the API base.
pub const ENV_API_BASE: &str = "OCAT_API_BASE";

const CONFIG_DIR_NAME: &str = "ocat";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_API_BASE: &str = "http://localhost:3000";
const ENGINE_IO_PATH: &str = "/socket.io/";
const ENGINE_IO_QUERY: &str = "EIO=4&transport=websocket";

/// Configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the catalog API (e.g. `http://10.0.2.2:3000`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Push channel settings.
    #[serde(default)]
    pub push: PushConfig,
}

/// Push channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Namespace the catalog publishes on (default: "/objects").
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Max time for the socket handshake in milliseconds (default: 2000).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Time the list waits for the push channel before falling back to
    /// manual refresh, in milliseconds (default: 2000).
    #[serde(default = "default_fallback_timeout_ms")]
    pub fallback_timeout_ms: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        PushConfig {
            namespace: default_namespace(),
            connect_timeout_ms: default_connect_timeout_ms(),
            fallback_timeout_ms: default_fallback_timeout_ms(),
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_connect_timeout_ms() -> u64 {
    2_000
}

fn default_fallback_timeout_ms() -> u64 {
    2_000
}

impl Config {
    /// Default config file location, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolves settings from the environment and this config.
    pub fn resolve(&self) -> Result<Settings> {
        self.resolve_with(std::env::var(ENV_API_BASE).ok())
    }

    /// Resolves settings with an explicit environment override.
    pub fn resolve_with(&self, env_base: Option<String>) -> Result<Settings> {
        let raw = env_base
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.api_base.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = ApiBase::parse(&raw)?;

        if !self.push.namespace.starts_with('/') {
            return Err(Error::Config(format!(
                "push namespace must start with '/': {}",
                self.push.namespace
            )));
        }

        let push = PushTarget {
            url: api_base.push_url()?,
            namespace: api_base.namespace(&self.push.namespace),
            connect_timeout: Duration::from_millis(self.push.connect_timeout_ms),
        };

        Ok(Settings {
            api_base,
            push,
            fallback_timeout: Duration::from_millis(self.push.fallback_timeout_ms),
        })
    }
}

/// Loads the config from `explicit` or the default location and resolves it.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let config = match explicit {
        Some(path) if !path.exists() => {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )))
        }
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) => Config::load(&path)?,
            None => Config::default(),
        },
    };
    config.resolve()
}

/// Validated API base URL.
///
/// Only `http` and `https` bases with a host are accepted. User info, query
/// strings and fragments are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    url: Url,
}

impl ApiBase {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || Error::InvalidApiBase(raw.to_string());
        let url = Url::parse(raw.trim()).map_err(|_| invalid())?;

        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(invalid());
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid());
        }
        if url.query().is_some()
            || url.fragment().is_some()
            || !url.username().is_empty()
            || url.password().is_some()
        {
            return Err(invalid());
        }
        Ok(ApiBase { url })
    }

    /// Full base URL without a trailing slash.
    pub fn as_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }

    /// Non-empty segments of the base path.
    fn path_segments(&self) -> impl Iterator<Item = &str> {
        self.url
            .path_segments()
            .into_iter()
            .flatten()
            .filter(|segment| !segment.is_empty())
    }

    /// URL for an API path below the base; each segment is percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.url.clone();
        let base: Vec<String> = self.path_segments().map(str::to_string).collect();
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear().extend(&base).extend(segments);
        }
        url
    }

    /// WebSocket URL of the push channel, always at the origin.
    pub fn push_url(&self) -> Result<String> {
        let mut url = self.url.clone();
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| Error::InvalidApiBase(self.as_url()))?;
        url.set_path(ENGINE_IO_PATH);
        url.set_query(Some(ENGINE_IO_QUERY));
        Ok(url.to_string())
    }

    /// Namespace on the push channel; a base path prefixes it.
    pub fn namespace(&self, namespace: &str) -> String {
        let prefix: String = self.path_segments().map(|s| format!("/{s}")).collect();
        format!("{prefix}{namespace}")
    }
}

/// Where and how to open the push connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTarget {
    pub url: String,
    pub namespace: String,
    pub connect_timeout: Duration,
}

/// Process-wide settings resolved at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base: ApiBase,
    pub push: PushTarget,
    pub fallback_timeout: Duration,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
