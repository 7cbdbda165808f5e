use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::constants::{self, env as vars, server, upstream};
use crate::error::ConfigError;

/// How the aggregator issues its per-currency requests.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FanOut {
    /// One request at a time; an aborting response stops further calls.
    #[default]
    Sequential,
    /// All requests in flight at once; results are still read in list order.
    Concurrent,
}

/// Optional on-disk settings. Every field falls back to a default.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FileConfig {
    pub target_currencies: Option<Vec<String>>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub bind_addr: Option<String>,
    #[serde(default)]
    pub fan_out: FanOut,
}

impl FileConfig {
    /// Missing file is not an error; the gateway runs on defaults.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Immutable process configuration, built once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub target_currencies: Vec<String>,
    pub request_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub fan_out: FanOut,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("target_currencies", &self.target_currencies)
            .field("request_timeout", &self.request_timeout)
            .field("bind_addr", &self.bind_addr)
            .field("fan_out", &self.fan_out)
            .finish()
    }
}

impl AppConfig {
    /// Load `.env`, the optional YAML file, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = env::var(vars::CONFIG_PATH)
            .unwrap_or_else(|_| server::DEFAULT_CONFIG_PATH.to_string());
        let file = FileConfig::read(Path::new(&path))?;

        Self::build(file, |key| env::var(key).ok())
    }

    /// Merge file settings with values from `lookup` (environment in production).
    pub fn build<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(vars::API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingVar(vars::API_KEY))?;

        let base_url = lookup(vars::QUOTE_API_URL)
            .or(file.base_url)
            .unwrap_or_else(|| upstream::DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: format!("'{}' is not an http(s) URL", base_url),
            });
        }

        let currencies = match lookup(vars::TARGET_CURRENCIES) {
            Some(raw) => raw.split(',').map(str::to_string).collect(),
            None => file.target_currencies.unwrap_or_else(|| {
                constants::DEFAULT_TARGET_CURRENCIES
                    .iter()
                    .map(|c| c.to_string())
                    .collect()
            }),
        };
        let target_currencies = normalize_currencies(currencies)?;

        let request_timeout = match lookup(vars::REQUEST_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    field: "request_timeout_secs",
                    reason: e.to_string(),
                })?;
                Duration::from_secs(secs)
            }
            None => file
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(upstream::DEFAULT_REQUEST_TIMEOUT),
        };
        if request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        let bind_raw = lookup(vars::BIND_ADDR)
            .or(file.bind_addr)
            .unwrap_or_else(|| server::DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.trim().parse().map_err(|_| ConfigError::Invalid {
            field: "bind_addr",
            reason: format!("'{}' is not a socket address", bind_raw),
        })?;

        Ok(Self {
            api_key,
            base_url,
            target_currencies,
            request_timeout,
            bind_addr,
            fan_out: file.fan_out,
        })
    }
}

/// Uppercase, trim and dedupe currency codes, keeping first occurrence order.
pub fn normalize_currencies(raw: Vec<String>) -> Result<Vec<String>, ConfigError> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for code in raw {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            continue;
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid {
                field: "target_currencies",
                reason: format!("'{}' is not a 3-letter currency code", code),
            });
        }
        if !out.contains(&code) {
            out.push(code);
        }
    }

    if out.is_empty() {
        return Err(ConfigError::Invalid {
            field: "target_currencies",
            reason: "at least one currency is required".to_string(),
        });
    }
    Ok(out)
}
