//! Configuration types, read from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;

use crate::apply::wizard::DEFAULT_SELECT_DELAY;
use crate::error::ConfigError;

/// HTTP service configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Path of the libSQL database file.
    pub db_path: PathBuf,
    /// Single origin allowed by CORS. `None` allows any.
    pub allowed_origin: Option<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            db_path: PathBuf::from("./data/coach-apply.db"),
            allowed_origin: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable ports fall back to the default.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind = match get("COACH_APPLY_BIND") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "COACH_APPLY_BIND".to_string(),
                message: format!("{e}"),
            })?,
            None => defaults.bind,
        };

        let port = get("COACH_APPLY_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let db_path = get("COACH_APPLY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let allowed_origin = match get("COACH_APPLY_ALLOWED_ORIGIN") {
            Some(raw) if !raw.trim().is_empty() && raw.trim() != "*" => {
                Some(HeaderValue::from_str(raw.trim()).map_err(|e| {
                    ConfigError::InvalidValue {
                        key: "COACH_APPLY_ALLOWED_ORIGIN".to_string(),
                        message: e.to_string(),
                    }
                })?)
            }
            _ => None,
        };

        Ok(Self {
            bind,
            port,
            db_path,
            allowed_origin,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// Terminal wizard configuration.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Run the terminal wizard after the server starts.
    pub enabled: bool,
    /// Endpoint the wizard submits to.
    pub endpoint: String,
    pub select_delay: Duration,
    /// Use timed transitions instead of instant ones.
    pub animate: bool,
}

impl TerminalConfig {
    pub fn from_env(server: &ServerConfig) -> Self {
        Self::from_lookup(server, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(server: &ServerConfig, get: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            get(key)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };

        let endpoint = get("COACH_APPLY_ENDPOINT")
            .unwrap_or_else(|| format!("http://127.0.0.1:{}/api/apply", server.port));

        let select_delay = get("COACH_APPLY_SELECT_DELAY_MS")
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_SELECT_DELAY);

        Self {
            enabled: flag("COACH_APPLY_TERMINAL"),
            endpoint,
            select_delay,
            animate: flag("COACH_APPLY_ANIMATE"),
        }
    }
}
