//! Process configuration read from the environment once at startup.

use std::net::SocketAddr;

use thiserror::Error;

pub const BIND_ADDR_VAR: &str = "FEIRA_BIND_ADDR";
pub const SEED_FIXTURES_VAR: &str = "FEIRA_SEED_FIXTURES";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a socket address: {value}")]
    InvalidBindAddr { var: &'static str, value: String },

    #[error("{var} must be true or false, got {value}")]
    InvalidFlag { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Load the sample catalog, markets and expired products log at startup.
    pub seed_fixtures: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            seed_fixtures: true,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the config from any variable source. Unset variables fall back
    /// to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = match lookup(BIND_ADDR_VAR) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddr { var: BIND_ADDR_VAR, value })?,
            None => {
                tracing::warn!("{BIND_ADDR_VAR} not set; using {DEFAULT_BIND_ADDR}");
                Self::default().bind_addr
            }
        };

        let seed_fixtures = match lookup(SEED_FIXTURES_VAR) {
            Some(value) => parse_flag(SEED_FIXTURES_VAR, value)?,
            None => true,
        };

        Ok(Self { bind_addr, seed_fixtures })
    }
}

fn parse_flag(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { var, value }),
    }
}
