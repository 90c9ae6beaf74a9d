//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults; a `.env` file is honored in development (loaded in `main`).

use std::env;
use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Yandex Geocoder API key. When absent the geocode endpoint always
    /// answers with an empty list.
    pub yandex_api_key: Option<String>,

    /// TTL for cached home coordinates, in seconds
    pub home_coords_ttl_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "baraholka.db".to_string()),

            yandex_api_key: env::var("YANDEX_MAPS_API_KEY").ok().filter(|k| !k.is_empty()),

            home_coords_ttl_secs: env::var("HOME_COORDS_TTL_SECS")
                .unwrap_or_else(|_| "1800".to_string()) // 30 minutes
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HOME_COORDS_TTL_SECS".to_string()))?,
        };

        Ok(config)
    }

    /// Socket address to bind the listener to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Env vars are process-global; only assert the parse of defaults
        let config = ServerConfig {
            port: 3000,
            database_path: "baraholka.db".to_string(),
            yandex_api_key: None,
            home_coords_ttl_secs: 1800,
        };
        assert_eq!(config.socket_addr().port(), 3000);
    }
}
