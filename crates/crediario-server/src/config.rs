//! Server configuration loaded from environment variables.
//!
//! The binary needs to know how to reach `PostgreSQL` and where to
//! bind; everything else carries a default.

use crate::error::ServerInitError;

/// Complete server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Host address to bind the HTTP server to.
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Maximum connections in the `PostgreSQL` pool.
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `DATABASE_URL` -- `PostgreSQL` connection string
    ///
    /// Optional variables:
    /// - `HOST` -- bind address (default `0.0.0.0`)
    /// - `PORT` -- listen port (default `8080`)
    /// - `MAX_CONNECTIONS` -- pool size (default `10`)
    pub fn from_env() -> Result<Self, ServerInitError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ServerInitError::Config("DATABASE_URL is not set".to_owned()))?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_owned());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_owned())
            .parse()
            .map_err(|e| ServerInitError::Config(format!("invalid PORT: {e}")))?;

        let max_connections: u32 = std::env::var("MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_owned())
            .parse()
            .map_err(|e| ServerInitError::Config(format!("invalid MAX_CONNECTIONS: {e}")))?;

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in_everything_but_the_database_url() {
        // Direct construction test since from_env requires real env vars.
        let config = Config {
            database_url: "postgresql://localhost/crediario".to_owned(),
            host: "0.0.0.0".to_owned(),
            port: 8080,
            max_connections: 10,
        };
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 10);
    }
}
