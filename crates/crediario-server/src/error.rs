//! Startup errors for the server binary.

/// Errors that can occur while bringing the server up.
#[derive(Debug, thiserror::Error)]
pub enum ServerInitError {
    /// A configuration value is missing or unparseable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The persistence layer failed to initialize.
    #[error("database error: {0}")]
    Db(#[from] crediario_db::DbError),

    /// The HTTP server failed to start.
    #[error("server error: {0}")]
    Server(#[from] crediario_api::ServerError),
}
