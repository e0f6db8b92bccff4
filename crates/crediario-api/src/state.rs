//! Shared application state for the REST API server.
//!
//! [`AppState`] holds the connection pool every gateway is built from
//! and the retry policy applied to read endpoints. Handlers construct
//! their gateway per request; the pool is the only shared resource.

use crediario_db::RetryPolicy;
use sqlx::PgPool;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The shared `PostgreSQL` connection pool.
    pub pool: PgPool,
    /// Retry policy for transient failures on read endpoints.
    pub retry: RetryPolicy,
}

impl AppState {
    /// Build the state over an established pool with the default
    /// retry policy (three attempts, exponential backoff).
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy applied to read endpoints.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
