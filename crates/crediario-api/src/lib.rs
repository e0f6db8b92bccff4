//! REST API for the Crediario loan service.
//!
//! Exposes the persistence layer's strategies over HTTP: the `/eager`,
//! `/explicit`, and `/lazy` families serve the same entity graph loaded
//! three different ways, `/changetracker` writes through the tracked
//! unit of work, `/sql` goes through the raw gateway, and
//! `/transacoes` runs multi-statement transactional operations.

pub mod error;
pub mod handlers;
pub mod raw;
pub mod router;
pub mod server;
pub mod state;
pub mod tracking;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
