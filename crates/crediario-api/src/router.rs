//! Axum router construction for the REST API.
//!
//! Assembles the strategy, change-tracker, raw-SQL, and transaction
//! routes into a single [`Router`] with CORS and request tracing
//! middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::raw;
use crate::state::AppState;
use crate::tracking;

/// Build the complete Axum router.
///
/// The route families:
/// - `/eager`, `/explicit`, `/lazy` -- the three loading strategies
/// - `/changetracker` -- writes through the tracked unit of work
/// - `/sql` -- the raw-SQL gateway
/// - `/transacoes` -- multi-statement transactional operations
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Loading strategies
        .route("/eager/clientes", get(handlers::eager_clientes))
        .route("/eager/clientes/{id}", get(handlers::eager_cliente))
        .route("/explicit/clientes", get(handlers::explicit_clientes))
        .route("/explicit/clientes/{id}", get(handlers::explicit_cliente))
        .route("/lazy/clientes/{id}", get(handlers::lazy_cliente))
        // Tracked unit of work
        .route("/changetracker/clientes", post(tracking::criar_cliente))
        .route(
            "/changetracker/clientes/{id}",
            put(tracking::atualizar_cliente).delete(tracking::remover_cliente),
        )
        // Raw SQL
        .route("/sql/clientes", get(raw::sql_clientes))
        .route("/sql/clientes/contagem", get(raw::sql_clientes_contagem))
        .route(
            "/sql/emprestimos",
            get(raw::sql_emprestimos).post(raw::sql_criar_emprestimo),
        )
        // Transactions
        .route(
            "/transacoes/cliente-com-emprestimo",
            post(raw::transacao_cliente_com_emprestimo),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
