//! Read endpoints demonstrating the three loading strategies.
//!
//! Each strategy family lives under its own path prefix so the same
//! data can be fetched three ways and compared:
//!
//! | Method | Path | Strategy |
//! |--------|------|----------|
//! | `GET` | `/eager/clientes` | one joined query |
//! | `GET` | `/eager/clientes/{id}` | one joined query |
//! | `GET` | `/explicit/clientes` | follow-up query per client |
//! | `GET` | `/explicit/clientes/{id}` | follow-up query on request |
//! | `GET` | `/lazy/clientes/{id}` | query on first navigation |
//!
//! Reads are wrapped in the transient-failure retry policy from
//! [`AppState`]; a client sees a failure only after the attempts are
//! exhausted.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use crediario_db::{EagerLoader, ExplicitLoader, LazyLoader, with_retry};
use crediario_types::{Cliente, ClienteId};

use crate::error::ApiError;
use crate::state::AppState;

/// Liveness probe.
#[allow(clippy::unused_async)] // axum handlers must be async
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /eager/clientes` -- all clients, loans joined in one query.
pub async fn eager_clientes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Cliente>>, ApiError> {
    let loader = EagerLoader::new(state.pool.clone());
    let clientes = with_retry(state.retry, || loader.clientes_com_emprestimos()).await?;
    Ok(Json(clientes))
}

/// `GET /eager/clientes/{id}` -- one client, loans joined in one query.
pub async fn eager_cliente(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Cliente>, ApiError> {
    let loader = EagerLoader::new(state.pool.clone());
    let id = ClienteId::new(id);
    let cliente = with_retry(state.retry, || loader.cliente_com_emprestimos(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("cliente {id}")))?;
    Ok(Json(cliente))
}

/// `GET /explicit/clientes` -- all clients, collections loaded by
/// explicit follow-up queries.
pub async fn explicit_clientes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Cliente>>, ApiError> {
    let loader = ExplicitLoader::new(state.pool.clone());
    let clientes = with_retry(state.retry, || loader.clientes_com_emprestimos()).await?;
    Ok(Json(clientes))
}

/// `GET /explicit/clientes/{id}` -- one client, collection loaded on
/// request.
pub async fn explicit_cliente(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Cliente>, ApiError> {
    let loader = ExplicitLoader::new(state.pool.clone());
    let id = ClienteId::new(id);
    let cliente = with_retry(state.retry, || loader.cliente_com_emprestimos(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("cliente {id}")))?;
    Ok(Json(cliente))
}

/// `GET /lazy/clientes/{id}` -- one client; the loan collection loads
/// itself when first navigated, which this handler does before
/// serializing so the response carries the full graph.
pub async fn lazy_cliente(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Cliente>, ApiError> {
    let loader = LazyLoader::new(state.pool.clone());
    let id = ClienteId::new(id);
    let mut lazy = with_retry(state.retry, || loader.cliente(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("cliente {id}")))?;

    // First navigation triggers the deferred query.
    lazy.emprestimos().await?;
    Ok(Json(lazy.into_inner()))
}
