//! Write endpoints driven by the tracked unit of work.
//!
//! Each request opens its own [`UnitOfWork`], performs the registry
//! operations, and commits once; the response includes the tracking
//! states the scope walked through so the lifecycle is observable from
//! the outside.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | `POST` | `/changetracker/clientes` | add + commit |
//! | `PUT` | `/changetracker/clientes/{id}` | fetch + update + commit |
//! | `DELETE` | `/changetracker/clientes/{id}` | fetch + remove + commit |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use crediario_db::{CommitSummary, EntityState, UnitOfWork};
use crediario_types::{Cliente, ClienteId};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a client.
#[derive(Debug, Deserialize)]
pub struct NovoCliente {
    /// Full name.
    pub nome: String,
    /// National ID, 11 digits.
    pub cpf: String,
}

/// Request body for updating a client; absent fields keep their value.
#[derive(Debug, Deserialize)]
pub struct AtualizarCliente {
    /// Replacement name, if any.
    pub nome: Option<String>,
    /// Replacement national ID, if any.
    pub cpf: Option<String>,
}

/// Response carrying the entity plus the states the scope observed.
#[derive(Debug, Serialize)]
pub struct TrackedResponse {
    /// The entity after commit.
    pub cliente: Cliente,
    /// Tracking states observed before and after the commit.
    pub states: Vec<EntityState>,
    /// Statement counts the commit flushed.
    pub summary: CommitSummary,
}

/// `POST /changetracker/clientes` -- add a client and commit.
pub async fn criar_cliente(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NovoCliente>,
) -> Result<(StatusCode, Json<TrackedResponse>), ApiError> {
    let mut uow = UnitOfWork::new(state.pool.clone());

    let entry = uow.add_cliente(Cliente::new(body.nome, body.cpf))?;
    let mut states = vec![EntityState::Added];

    let summary = uow.commit().await?;
    states.extend(uow.state_of(entry));

    let cliente = uow
        .cliente(entry)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("cliente detached after commit".to_owned()))?;

    Ok((
        StatusCode::CREATED,
        Json(TrackedResponse {
            cliente,
            states,
            summary,
        }),
    ))
}

/// `PUT /changetracker/clientes/{id}` -- mutate through the registry
/// and commit.
pub async fn atualizar_cliente(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<AtualizarCliente>,
) -> Result<Json<TrackedResponse>, ApiError> {
    let id = ClienteId::new(id);
    let mut uow = UnitOfWork::new(state.pool.clone());

    let entry = uow
        .fetch_cliente(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("cliente {id}")))?;
    let mut states = vec![EntityState::Unchanged];

    let modified = uow.update_cliente(entry, |cliente| {
        if let Some(nome) = body.nome {
            cliente.nome = nome;
        }
        if let Some(cpf) = body.cpf {
            cliente.cpf = cpf;
        }
    })?;
    states.push(modified);

    let summary = uow.commit().await?;
    states.extend(uow.state_of(entry));

    let cliente = uow
        .cliente(entry)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("cliente {id}")))?;

    Ok(Json(TrackedResponse {
        cliente,
        states,
        summary,
    }))
}

/// `DELETE /changetracker/clientes/{id}` -- mark deleted and commit.
/// The client's loans cascade in storage.
pub async fn remover_cliente(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let id = ClienteId::new(id);
    let mut uow = UnitOfWork::new(state.pool.clone());

    let entry = uow
        .fetch_cliente(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("cliente {id}")))?;
    uow.remove_cliente(entry)?;
    uow.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
