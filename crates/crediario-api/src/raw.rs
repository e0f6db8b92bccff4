//! Endpoints served by the raw-SQL gateway and the transaction scope.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | `GET` | `/sql/clientes` | join-and-fold listing |
//! | `GET` | `/sql/clientes/contagem` | count + listing, one connection |
//! | `GET` | `/sql/emprestimos` | loan listing |
//! | `POST` | `/sql/emprestimos` | loan insert in its own transaction |
//! | `POST` | `/transacoes/cliente-com-emprestimo` | atomic pair insert |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use crediario_db::{ClientesComContagem, RawSqlStore, criar_cliente_com_emprestimo, with_retry};
use crediario_types::{Cliente, ClienteId, Emprestimo};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a loan against an existing client.
#[derive(Debug, Deserialize)]
pub struct NovoEmprestimo {
    /// Principal amount.
    pub valor: Decimal,
    /// Installment count.
    pub parcelas: i32,
    /// Interest rate.
    pub taxa_juros: Decimal,
    /// Owning client identity.
    pub cliente_id: i32,
}

/// Request body for the atomic client-plus-first-loan operation.
///
/// The loan carries no owner reference; it is fixed up to the identity
/// the client insert returns.
#[derive(Debug, Deserialize)]
pub struct NovoClienteComEmprestimo {
    /// The client to create.
    pub nome: String,
    /// The client's national ID.
    pub cpf: String,
    /// Principal amount of the first loan.
    pub valor: Decimal,
    /// Installment count of the first loan.
    pub parcelas: i32,
    /// Interest rate of the first loan.
    pub taxa_juros: Decimal,
}

/// Response for the atomic pair insert.
#[derive(Debug, Serialize)]
pub struct ClienteComEmprestimo {
    /// The created client.
    pub cliente: Cliente,
    /// The created loan, owned by the client above.
    pub emprestimo: Emprestimo,
}

/// `GET /sql/clientes` -- all clients with loans, via join-and-fold.
pub async fn sql_clientes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Cliente>>, ApiError> {
    let store = RawSqlStore::new(state.pool.clone());
    let clientes = with_retry(state.retry, || store.clientes_com_emprestimos()).await?;
    Ok(Json(clientes))
}

/// `GET /sql/clientes/contagem` -- count plus listing on one connection.
pub async fn sql_clientes_contagem(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClientesComContagem>, ApiError> {
    let store = RawSqlStore::new(state.pool.clone());
    let resultado = with_retry(state.retry, || store.clientes_com_contagem()).await?;
    Ok(Json(resultado))
}

/// `GET /sql/emprestimos` -- all loans, detached.
pub async fn sql_emprestimos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Emprestimo>>, ApiError> {
    let store = RawSqlStore::new(state.pool.clone());
    let emprestimos = with_retry(state.retry, || store.emprestimos()).await?;
    Ok(Json(emprestimos))
}

/// `POST /sql/emprestimos` -- insert a loan in its own transaction.
pub async fn sql_criar_emprestimo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NovoEmprestimo>,
) -> Result<(StatusCode, Json<Emprestimo>), ApiError> {
    let store = RawSqlStore::new(state.pool.clone());
    let emprestimo = store
        .criar_emprestimo(Emprestimo::new(
            ClienteId::new(body.cliente_id),
            body.valor,
            body.parcelas,
            body.taxa_juros,
        ))
        .await
        .map_err(|e| {
            if e.is_constraint_violation() {
                ApiError::NotFound(format!("cliente {}", body.cliente_id))
            } else {
                e.into()
            }
        })?;
    Ok((StatusCode::CREATED, Json(emprestimo)))
}

/// `POST /transacoes/cliente-com-emprestimo` -- create a client and its
/// first loan atomically; a failure on either side persists neither.
pub async fn transacao_cliente_com_emprestimo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NovoClienteComEmprestimo>,
) -> Result<(StatusCode, Json<ClienteComEmprestimo>), ApiError> {
    let cliente = Cliente::new(body.nome, body.cpf);
    // Placeholder owner; the coordinator fixes it up after the client
    // insert returns the real identity.
    let emprestimo = Emprestimo::new(
        ClienteId::new(0),
        body.valor,
        body.parcelas,
        body.taxa_juros,
    );

    let (cliente, emprestimo) =
        criar_cliente_com_emprestimo(&state.pool, cliente, emprestimo).await?;

    Ok((
        StatusCode::CREATED,
        Json(ClienteComEmprestimo {
            cliente,
            emprestimo,
        }),
    ))
}
