//! Parameterized write statements, generic over the executor.
//!
//! Every function accepts `impl PgExecutor`, so a caller can pass the
//! pool (each statement becomes its own implicit transaction) or a live
//! transaction handle to join an open unit. This replaces ambient,
//! context-propagated transactions with explicit handle passing.
//!
//! Validation runs here, before any statement reaches storage; callers
//! higher up may validate earlier to report field-level detail sooner.

use std::time::Instant;

use crediario_types::{Cliente, ClienteId, Emprestimo, EmprestimoId};
use sqlx::PgExecutor;
use validator::Validate;

use crate::diagnostics::elapsed_ms;
use crate::error::DbError;

/// Insert a client, returning the generated identity.
pub async fn insert_cliente<'e>(
    executor: impl PgExecutor<'e>,
    cliente: &Cliente,
) -> Result<ClienteId, DbError> {
    cliente.validate()?;

    let started = Instant::now();
    let (id,): (i32,) =
        sqlx::query_as(r"INSERT INTO clientes (nome, cpf) VALUES ($1, $2) RETURNING id")
            .bind(&cliente.nome)
            .bind(&cliente.cpf)
            .fetch_one(executor)
            .await?;

    tracing::debug!(cliente_id = id, elapsed_ms = elapsed_ms(started), "INSERT clientes");
    Ok(ClienteId::new(id))
}

/// Update a persisted client's fields by identity.
pub async fn update_cliente<'e>(
    executor: impl PgExecutor<'e>,
    id: ClienteId,
    cliente: &Cliente,
) -> Result<(), DbError> {
    cliente.validate()?;

    let started = Instant::now();
    sqlx::query(r"UPDATE clientes SET nome = $1, cpf = $2 WHERE id = $3")
        .bind(&cliente.nome)
        .bind(&cliente.cpf)
        .bind(id)
        .execute(executor)
        .await?;

    tracing::debug!(cliente_id = %id, elapsed_ms = elapsed_ms(started), "UPDATE clientes");
    Ok(())
}

/// Delete a client by identity; its loans cascade in storage.
pub async fn delete_cliente<'e>(
    executor: impl PgExecutor<'e>,
    id: ClienteId,
) -> Result<(), DbError> {
    let started = Instant::now();
    sqlx::query(r"DELETE FROM clientes WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    tracing::debug!(cliente_id = %id, elapsed_ms = elapsed_ms(started), "DELETE clientes");
    Ok(())
}

/// Insert a loan, returning the generated identity.
///
/// The owning client must already be persisted; referential integrity
/// is enforced by the storage engine's foreign key.
pub async fn insert_emprestimo<'e>(
    executor: impl PgExecutor<'e>,
    emprestimo: &Emprestimo,
) -> Result<EmprestimoId, DbError> {
    emprestimo.validate()?;

    let started = Instant::now();
    let (id,): (i32,) = sqlx::query_as(
        r"INSERT INTO emprestimos (valor, parcelas, taxa_juros, cliente_id)
          VALUES ($1, $2, $3, $4)
          RETURNING id",
    )
    .bind(emprestimo.valor)
    .bind(emprestimo.parcelas)
    .bind(emprestimo.taxa_juros)
    .bind(emprestimo.cliente_id)
    .fetch_one(executor)
    .await?;

    tracing::debug!(emprestimo_id = id, elapsed_ms = elapsed_ms(started), "INSERT emprestimos");
    Ok(EmprestimoId::new(id))
}

/// Update a persisted loan's fields by identity.
pub async fn update_emprestimo<'e>(
    executor: impl PgExecutor<'e>,
    id: EmprestimoId,
    emprestimo: &Emprestimo,
) -> Result<(), DbError> {
    emprestimo.validate()?;

    let started = Instant::now();
    sqlx::query(
        r"UPDATE emprestimos
          SET valor = $1, parcelas = $2, taxa_juros = $3, cliente_id = $4
          WHERE id = $5",
    )
    .bind(emprestimo.valor)
    .bind(emprestimo.parcelas)
    .bind(emprestimo.taxa_juros)
    .bind(emprestimo.cliente_id)
    .bind(id)
    .execute(executor)
    .await?;

    tracing::debug!(emprestimo_id = %id, elapsed_ms = elapsed_ms(started), "UPDATE emprestimos");
    Ok(())
}

/// Delete a loan by identity.
pub async fn delete_emprestimo<'e>(
    executor: impl PgExecutor<'e>,
    id: EmprestimoId,
) -> Result<(), DbError> {
    let started = Instant::now();
    sqlx::query(r"DELETE FROM emprestimos WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    tracing::debug!(emprestimo_id = %id, elapsed_ms = elapsed_ms(started), "DELETE emprestimos");
    Ok(())
}
