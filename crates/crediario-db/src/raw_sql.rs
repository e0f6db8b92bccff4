//! Hand-written SQL gateway, bypassing the tracked unit of work.
//!
//! Everything here is detached: results are plain entities with no
//! registry entry, and writes manage their own short-lived transactions.
//! This is the thin path for read-heavy endpoints and simple writes
//! where change tracking buys nothing.

use std::time::Instant;

use crediario_types::{Cliente, ClienteId, Emprestimo};
use serde::Serialize;
use sqlx::{Connection, PgPool};
use validator::Validate;

use crate::diagnostics::elapsed_ms;
use crate::error::DbError;
use crate::rows::{ClienteEmprestimoRow, ClienteRow, fold_clientes};
use crate::sql;

/// A client listing paired with the total count, read on one connection.
#[derive(Debug, Clone, Serialize)]
pub struct ClientesComContagem {
    /// Total number of clients in storage.
    pub total: i64,
    /// The clients themselves, collections unloaded.
    pub clientes: Vec<Cliente>,
}

/// Raw-SQL gateway over the shared pool.
#[derive(Clone)]
pub struct RawSqlStore {
    pool: PgPool,
}

impl RawSqlStore {
    /// Build a raw gateway over the shared pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All clients, detached, collections unloaded.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on storage failure.
    pub async fn clientes(&self) -> Result<Vec<Cliente>, DbError> {
        let rows: Vec<ClienteRow> =
            sqlx::query_as(r"SELECT id, nome, cpf FROM clientes ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(ClienteRow::into_cliente).collect())
    }

    /// All loans, detached, in identity order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on storage failure.
    pub async fn emprestimos(&self) -> Result<Vec<Emprestimo>, DbError> {
        let emprestimos = sqlx::query_as(
            r"SELECT id, valor, parcelas, taxa_juros, cliente_id
              FROM emprestimos ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(emprestimos)
    }

    /// All clients with loans materialized via the join-and-fold path.
    ///
    /// Same shape as the eager gateway's result, but detached.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on storage failure.
    pub async fn clientes_com_emprestimos(&self) -> Result<Vec<Cliente>, DbError> {
        let started = Instant::now();
        let rows: Vec<ClienteEmprestimoRow> = sqlx::query_as(
            r"SELECT c.id, c.nome, c.cpf,
                     e.id AS emprestimo_id, e.valor, e.parcelas, e.taxa_juros,
                     e.cliente_id AS emprestimo_cliente_id
              FROM clientes c
              LEFT JOIN emprestimos e ON e.cliente_id = c.id
              ORDER BY c.id, e.id",
        )
        .fetch_all(&self.pool)
        .await?;

        let clientes = fold_clientes(rows);
        tracing::debug!(
            clientes = clientes.len(),
            elapsed_ms = elapsed_ms(started),
            "raw join-and-fold"
        );
        Ok(clientes)
    }

    /// Count plus listing, both statements on the same connection.
    ///
    /// The two reads run sequentially on one checked-out connection so
    /// the pair costs a single pool slot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on storage failure.
    pub async fn clientes_com_contagem(&self) -> Result<ClientesComContagem, DbError> {
        let mut conn = self.pool.acquire().await?;

        let (total,): (i64,) = sqlx::query_as(r"SELECT COUNT(*) FROM clientes")
            .fetch_one(&mut *conn)
            .await?;
        let rows: Vec<ClienteRow> =
            sqlx::query_as(r"SELECT id, nome, cpf FROM clientes ORDER BY id")
                .fetch_all(&mut *conn)
                .await?;

        Ok(ClientesComContagem {
            total,
            clientes: rows.into_iter().map(ClienteRow::into_cliente).collect(),
        })
    }

    /// Insert a loan inside its own short transaction.
    ///
    /// Returns the loan with its assigned identity. Rolls back on any
    /// failure, including validation.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Validation`] before any statement runs, or
    /// [`DbError::Sql`] on storage failure (foreign-key violations
    /// included).
    pub async fn criar_emprestimo(&self, mut emprestimo: Emprestimo) -> Result<Emprestimo, DbError> {
        emprestimo.validate()?;

        let mut tx = self.pool.begin().await?;
        let id = sql::insert_emprestimo(tx.as_mut(), &emprestimo).await?;
        tx.commit().await?;

        emprestimo.id = Some(id);
        Ok(emprestimo)
    }

    /// Rename a client and insert a loan for it atomically.
    ///
    /// Both statements share one transaction: either both apply or
    /// neither does.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on validation or storage failure; the
    /// transaction rolls back in either case.
    pub async fn atualizar_cliente_e_criar_emprestimo(
        &self,
        cliente_id: ClienteId,
        novo_nome: &str,
        mut emprestimo: Emprestimo,
    ) -> Result<Emprestimo, DbError> {
        emprestimo.validate()?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        sqlx::query(r"UPDATE clientes SET nome = $1 WHERE id = $2")
            .bind(novo_nome)
            .bind(cliente_id)
            .execute(tx.as_mut())
            .await?;
        let id = sql::insert_emprestimo(tx.as_mut(), &emprestimo).await?;

        tx.commit().await?;
        emprestimo.id = Some(id);
        Ok(emprestimo)
    }
}
