//! Eager loading: one joined query materializes the whole graph.
//!
//! A single outer join returns each client denormalized across its
//! loans (plus a marker row for clients with none); the fold in
//! [`crate::rows`] reassembles the graph. Every client this gateway
//! returns has a loaded collection, possibly empty.

use std::time::Instant;

use crediario_types::{Cliente, ClienteId};
use sqlx::PgPool;

use crate::diagnostics::elapsed_ms;
use crate::error::DbError;
use crate::rows::{ClienteEmprestimoRow, fold_clientes};

/// Gateway that loads clients with their loans in one round trip.
#[derive(Clone)]
pub struct EagerLoader {
    pool: PgPool,
}

impl EagerLoader {
    /// Build an eager gateway over the shared pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All clients, each with a fully materialized loan collection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on storage failure.
    pub async fn clientes_com_emprestimos(&self) -> Result<Vec<Cliente>, DbError> {
        let started = Instant::now();
        let rows: Vec<ClienteEmprestimoRow> =
            sqlx::query_as(super::CLIENTES_COM_EMPRESTIMOS_SQL)
                .fetch_all(&self.pool)
                .await?;

        let clientes = fold_clientes(rows);
        tracing::debug!(
            clientes = clientes.len(),
            elapsed_ms = elapsed_ms(started),
            "eager load: all clients"
        );
        Ok(clientes)
    }

    /// One client with a materialized loan collection, or `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on storage failure.
    pub async fn cliente_com_emprestimos(
        &self,
        id: ClienteId,
    ) -> Result<Option<Cliente>, DbError> {
        let started = Instant::now();
        let rows: Vec<ClienteEmprestimoRow> = sqlx::query_as(
            r"SELECT c.id, c.nome, c.cpf,
                     e.id AS emprestimo_id, e.valor, e.parcelas, e.taxa_juros,
                     e.cliente_id AS emprestimo_cliente_id
              FROM clientes c
              LEFT JOIN emprestimos e ON e.cliente_id = c.id
              WHERE c.id = $1
              ORDER BY e.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let cliente = fold_clientes(rows).into_iter().next();
        tracing::debug!(
            cliente_id = %id,
            found = cliente.is_some(),
            elapsed_ms = elapsed_ms(started),
            "eager load: one client"
        );
        Ok(cliente)
    }
}
