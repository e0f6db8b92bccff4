//! Explicit loading: clients first, loans on request.
//!
//! The gateway returns clients with `Unloaded` collections; the caller
//! decides when to pay for the second query by calling
//! [`ExplicitLoader::load_emprestimos`]. Loading is idempotent: a
//! collection already materialized is left alone.

use std::time::Instant;

use crediario_types::{Cliente, ClienteId};
use sqlx::PgPool;

use crate::diagnostics::elapsed_ms;
use crate::error::DbError;
use crate::rows::ClienteRow;

/// Gateway that materializes loan collections only on request.
#[derive(Clone)]
pub struct ExplicitLoader {
    pool: PgPool,
}

impl ExplicitLoader {
    /// Build an explicit gateway over the shared pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All clients with unloaded collections, in identity order.
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

    /// One client with an unloaded collection, or `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on storage failure.
    pub async fn cliente(&self, id: ClienteId) -> Result<Option<Cliente>, DbError> {
        let row: Option<ClienteRow> =
            sqlx::query_as(r"SELECT id, nome, cpf FROM clientes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(ClienteRow::into_cliente))
    }

    /// Materialize a client's loan collection in place.
    ///
    /// Returns `true` if a query ran, `false` if the collection was
    /// already loaded (the call is a no-op) or the client has no
    /// persisted identity to load against.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on storage failure.
    pub async fn load_emprestimos(&self, cliente: &mut Cliente) -> Result<bool, DbError> {
        if cliente.emprestimos.is_loaded() {
            return Ok(false);
        }
        let Some(id) = cliente.id else {
            return Ok(false);
        };

        let started = Instant::now();
        let emprestimos = super::fetch_emprestimos(&self.pool, id).await?;
        tracing::debug!(
            cliente_id = %id,
            emprestimos = emprestimos.len(),
            elapsed_ms = elapsed_ms(started),
            "explicit load: loan collection"
        );
        cliente.emprestimos.set_loaded(emprestimos);
        Ok(true)
    }

    /// One client with its collection explicitly materialized.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on storage failure.
    pub async fn cliente_com_emprestimos(
        &self,
        id: ClienteId,
    ) -> Result<Option<Cliente>, DbError> {
        let Some(mut cliente) = self.cliente(id).await? else {
            return Ok(None);
        };
        self.load_emprestimos(&mut cliente).await?;
        Ok(Some(cliente))
    }

    /// All clients with their collections explicitly materialized.
    ///
    /// One follow-up query per client; the per-entity loaded check
    /// keeps repeated batch calls idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on storage failure.
    pub async fn clientes_com_emprestimos(&self) -> Result<Vec<Cliente>, DbError> {
        let mut clientes = self.clientes().await?;
        for cliente in &mut clientes {
            self.load_emprestimos(cliente).await?;
        }
        Ok(clientes)
    }
}
