//! Relationship loading strategies.
//!
//! Three gateways materialize a client's loan collection at different
//! moments:
//!
//! - [`eager::EagerLoader`] joins clients and loans in one round trip,
//! - [`explicit::ExplicitLoader`] loads on an explicit follow-up call,
//! - [`lazy::LazyLoader`] defers the query until first navigation.
//!
//! All three agree on results: for the same storage state, a client's
//! materialized loans are identical regardless of strategy.

pub mod eager;
pub mod explicit;
pub mod lazy;

pub use eager::EagerLoader;
pub use explicit::ExplicitLoader;
pub use lazy::{LazyCliente, LazyLoader};

use crediario_types::{ClienteId, Emprestimo};
use sqlx::PgPool;

use crate::error::DbError;

/// Fetch a client's loans in identity order.
pub(crate) async fn fetch_emprestimos(
    pool: &PgPool,
    cliente_id: ClienteId,
) -> Result<Vec<Emprestimo>, DbError> {
    let emprestimos = sqlx::query_as(
        r"SELECT id, valor, parcelas, taxa_juros, cliente_id
          FROM emprestimos
          WHERE cliente_id = $1
          ORDER BY id",
    )
    .bind(cliente_id)
    .fetch_all(pool)
    .await?;
    Ok(emprestimos)
}

/// The joined client/loan projection shared by the eager strategy.
pub(crate) const CLIENTES_COM_EMPRESTIMOS_SQL: &str = r"
    SELECT c.id, c.nome, c.cpf,
           e.id AS emprestimo_id, e.valor, e.parcelas, e.taxa_juros,
           e.cliente_id AS emprestimo_cliente_id
    FROM clientes c
    LEFT JOIN emprestimos e ON e.cliente_id = c.id
    ORDER BY c.id, e.id";
