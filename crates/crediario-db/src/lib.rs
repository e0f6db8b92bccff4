//! `PostgreSQL` persistence layer: tracked gateway, loading strategies,
//! raw SQL, and explicit transactions.
//!
//! The crate offers two persistence styles over one shared pool:
//!
//! - the tracked path ([`UnitOfWork`]) accumulates changes in a
//!   registry and flushes them transactionally on commit, and
//! - the raw path ([`RawSqlStore`]) runs hand-written SQL and returns
//!   detached entities.
//!
//! Three loading strategies ([`EagerLoader`], [`ExplicitLoader`],
//! [`LazyLoader`]) control when a client's loan collection is
//! materialized. [`TransactionScope`] spans multiple statements when a
//! write must be all-or-nothing, and [`diagnostics`] provides timing
//! and transient-failure retry.

pub mod diagnostics;
pub mod error;
pub mod loading;
pub mod postgres;
pub mod raw_sql;
pub mod rows;
pub mod sql;
pub mod tracking;
pub mod transaction;
pub mod unit_of_work;

pub use diagnostics::{RetryPolicy, with_retry};
pub use error::DbError;
pub use loading::{EagerLoader, ExplicitLoader, LazyCliente, LazyLoader};
pub use postgres::{PostgresConfig, PostgresPool};
pub use raw_sql::{ClientesComContagem, RawSqlStore};
pub use tracking::{EntityState, EntryId, TrackError};
pub use transaction::{TransactionScope, criar_cliente_com_emprestimo};
pub use unit_of_work::{CommitSummary, TrackedEntryInfo, UnitOfWork};
