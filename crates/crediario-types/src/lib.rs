//! Shared domain types for the Crediario loan service.
//!
//! This crate is the single source of truth for the entity model used
//! across the workspace: clients (`Cliente`), their loans (`Emprestimo`),
//! and the deferred loan-collection type that replaces ORM-style lazy
//! navigation properties with an explicit loaded/unloaded tag.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer wrappers for entity identifiers
//! - [`entities`] -- Core entity structs with declarative validation
//! - [`collection`] -- The `Unloaded | Loaded` loan collection tag
//!
//! Validation constraints live on the entity structs themselves (via
//! [`validator`]) so every gateway can check them before a write reaches
//! storage.

pub mod collection;
pub mod entities;
pub mod ids;

// Re-export primary types at the crate root for convenience.
pub use collection::EmprestimoCollection;
pub use entities::{Cliente, Emprestimo};
pub use ids::{ClienteId, EmprestimoId};
