//! Type-safe identifier wrappers around database-generated integers.
//!
//! Every entity has a strongly-typed ID to prevent accidental mixing of
//! identifiers at compile time. The storage engine generates values via
//! `SERIAL` columns; entities constructed in the application carry no ID
//! until their insert returns one.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `i32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i32);

        impl $name {
            /// Wrap a raw database identifier.
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Return the inner integer value.
            pub const fn into_inner(self) -> i32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a client (`clientes.id`).
    ClienteId
}

define_id! {
    /// Unique identifier for a loan (`emprestimos.id`).
    EmprestimoId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_do_not_compare_across_types() {
        // Compile-time property: ClienteId and EmprestimoId are distinct
        // types. At runtime we can still check the inner value round-trip.
        let id = ClienteId::new(7);
        assert_eq!(id.into_inner(), 7);
        assert_eq!(i32::from(id), 7);
        assert_eq!(ClienteId::from(7), id);
    }

    #[test]
    fn id_serializes_transparently() {
        let id = EmprestimoId::new(3);
        assert_eq!(serde_json::to_value(id).ok(), Some(serde_json::json!(3)));
    }
}
