//! Deferred loan collection for a client.
//!
//! ORM frameworks materialize a client's loans through lazy proxies or
//! explicit `Load` calls on a navigation property. Without runtime proxy
//! generation the loaded/not-loaded distinction must be carried in the
//! type itself: [`EmprestimoCollection`] is either `Unloaded` (no storage
//! round-trip has populated it yet) or `Loaded` with the complete set of
//! loans whose foreign key matches the owning client.
//!
//! Serialization preserves the distinction: `Unloaded` renders as JSON
//! `null` (the unmaterialized navigation property), `Loaded` as an array.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entities::Emprestimo;

/// A client's loan collection, tagged by whether it has been materialized.
///
/// Invariant: when `Loaded`, the vector holds exactly the set of loans
/// whose `cliente_id` equals the owning client's ID at fetch time --
/// never a partial subset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EmprestimoCollection {
    /// No loading strategy has populated the collection yet.
    #[default]
    Unloaded,
    /// The collection has been materialized by a loading strategy.
    Loaded(Vec<Emprestimo>),
}

impl EmprestimoCollection {
    /// Whether the collection has been materialized.
    ///
    /// Explicit loading consults this before issuing a fetch so that a
    /// collection already populated (for example by a prior eager step)
    /// is not reloaded.
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// The loans, if the collection has been materialized.
    pub fn as_loaded(&self) -> Option<&[Emprestimo]> {
        match self {
            Self::Unloaded => None,
            Self::Loaded(items) => Some(items),
        }
    }

    /// Number of loans, if the collection has been materialized.
    pub fn loaded_len(&self) -> Option<usize> {
        self.as_loaded().map(<[Emprestimo]>::len)
    }

    /// Replace the collection with a freshly fetched set of loans.
    pub fn set_loaded(&mut self, items: Vec<Emprestimo>) {
        *self = Self::Loaded(items);
    }
}

impl Serialize for EmprestimoCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unloaded => serializer.serialize_none(),
            Self::Loaded(items) => items.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for EmprestimoCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Option::<Vec<Emprestimo>>::deserialize(deserializer)?;
        Ok(items.map_or(Self::Unloaded, Self::Loaded))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::ids::{ClienteId, EmprestimoId};

    fn loan() -> Emprestimo {
        Emprestimo {
            id: Some(EmprestimoId::new(1)),
            valor: Decimal::new(100_000, 2),
            parcelas: 12,
            taxa_juros: Decimal::new(25, 1),
            cliente_id: ClienteId::new(1),
        }
    }

    #[test]
    fn unloaded_serializes_as_null() {
        let collection = EmprestimoCollection::Unloaded;
        assert_eq!(
            serde_json::to_value(&collection).ok(),
            Some(serde_json::Value::Null)
        );
    }

    #[test]
    fn loaded_serializes_as_array() {
        let collection = EmprestimoCollection::Loaded(vec![loan()]);
        let value = serde_json::to_value(&collection).unwrap_or_default();
        assert!(value.is_array());
        assert_eq!(value.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn null_deserializes_as_unloaded() {
        let collection: EmprestimoCollection =
            serde_json::from_str("null").unwrap_or(EmprestimoCollection::Loaded(Vec::new()));
        assert_eq!(collection, EmprestimoCollection::Unloaded);
        assert!(!collection.is_loaded());
    }

    #[test]
    fn set_loaded_marks_collection_materialized() {
        let mut collection = EmprestimoCollection::Unloaded;
        assert!(collection.as_loaded().is_none());

        collection.set_loaded(vec![loan()]);
        assert!(collection.is_loaded());
        assert_eq!(collection.loaded_len(), Some(1));
    }
}
