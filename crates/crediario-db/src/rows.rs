//! Flat SQL row shapes and the multi-mapping fold.
//!
//! A joined client/loan query returns one denormalized row per loan,
//! plus a marker row (loan columns all `NULL`) for clients with no
//! loans. [`fold_clientes`] folds those rows back into an entity graph:
//! one `Cliente` per distinct identity, in first-seen order, each with
//! a fully materialized loan collection.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crediario_types::{Cliente, ClienteId, Emprestimo, EmprestimoCollection, EmprestimoId};
use rust_decimal::Decimal;

/// A row from a plain `clientes` query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClienteRow {
    /// `clientes.id`.
    pub id: i32,
    /// `clientes.nome`.
    pub nome: String,
    /// `clientes.cpf`.
    pub cpf: String,
}

impl ClienteRow {
    /// Materialize a client whose loan collection is not yet loaded.
    pub fn into_cliente(self) -> Cliente {
        Cliente::persisted(ClienteId::new(self.id), self.nome, self.cpf)
    }
}

/// A row from the joined client/loan query.
///
/// The loan columns are nullable: an outer join produces a single row
/// with `NULL` loan columns for a client that has no loans.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClienteEmprestimoRow {
    /// `clientes.id`.
    pub id: i32,
    /// `clientes.nome`.
    pub nome: String,
    /// `clientes.cpf`.
    pub cpf: String,
    /// `emprestimos.id`, `NULL` for the no-loans marker row.
    pub emprestimo_id: Option<i32>,
    /// `emprestimos.valor`.
    pub valor: Option<Decimal>,
    /// `emprestimos.parcelas`.
    pub parcelas: Option<i32>,
    /// `emprestimos.taxa_juros`.
    pub taxa_juros: Option<Decimal>,
    /// `emprestimos.cliente_id`.
    pub emprestimo_cliente_id: Option<i32>,
}

impl ClienteEmprestimoRow {
    /// Extract the loan portion of the row, if one is present.
    ///
    /// Guards against the `NULL` loan produced by an outer join when a
    /// client has no loans: the loan identity must be present and
    /// non-zero for the portion to count.
    fn emprestimo(&self) -> Option<Emprestimo> {
        let id = self.emprestimo_id.filter(|id| *id > 0)?;
        Some(Emprestimo {
            id: Some(EmprestimoId::new(id)),
            valor: self.valor?,
            parcelas: self.parcelas?,
            taxa_juros: self.taxa_juros?,
            cliente_id: ClienteId::new(self.emprestimo_cliente_id?),
        })
    }
}

/// Fold denormalized join rows into clients with materialized loans.
///
/// Rows are consumed in storage-returned order. The first row for a
/// client creates its entry with an empty (but loaded) collection;
/// every valid loan portion is appended to its owner. The result
/// preserves first-seen client order.
pub fn fold_clientes(rows: Vec<ClienteEmprestimoRow>) -> Vec<Cliente> {
    let mut clientes: Vec<Cliente> = Vec::new();
    let mut seen: HashMap<i32, usize> = HashMap::new();

    for row in rows {
        let emprestimo = row.emprestimo();

        let slot = match seen.entry(row.id) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let slot = clientes.len();
                entry.insert(slot);
                clientes.push(Cliente {
                    id: Some(ClienteId::new(row.id)),
                    nome: row.nome,
                    cpf: row.cpf,
                    emprestimos: EmprestimoCollection::Loaded(Vec::new()),
                });
                slot
            }
        };

        if let Some(emprestimo) = emprestimo
            && let Some(cliente) = clientes.get_mut(slot)
            && let EmprestimoCollection::Loaded(items) = &mut cliente.emprestimos
        {
            items.push(emprestimo);
        }
    }

    clientes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cliente: i32, emprestimo: Option<i32>) -> ClienteEmprestimoRow {
        ClienteEmprestimoRow {
            id: cliente,
            nome: format!("Cliente {cliente}"),
            cpf: "12345678900".to_owned(),
            emprestimo_id: emprestimo,
            valor: emprestimo.map(|_| Decimal::new(100_000, 2)),
            parcelas: emprestimo.map(|_| 12),
            taxa_juros: emprestimo.map(|_| Decimal::new(25, 1)),
            emprestimo_cliente_id: emprestimo.map(|_| cliente),
        }
    }

    #[test]
    fn fold_groups_loans_under_first_seen_client_order() {
        // [(C1,L1), (C1,L2), (C2,null)] must yield C1 with [L1, L2] and
        // C2 with an empty (but loaded) collection, in that order.
        let rows = vec![row(1, Some(1)), row(1, Some(2)), row(2, None)];

        let clientes = fold_clientes(rows);

        assert_eq!(clientes.len(), 2);
        let ids: Vec<Option<ClienteId>> = clientes.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![Some(ClienteId::new(1)), Some(ClienteId::new(2))]);

        let first = clientes.first().map(|c| c.emprestimos.loaded_len());
        assert_eq!(first, Some(Some(2)));

        let second = clientes.get(1).map(|c| &c.emprestimos);
        assert_eq!(second, Some(&EmprestimoCollection::Loaded(Vec::new())));
    }

    #[test]
    fn marker_row_yields_loaded_empty_collection_not_unloaded() {
        let clientes = fold_clientes(vec![row(7, None)]);
        let collection = clientes.first().map(|c| c.emprestimos.is_loaded());
        assert_eq!(collection, Some(true));
        assert_eq!(clientes.first().and_then(|c| c.emprestimos.loaded_len()), Some(0));
    }

    #[test]
    fn zero_loan_identity_is_treated_as_absent() {
        // Defensive guard: a zero ID cannot be a persisted loan.
        let clientes = fold_clientes(vec![row(1, Some(0))]);
        assert_eq!(clientes.first().and_then(|c| c.emprestimos.loaded_len()), Some(0));
    }

    #[test]
    fn interleaved_rows_keep_first_seen_order() {
        let rows = vec![row(2, Some(3)), row(1, Some(1)), row(2, None), row(1, Some(2))];

        let clientes = fold_clientes(rows);

        let ids: Vec<Option<ClienteId>> = clientes.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![Some(ClienteId::new(2)), Some(ClienteId::new(1))]);
        assert_eq!(clientes.first().and_then(|c| c.emprestimos.loaded_len()), Some(1));
        assert_eq!(clientes.get(1).and_then(|c| c.emprestimos.loaded_len()), Some(2));
    }
}
