//! Core entity structs with declarative validation.
//!
//! `Cliente` owns zero-or-more `Emprestimo`s. The relationship is
//! navigable from the client side only, and only once a loading strategy
//! has materialized the collection (see
//! [`EmprestimoCollection`](crate::collection::EmprestimoCollection)).
//!
//! Every constraint declared here is checked by the gateways before a
//! write reaches storage; referential integrity between the two tables
//! is the storage engine's responsibility.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::collection::EmprestimoCollection;
use crate::ids::{ClienteId, EmprestimoId};

/// CPF format: exactly 11 numeric digits, no punctuation.
static CPF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // the pattern is a compile-time literal
    Regex::new(r"^[0-9]{11}$").expect("CPF pattern is a valid regex")
});

/// A client who may hold loans.
///
/// `id` is `None` for entities not yet persisted; the insert assigns the
/// database-generated identity. The loan collection starts `Unloaded`
/// and is populated only by a loading strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Cliente {
    /// Database identity, absent until the entity is persisted.
    pub id: Option<ClienteId>,
    /// Full name, 3 to 100 characters.
    #[validate(length(min = 3, max = 100, message = "nome must be 3-100 characters"))]
    pub nome: String,
    /// National ID: exactly 11 numeric digits.
    #[validate(regex(path = *CPF_PATTERN, message = "cpf must be exactly 11 digits"))]
    pub cpf: String,
    /// Loans owned by this client; `null` in JSON until materialized.
    #[serde(default)]
    pub emprestimos: EmprestimoCollection,
}

impl Cliente {
    /// Build a transient (not yet persisted) client.
    pub const fn new(nome: String, cpf: String) -> Self {
        Self {
            id: None,
            nome,
            cpf,
            emprestimos: EmprestimoCollection::Unloaded,
        }
    }

    /// Build a client that already exists in storage.
    pub const fn persisted(id: ClienteId, nome: String, cpf: String) -> Self {
        Self {
            id: Some(id),
            nome,
            cpf,
            emprestimos: EmprestimoCollection::Unloaded,
        }
    }
}

/// A loan owned by exactly one client.
///
/// Carries only the owning client's ID, never a parent back-pointer, so
/// serialized entity graphs are cycle-free by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, sqlx::FromRow)]
pub struct Emprestimo {
    /// Database identity, absent until the entity is persisted.
    pub id: Option<EmprestimoId>,
    /// Principal amount: positive, at most 2 decimal places.
    #[validate(custom(function = validate_valor))]
    pub valor: Decimal,
    /// Installment count, 1 to 360.
    #[validate(range(min = 1, max = 360, message = "parcelas must be 1-360"))]
    pub parcelas: i32,
    /// Interest rate: 0.01 to 100, at most 2 decimal places.
    #[validate(custom(function = validate_taxa_juros))]
    pub taxa_juros: Decimal,
    /// Owning client identity (required foreign key).
    #[validate(custom(function = validate_cliente_id))]
    pub cliente_id: ClienteId,
}

impl Emprestimo {
    /// Build a transient (not yet persisted) loan for a client.
    pub const fn new(
        cliente_id: ClienteId,
        valor: Decimal,
        parcelas: i32,
        taxa_juros: Decimal,
    ) -> Self {
        Self {
            id: None,
            valor,
            parcelas,
            taxa_juros,
            cliente_id,
        }
    }
}

/// Principal must be strictly positive with currency precision (2 dp).
fn validate_valor(valor: &Decimal) -> Result<(), ValidationError> {
    if *valor <= Decimal::ZERO {
        return Err(ValidationError::new("valor_positive")
            .with_message("valor must be positive".into()));
    }
    if valor.normalize().scale() > 2 {
        return Err(ValidationError::new("valor_precision")
            .with_message("valor allows at most 2 decimal places".into()));
    }
    Ok(())
}

/// Interest rate must fall within 0.01 to 100 with 2 dp precision.
fn validate_taxa_juros(taxa: &Decimal) -> Result<(), ValidationError> {
    let min = Decimal::new(1, 2); // 0.01
    let max = Decimal::new(100, 0);
    if *taxa < min || *taxa > max {
        return Err(ValidationError::new("taxa_juros_range")
            .with_message("taxa_juros must be between 0.01 and 100".into()));
    }
    if taxa.normalize().scale() > 2 {
        return Err(ValidationError::new("taxa_juros_precision")
            .with_message("taxa_juros allows at most 2 decimal places".into()));
    }
    Ok(())
}

/// The owning client reference must be a plausible persisted identity.
fn validate_cliente_id(id: &ClienteId) -> Result<(), ValidationError> {
    if id.into_inner() < 1 {
        return Err(ValidationError::new("cliente_id_required")
            .with_message("cliente_id must reference an existing client".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_cliente() -> Cliente {
        Cliente::new("João da Silva".to_owned(), "12345678900".to_owned())
    }

    fn valid_emprestimo() -> Emprestimo {
        Emprestimo::new(
            ClienteId::new(1),
            Decimal::new(100_000, 2), // 1000.00
            12,
            Decimal::new(25, 1), // 2.5
        )
    }

    #[test]
    fn valid_entities_pass_validation() {
        assert!(valid_cliente().validate().is_ok());
        assert!(valid_emprestimo().validate().is_ok());
    }

    #[test]
    fn nome_shorter_than_three_chars_is_rejected() {
        let mut cliente = valid_cliente();
        cliente.nome = "Jo".to_owned();

        let errors = valid_or_errors(&cliente);
        assert!(errors.contains("nome"));
    }

    #[test]
    fn cpf_must_be_exactly_eleven_digits() {
        for bad in ["1234567890", "123456789001", "1234567890a", "123.456.789-00"] {
            let mut cliente = valid_cliente();
            cliente.cpf = bad.to_owned();
            assert!(valid_or_errors(&cliente).contains("cpf"), "accepted {bad}");
        }
    }

    #[test]
    fn parcelas_out_of_range_is_rejected_before_storage() {
        let mut emprestimo = valid_emprestimo();
        emprestimo.parcelas = 400;
        assert!(valid_or_errors(&emprestimo).contains("parcelas"));

        emprestimo.parcelas = 0;
        assert!(valid_or_errors(&emprestimo).contains("parcelas"));

        emprestimo.parcelas = 360;
        assert!(emprestimo.validate().is_ok());
    }

    #[test]
    fn valor_must_be_positive_currency() {
        let mut emprestimo = valid_emprestimo();
        emprestimo.valor = Decimal::ZERO;
        assert!(valid_or_errors(&emprestimo).contains("valor"));

        emprestimo.valor = Decimal::new(-500, 2);
        assert!(valid_or_errors(&emprestimo).contains("valor"));

        // Three decimal places exceed currency precision.
        emprestimo.valor = Decimal::new(1_000_005, 3);
        assert!(valid_or_errors(&emprestimo).contains("valor"));
    }

    #[test]
    fn taxa_juros_bounds_are_inclusive() {
        let mut emprestimo = valid_emprestimo();
        emprestimo.taxa_juros = Decimal::new(1, 2); // 0.01
        assert!(emprestimo.validate().is_ok());

        emprestimo.taxa_juros = Decimal::new(100, 0);
        assert!(emprestimo.validate().is_ok());

        emprestimo.taxa_juros = Decimal::ZERO;
        assert!(valid_or_errors(&emprestimo).contains("taxa_juros"));

        emprestimo.taxa_juros = Decimal::new(10_001, 2); // 100.01
        assert!(valid_or_errors(&emprestimo).contains("taxa_juros"));
    }

    #[test]
    fn cliente_id_must_reference_a_persisted_identity() {
        let mut emprestimo = valid_emprestimo();
        emprestimo.cliente_id = ClienteId::new(0);
        assert!(valid_or_errors(&emprestimo).contains("cliente_id"));
    }

    /// Render validation errors as a string naming the violated fields.
    fn valid_or_errors<T: Validate>(entity: &T) -> String {
        entity
            .validate()
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default()
    }
}
