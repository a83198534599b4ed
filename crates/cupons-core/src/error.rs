//! # Error Types
//!
//! Domain-specific error types for cupons-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cupons-core errors (this file)                                        │
//! │  ├── CoreError        - Reservation / coupon rule violations           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cupons-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  cupons-api errors                                                     │
//! │  └── ApiError         - What the frontend sees (JSON)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Document validators themselves return `bool`; `ValidationError` is only
//! produced where a caller needs to say *which* field failed.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Coupon cannot be found.
    #[error("Cupom não encontrado: {0}")]
    CouponNotFound(String),

    /// Reservation cannot be found.
    #[error("Reserva não encontrada: {0}")]
    ReservationNotFound(i64),

    /// Coupon has been deactivated by its merchant.
    #[error("Cupom {0} não está ativo")]
    CouponInactive(String),

    /// Today is outside the coupon's validity window.
    #[error("Cupom {code} válido apenas de {start} a {end}")]
    OutsideWindow {
        code: String,
        start: String,
        end: String,
    },

    /// The resident already holds a reservation for this coupon.
    #[error("Cupom {0} já reservado por este morador")]
    AlreadyReserved(String),

    /// Every available unit of the coupon has been reserved.
    #[error("Cupom {code} esgotado ({total} reservados)")]
    SoldOut { code: String, total: i64 },

    /// The reservation was already redeemed.
    ///
    /// ## User Workflow
    /// ```text
    /// Merchant scans reservation #42
    ///      │
    ///      ▼
    /// data_uso already set (2024-06-15)
    ///      │
    ///      ▼
    /// AlreadyRedeemed { id: 42, used_on: "2024-06-15" }
    /// ```
    #[error("Reserva {id} já utilizada em {used_on}")]
    AlreadyRedeemed { id: i64, used_on: String },

    /// The document is already tied to an account.
    #[error("{kind} {document} já cadastrado")]
    DocumentAlreadyRegistered { kind: String, document: String },

    /// Validation error (wraps ValidationError).
    #[error("Erro de validação: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any write happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} é obrigatório")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} deve ter pelo menos {min} caracteres")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} deve ter no máximo {max} caracteres")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} deve estar entre {min} e {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., unparseable date, wrong UF).
    #[error("{field} em formato inválido: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// CPF or CNPJ failed its check digits.
    #[error("{field} não é um {kind} válido")]
    InvalidDocument { field: String, kind: String },

    /// Date range is inverted.
    #[error("{start_field} não pode ser posterior a {end_field}")]
    InvertedRange {
        start_field: String,
        end_field: String,
    },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::AlreadyRedeemed {
            id: 42,
            used_on: "2024-06-15".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Reserva 42 já utilizada em 2024-06-15"
        );

        let err = CoreError::SoldOut {
            code: "ABCDEF123456".to_string(),
            total: 10,
        };
        assert_eq!(
            err.to_string(),
            "Cupom ABCDEF123456 esgotado (10 reservados)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("cnpj");
        assert_eq!(err.to_string(), "cnpj é obrigatório");

        let err = ValidationError::InvalidDocument {
            field: "cpf".to_string(),
            kind: "CPF".to_string(),
        };
        assert_eq!(err.to_string(), "cpf não é um CPF válido");

        let err = ValidationError::InvertedRange {
            start_field: "dataInicio".to_string(),
            end_field: "dataFim".to_string(),
        };
        assert_eq!(err.to_string(), "dataInicio não pode ser posterior a dataFim");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("senha").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
