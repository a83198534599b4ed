//! # Document Numbers
//!
//! Brazilian taxpayer documents: CPF (11 digits, a person) and CNPJ
//! (14 digits, an organization). Both end in two modulo-11 check digits.
//!
//! ## Check Digit Weights
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CPF   first digit   base 9   weights 10 9 8 7 6 5 4 3 2               │
//! │        second digit  base 10  weights 11 10 9 8 7 6 5 4 3 2            │
//! │                                                                         │
//! │  CNPJ  first digit   base 12  weights 5 4 3 2 9 8 7 6 5 4 3 2          │
//! │        second digit  base 13  weights 6 5 4 3 2 9 8 7 6 5 4 3 2        │
//! │                                                                         │
//! │  digit = 0 if sum % 11 < 2, else 11 - sum % 11                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Accounts are keyed by document, but the auth store wants an email, so
//! every document maps to a synthetic login id (`user<digits>@cupons.app`).

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::format::apply_mask;
use crate::SYNTHETIC_EMAIL_DOMAIN;

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;

const CPF_MASK: &str = "###.###.###-##";
const CNPJ_MASK: &str = "##.###.###/####-##";

// =============================================================================
// Free Functions
// =============================================================================

/// Removes every character that is not an ASCII digit.
///
/// Idempotent: stripping an already-stripped string returns it unchanged.
pub fn strip_non_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validates a CPF, formatted or not.
///
/// ## Example
/// ```rust
/// use cupons_core::document::validate_cpf;
///
/// assert!(validate_cpf("11144477735"));
/// assert!(validate_cpf("111.444.777-35"));
/// assert!(!validate_cpf("11144477736"));
/// assert!(!validate_cpf("00000000000"));
/// ```
pub fn validate_cpf(input: &str) -> bool {
    let Some(digits) = checked_digits(input, CPF_LEN) else {
        return false;
    };

    let first = mod11_check_digit(&digits[..9], cpf_weight);
    if first != digits[9] {
        return false;
    }

    mod11_check_digit(&digits[..10], cpf_weight) == digits[10]
}

/// Validates a CNPJ, formatted or not.
///
/// ## Example
/// ```rust
/// use cupons_core::document::validate_cnpj;
///
/// assert!(validate_cnpj("11.222.333/0001-81"));
/// assert!(!validate_cnpj("11222333000182"));
/// ```
pub fn validate_cnpj(input: &str) -> bool {
    let Some(digits) = checked_digits(input, CNPJ_LEN) else {
        return false;
    };

    let first = mod11_check_digit(&digits[..12], cnpj_weight);
    if first != digits[12] {
        return false;
    }

    mod11_check_digit(&digits[..13], cnpj_weight) == digits[13]
}

/// Formats digits as `###.###.###-##`.
///
/// Input shorter than 11 digits comes back as its bare digits.
pub fn format_cpf(input: &str) -> String {
    apply_mask(&strip_non_digits(input), CPF_MASK)
}

/// Formats digits as `##.###.###/####-##`.
///
/// Input shorter than 14 digits comes back as its bare digits.
pub fn format_cnpj(input: &str) -> String {
    apply_mask(&strip_non_digits(input), CNPJ_MASK)
}

/// Derives the synthetic login id for a document.
///
/// ## Example
/// ```rust
/// use cupons_core::document::document_to_synthetic_email;
///
/// assert_eq!(
///     document_to_synthetic_email("11.222.333/0001-81"),
///     "user11222333000181@cupons.app"
/// );
/// ```
pub fn document_to_synthetic_email(document: &str) -> String {
    format!(
        "user{}@{}",
        strip_non_digits(document),
        SYNTHETIC_EMAIL_DOMAIN
    )
}

// =============================================================================
// Check Digit Arithmetic
// =============================================================================

/// Strips the input and returns its digit values if the length matches and
/// the digits are not all the same.
fn checked_digits(input: &str, len: usize) -> Option<Vec<u32>> {
    let digits: Vec<u32> = input.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != len {
        return None;
    }

    // 000.000.000-00, 111.111.111-11, ... pass the arithmetic but are invalid
    if digits.iter().all(|&d| d == digits[0]) {
        return None;
    }

    Some(digits)
}

/// CPF weight for position `i` over a base of `n` digits: `n + 1 - i`.
fn cpf_weight(i: usize, n: usize) -> u32 {
    (n + 1 - i) as u32
}

/// CNPJ weight for position `i` over a base of `n` digits.
///
/// Counting from the right the weights run 2..=9 and wrap back to 2, which
/// is the same sequence as starting at `n - 7` and resetting to 9 whenever
/// the weight would drop below 2.
fn cnpj_weight(i: usize, n: usize) -> u32 {
    2 + ((n - 1 - i) % 8) as u32
}

fn mod11_check_digit(base: &[u32], weight: fn(usize, usize) -> u32) -> u32 {
    let n = base.len();
    let sum: u32 = base
        .iter()
        .enumerate()
        .map(|(i, &d)| d * weight(i, n))
        .sum();

    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

// =============================================================================
// Typed Document Number
// =============================================================================

/// Which document a number is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentKind {
    /// Individual taxpayer (residents).
    Cpf,
    /// Organization taxpayer (merchants).
    Cnpj,
}

impl DocumentKind {
    /// Number of digits, check digits included.
    pub const fn digit_count(&self) -> usize {
        match self {
            DocumentKind::Cpf => CPF_LEN,
            DocumentKind::Cnpj => CNPJ_LEN,
        }
    }

    /// Display label.
    pub const fn label(&self) -> &'static str {
        match self {
            DocumentKind::Cpf => "CPF",
            DocumentKind::Cnpj => "CNPJ",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A document number whose check digits have been verified.
///
/// Holds bare digits only; formatting is applied on display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentNumber {
    kind: DocumentKind,
    digits: String,
}

impl DocumentNumber {
    /// Parses and validates a CPF.
    pub fn parse_cpf(input: &str) -> Result<Self, ValidationError> {
        Self::parse(DocumentKind::Cpf, "cpf", input)
    }

    /// Parses and validates a CNPJ.
    pub fn parse_cnpj(input: &str) -> Result<Self, ValidationError> {
        Self::parse(DocumentKind::Cnpj, "cnpj", input)
    }

    fn parse(kind: DocumentKind, field: &str, input: &str) -> Result<Self, ValidationError> {
        let digits = strip_non_digits(input);
        if digits.is_empty() {
            return Err(ValidationError::required(field));
        }

        let valid = match kind {
            DocumentKind::Cpf => validate_cpf(&digits),
            DocumentKind::Cnpj => validate_cnpj(&digits),
        };
        if !valid {
            return Err(ValidationError::InvalidDocument {
                field: field.to_string(),
                kind: kind.label().to_string(),
            });
        }

        Ok(DocumentNumber { kind, digits })
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Bare digits, as stored.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Masked form for display.
    pub fn formatted(&self) -> String {
        match self.kind {
            DocumentKind::Cpf => format_cpf(&self.digits),
            DocumentKind::Cnpj => format_cnpj(&self.digits),
        }
    }

    pub fn synthetic_email(&self) -> String {
        document_to_synthetic_email(&self.digits)
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
