//! # Validation Module
//!
//! Turns request bodies into validated inputs before anything is written.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                     │
//! │  ├── Masks and required markers                                        │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API handler (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: required fields, check digits, ranges, dates         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── PRIMARY KEY on cnpj / cpf / coupon code                           │
//! │  ├── UNIQUE (coupon, resident) reservations                            │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Blank optional strings are treated as absent, matching how the web forms
//! submit untouched inputs.

use chrono::NaiveDate;

use crate::discount::DiscountPercent;
use crate::document::{strip_non_digits, DocumentKind, DocumentNumber};
use crate::error::ValidationError;
use crate::types::{
    Coupon, CouponDraft, CouponForm, CouponUpdate, LoginRequest, MerchantRegistration,
    NewMerchant, NewResident, ResidentRegistration, UserKind,
};
use crate::window::{parse_calendar_date, DateWindow};
use crate::{MAX_COUPON_TITLE_LEN, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Helpers
// =============================================================================

/// Trims `value` and rejects it when empty.
pub fn required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value.to_string())
}

/// Trims an optional string, mapping blank to `None`.
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates a password's length.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("senha"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "senha".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Validates a state abbreviation (`SP`, `rj`, ...), returning it uppercased.
pub fn validate_uf(uf: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(uf) = optional(uf) else {
        return Ok(None);
    };

    if uf.chars().count() != 2 || !uf.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::invalid_format("uf", "deve ter duas letras"));
    }

    Ok(Some(uf.to_ascii_uppercase()))
}

/// Parses an optional date field.
fn optional_date(field: &str, value: Option<&str>) -> ValidationResult<Option<NaiveDate>> {
    match optional(value) {
        None => Ok(None),
        Some(raw) => parse_calendar_date(&raw)
            .map(Some)
            .ok_or_else(|| ValidationError::invalid_format(field, "esperado AAAA-MM-DD")),
    }
}

fn validate_total_quantity(total: Option<i64>) -> ValidationResult<Option<i64>> {
    match total {
        Some(n) if n <= 0 => Err(ValidationError::OutOfRange {
            field: "quantidadeTotal".to_string(),
            min: 1,
            max: i64::MAX,
        }),
        other => Ok(other),
    }
}

fn validate_title(title: &str) -> ValidationResult<String> {
    let title = required("titulo", title)?;
    if title.chars().count() > MAX_COUPON_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "titulo".to_string(),
            max: MAX_COUPON_TITLE_LEN,
        });
    }
    Ok(title)
}

/// Coupons must grant some discount.
fn validate_discount(percent: i64) -> ValidationResult<DiscountPercent> {
    let discount = DiscountPercent::new(percent)?;
    if discount.is_zero() {
        return Err(ValidationError::OutOfRange {
            field: "percentualDesconto".to_string(),
            min: 1,
            max: i64::from(DiscountPercent::MAX),
        });
    }
    Ok(discount)
}

fn ensure_ordered(window: &DateWindow) -> ValidationResult<()> {
    if window.is_inverted() {
        return Err(ValidationError::InvertedRange {
            start_field: "dataInicio".to_string(),
            end_field: "dataFim".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Registration
// =============================================================================

/// Validates a merchant sign-up.
///
/// ## Example
/// ```rust
/// use cupons_core::types::MerchantRegistration;
/// use cupons_core::validation::validate_merchant_registration;
///
/// let form = MerchantRegistration {
///     cnpj: "11.222.333/0001-81".into(),
///     legal_name: "Pizzaria Ltda".into(),
///     trade_name: "Pizza Boa".into(),
///     category_id: Some(1),
///     email: "contato@pizzaboa.com".into(),
///     password: "segredo".into(),
///     ..Default::default()
/// };
/// let merchant = validate_merchant_registration(&form).unwrap();
/// assert_eq!(merchant.cnpj.digits(), "11222333000181");
/// ```
pub fn validate_merchant_registration(form: &MerchantRegistration) -> ValidationResult<NewMerchant> {
    let cnpj = DocumentNumber::parse_cnpj(&form.cnpj)?;
    let legal_name = required("razaoSocial", &form.legal_name)?;
    let trade_name = required("nomeFantasia", &form.trade_name)?;
    let category_id = form
        .category_id
        .ok_or_else(|| ValidationError::required("categoriaId"))?;
    let email = required("email", &form.email)?;
    validate_password(&form.password)?;

    Ok(NewMerchant {
        cnpj,
        legal_name,
        trade_name,
        category_id,
        address: optional(form.address.as_deref()),
        district: optional(form.district.as_deref()),
        postal_code: optional(form.postal_code.as_deref()).map(|c| strip_non_digits(&c)),
        city: optional(form.city.as_deref()),
        state: validate_uf(form.state.as_deref())?,
        phone: optional(form.phone.as_deref()).map(|p| strip_non_digits(&p)),
        email,
    })
}

/// Validates a resident sign-up.
pub fn validate_resident_registration(form: &ResidentRegistration) -> ValidationResult<NewResident> {
    let cpf = DocumentNumber::parse_cpf(&form.cpf)?;
    let name = required("nome", &form.name)?;
    let email = required("email", &form.email)?;
    validate_password(&form.password)?;

    Ok(NewResident {
        cpf,
        name,
        birth_date: optional_date("dataNascimento", form.birth_date.as_deref())?,
        address: optional(form.address.as_deref()),
        district: optional(form.district.as_deref()),
        postal_code: optional(form.postal_code.as_deref()).map(|c| strip_non_digits(&c)),
        city: optional(form.city.as_deref()),
        state: validate_uf(form.state.as_deref())?,
        mobile: optional(form.mobile.as_deref()).map(|m| strip_non_digits(&m)),
        email,
    })
}

/// Validates a login form, returning the document digits and account kind.
///
/// The document is not checksum-validated here: a wrong document simply
/// fails to authenticate. Without `tipo`, a 14-digit document logs in as a
/// merchant and anything else as a resident.
pub fn validate_login(form: &LoginRequest) -> ValidationResult<(String, UserKind)> {
    let digits = strip_non_digits(&form.document);
    if digits.is_empty() {
        return Err(ValidationError::required("documento"));
    }
    if form.password.is_empty() {
        return Err(ValidationError::required("senha"));
    }
    let kind = form.kind.unwrap_or(if digits.len() == DocumentKind::Cnpj.digit_count() {
        UserKind::Merchant
    } else {
        UserKind::Resident
    });
    Ok((digits, kind))
}

// =============================================================================
// Coupons
// =============================================================================

/// Validates a coupon creation form.
pub fn validate_coupon_form(form: &CouponForm) -> ValidationResult<CouponDraft> {
    let title = validate_title(&form.title)?;
    let discount = validate_discount(form.discount)?;
    let window = DateWindow::parse(&form.start_date, &form.end_date)?;
    ensure_ordered(&window)?;

    Ok(CouponDraft {
        title,
        description: optional(form.description.as_deref()),
        category_id: form.category_id,
        discount,
        window,
        total_quantity: validate_total_quantity(form.total_quantity)?,
    })
}

/// Applies a partial update to an existing coupon.
///
/// The resulting window is checked as a whole, so moving only `dataFim`
/// before the stored `dataInicio` is rejected.
pub fn apply_coupon_update(current: &Coupon, update: &CouponUpdate) -> ValidationResult<Coupon> {
    let mut next = current.clone();

    if let Some(title) = &update.title {
        next.title = validate_title(title)?;
    }
    if let Some(description) = &update.description {
        next.description = optional(Some(description));
    }
    if let Some(category_id) = update.category_id {
        next.category_id = category_id;
    }
    if let Some(discount) = update.discount {
        next.discount = validate_discount(discount)?;
    }
    if let Some(start) = optional_date("dataInicio", update.start_date.as_deref())? {
        next.start_date = start;
    }
    if let Some(end) = optional_date("dataFim", update.end_date.as_deref())? {
        next.end_date = end;
    }
    if let Some(total) = update.total_quantity {
        next.total_quantity = validate_total_quantity(total)?;
    }

    ensure_ordered(&next.window())?;
    Ok(next)
}

// =============================================================================
// Unit Tests
// =============================================================================
