//! # cupons-core: Pure Logic for the Coupon Platform
//!
//! Merchants (`comercio`) publish discount coupons, residents (`associado`)
//! reserve them and merchants later mark a reservation as used. This crate
//! holds every piece of that system that can be expressed without I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cupons Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web frontend                                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON / HTTP                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    cupons-api (axum)                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cupons-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌─────────────┐ ┌──────────────┐   │   │
//! │  │   │ document │ │  format  │ │ coupon_code │ │    window    │   │   │
//! │  │   │ CPF/CNPJ │ │  masks   │ │  12 chars   │ │ start..=end  │   │   │
//! │  │   └──────────┘ └──────────┘ └─────────────┘ └──────────────┘   │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌─────────────┐ ┌──────────────┐   │   │
//! │  │   │ discount │ │  types   │ │ validation  │ │ reservation  │   │   │
//! │  │   └──────────┘ └──────────┘ └─────────────┘ └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    cupons-db (Database Layer)                   │   │
//! │  │              legacy schema rows, repositories                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`document`] - CPF/CNPJ validation, masks, synthetic login ids
//! - [`format`] - Phone, postal code, percentage and date display
//! - [`coupon_code`] - Random coupon identifiers
//! - [`window`] - Inclusive date-window checks
//! - [`discount`] - Whole-percent ⇄ stored-fraction conversion
//! - [`types`] - Application-facing records and form bodies
//! - [`validation`] - Form validation
//! - [`reservation`] - Reserve / redeem rules
//! - [`notify`] - User-facing notification seam
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cupons_core::document::{document_to_synthetic_email, validate_cpf};
//!
//! assert!(validate_cpf("111.444.777-35"));
//! assert_eq!(
//!     document_to_synthetic_email("111.444.777-35"),
//!     "user11144477735@cupons.app"
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coupon_code;
pub mod discount;
pub mod document;
pub mod error;
pub mod format;
pub mod notify;
pub mod reservation;
pub mod types;
pub mod validation;
pub mod window;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use discount::DiscountPercent;
pub use document::{DocumentKind, DocumentNumber};
pub use error::{CoreError, CoreResult, ValidationError};
pub use notify::{Notification, NotificationVariant, Notifier, RecordingNotifier};
pub use types::*;
pub use window::DateWindow;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Domain used for synthetic login identifiers.
///
/// The auth store requires an email-shaped username; nobody receives mail
/// at this domain.
pub const SYNTHETIC_EMAIL_DOMAIN: &str = "cupons.app";

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum coupon title length.
pub const MAX_COUPON_TITLE_LEN: usize = 200;
