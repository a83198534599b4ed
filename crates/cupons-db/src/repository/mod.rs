//! # Repository Module
//!
//! One repository per table. Each holds a pool clone, so they are cheap to
//! create per request.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handler                                                               │
//! │     │  db.reservations().insert("ABCDEF123456", "11144477735", today)  │
//! │     ▼                                                                   │
//! │  ReservationRepository ── SQL ──► cupom_associado                      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  ReservationRow ── From ──► cupons_core::Reservation                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - `categoria`
//! - [`MerchantRepository`](merchant::MerchantRepository) - `comercio`
//! - [`ResidentRepository`](resident::ResidentRepository) - `associado`
//! - [`CouponRepository`](coupon::CouponRepository) - `cupom`
//! - [`ReservationRepository`](reservation::ReservationRepository) - `cupom_associado`
//! - [`IdentityRepository`](identity::IdentityRepository) - `auth_users`

pub mod category;
pub mod coupon;
pub mod identity;
pub mod merchant;
pub mod reservation;
pub mod resident;
