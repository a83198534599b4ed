//! # cupons-db: Database Layer for the coupon platform
//!
//! SQLite storage for merchants, residents, coupons and reservations, using
//! sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cupons Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (POST /api/cupons/{id}/reservas)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     cupons-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (coupon.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CouponRepo    │    │ 001_initial_ │  │   │
//! │  │   │               │    │ ReservationR. │    │ schema.sql   │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ rows.rs                       │   │
//! │  │                                ▼                               │   │
//! │  │                 legacy columns ──► cupons_core types           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (./cupons.db)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`rows`] - Legacy-named row structs and their conversion to domain types
//! - [`repository`] - One repository per table
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cupons_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./cupons.db")).await?;
//!
//! let categories = db.categories().list().await?;
//! let coupon = db.coupons().get_with_details("ABCDEF123456").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod rows;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::category::CategoryRepository;
pub use repository::coupon::{CouponFilter, CouponRepository};
pub use repository::identity::{Identity, IdentityRepository};
pub use repository::merchant::MerchantRepository;
pub use repository::reservation::ReservationRepository;
pub use repository::resident::ResidentRepository;
