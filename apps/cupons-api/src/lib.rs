//! # Cupons API
//!
//! JSON-over-HTTP server for the coupon platform.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cupons API Server                               │
//! │                                                                         │
//! │  Browser ───► HTTP (3000) ───► axum Router ───► cupons-db ───► SQLite  │
//! │                                    │                                    │
//! │                          ┌─────────┴─────────┐                          │
//! │                          ▼                   ▼                          │
//! │                     AuthSession         cupons-core                     │
//! │                     (JWT bearer)     (validation, rules)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Routes
//! ```text
//! GET    /health
//! POST   /api/auth/cadastro-comercio      POST /api/auth/cadastro-morador
//! POST   /api/auth/login                  POST /api/auth/logout
//! GET    /api/perfil                      GET  /api/categorias
//! GET    /api/cupons                      POST /api/cupons
//! GET    /api/cupons/{id}                 PATCH/DELETE /api/cupons/{id}
//! PATCH  /api/cupons/{id}/status
//! GET    /api/cupons/{id}/reservas        POST /api/cupons/{id}/reservas
//! GET    /api/cupons/{id}/reservas/minha
//! GET    /api/reservas                    POST /api/reservas/{id}/uso
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_HOST` - Interface to bind (default: 0.0.0.0)
//! - `HTTP_PORT` - HTTP port (default: 3000)
//! - `DATABASE_PATH` - SQLite file (default: ./cupons.db)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 3600)
//! - `CORS_ALLOW_ORIGIN` - Frontend origin allowed by CORS (optional)
//! - `RUST_LOG` - Log filter (default: info)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod notify;
pub mod routes;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use cupons_core::Notifier;
use cupons_db::Database;

// Re-exports
pub use auth::{AuthSession, JwtManager};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use extract::ApiJson;
pub use notify::TracingNotifier;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
    pub jwt: JwtManager,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig, notifier: Arc<dyn Notifier>) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_access_lifetime_secs);
        AppState {
            db,
            config,
            jwt,
            notifier,
        }
    }
}

/// Builds the application router with request tracing and, when an origin
/// is configured, CORS.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = state.config.cors_allow_origin.clone().map(|origin| {
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    });

    let router = routes::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}
