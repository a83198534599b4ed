//! HTTP route handlers, one module per resource.

pub mod auth;
pub mod categories;
pub mod coupons;
pub mod health;
pub mod reservations;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::AppState;

/// All routes, still waiting for their state.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/auth/cadastro-comercio",
            post(auth::register_merchant),
        )
        .route("/api/auth/cadastro-morador", post(auth::register_resident))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/perfil", get(auth::profile))
        .route("/api/categorias", get(categories::list_categories))
        .route(
            "/api/cupons",
            get(coupons::list_coupons).post(coupons::create_coupon),
        )
        .route(
            "/api/cupons/{id}",
            get(coupons::get_coupon)
                .patch(coupons::update_coupon)
                .delete(coupons::delete_coupon),
        )
        .route("/api/cupons/{id}/status", patch(coupons::set_coupon_status))
        .route(
            "/api/cupons/{id}/reservas",
            get(reservations::list_coupon_reservations).post(reservations::reserve_coupon),
        )
        .route(
            "/api/cupons/{id}/reservas/minha",
            get(reservations::my_reservation),
        )
        .route("/api/reservas", get(reservations::list_my_reservations))
        .route("/api/reservas/{id}/uso", post(reservations::redeem_reservation))
}
