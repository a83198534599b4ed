//! # Coupon Routes
//!
//! Public catalog plus merchant-only management.
//!
//! ```text
//! GET    /api/cupons?comercio_id=&categoria_id=   anyone
//! GET    /api/cupons/{id}                         anyone
//! POST   /api/cupons                              merchant
//! PATCH  /api/cupons/{id}                         owning merchant
//! PATCH  /api/cupons/{id}/status                  owning merchant
//! DELETE /api/cupons/{id}                         owning merchant
//! ```

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use cupons_core::coupon_code::{generate_coupon_code, is_coupon_code};
use cupons_core::document::strip_non_digits;
use cupons_core::validation::{apply_coupon_update, validate_coupon_form};
use cupons_core::window::today;
use cupons_core::{Coupon, CouponForm, CouponUpdate, CouponWithDetails, CoreError};
use cupons_db::CouponFilter;

use crate::auth::AuthSession;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::AppState;

/// Attempts at finding an unused coupon code before giving up.
const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Default, Deserialize)]
pub struct CouponQuery {
    pub comercio_id: Option<String>,
    pub categoria_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub ativo: bool,
}

/// `GET /api/cupons`
pub async fn list_coupons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CouponQuery>,
) -> ApiResult<Json<Vec<CouponWithDetails>>> {
    let filter = CouponFilter {
        merchant_id: query
            .comercio_id
            .map(|cnpj| strip_non_digits(&cnpj))
            .filter(|cnpj| !cnpj.is_empty()),
        category_id: query.categoria_id,
    };

    Ok(Json(state.db.coupons().list(&filter).await?))
}

/// `GET /api/cupons/{id}`
pub async fn get_coupon(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult<Json<CouponWithDetails>> {
    Ok(Json(load_details(&state, &code).await?))
}

/// `POST /api/cupons`
///
/// Codes are random; on the rare collision with an existing code a new
/// one is drawn, up to [`MAX_CODE_ATTEMPTS`] times.
pub async fn create_coupon(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    ApiJson(form): ApiJson<CouponForm>,
) -> ApiResult<(StatusCode, Json<CouponWithDetails>)> {
    let cnpj = session.require_merchant()?;
    let draft = validate_coupon_form(&form)?;
    let issued_on = today();

    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let coupon = draft
            .clone()
            .into_coupon(generate_coupon_code(), cnpj.to_string(), issued_on);

        match state.db.coupons().insert(&coupon).await {
            Ok(()) => {
                info!(code = %coupon.id, cnpj = %cnpj, "Coupon created");
                state.notifier.success("Cupom criado com sucesso!");
                let details = load_details(&state, &coupon.id).await?;
                return Ok((StatusCode::CREATED, Json(details)));
            }
            Err(e) if e.is_unique_violation() => {
                warn!(attempt, code = %coupon.id, "Coupon code already taken, drawing another");
            }
            Err(e) => {
                state.notifier.error("Erro ao criar cupom");
                return Err(e.into());
            }
        }
    }

    state.notifier.error("Erro ao criar cupom");
    Err(ApiError::internal("Não foi possível gerar um código de cupom"))
}

/// `PATCH /api/cupons/{id}`
pub async fn update_coupon(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(code): Path<String>,
    ApiJson(update): ApiJson<CouponUpdate>,
) -> ApiResult<Json<CouponWithDetails>> {
    let coupon = load_owned(&state, &session, &code).await?;
    let next = apply_coupon_update(&coupon, &update)?;

    state.db.coupons().update(&next).await?;
    info!(code = %code, "Coupon updated");
    state.notifier.success("Cupom atualizado com sucesso!");

    Ok(Json(load_details(&state, &code).await?))
}

/// `PATCH /api/cupons/{id}/status`
pub async fn set_coupon_status(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(code): Path<String>,
    ApiJson(body): ApiJson<StatusBody>,
) -> ApiResult<Json<CouponWithDetails>> {
    load_owned(&state, &session, &code).await?;

    state.db.coupons().set_active(&code, body.ativo).await?;
    info!(code = %code, active = body.ativo, "Coupon status changed");
    state.notifier.success(if body.ativo {
        "Cupom ativado"
    } else {
        "Cupom desativado"
    });

    Ok(Json(load_details(&state, &code).await?))
}

/// `DELETE /api/cupons/{id}`
///
/// Reservations of the coupon go with it.
pub async fn delete_coupon(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(code): Path<String>,
) -> ApiResult<StatusCode> {
    load_owned(&state, &session, &code).await?;

    state.db.coupons().delete(&code).await?;
    info!(code = %code, "Coupon deleted");
    state.notifier.success("Cupom excluído");

    Ok(StatusCode::NO_CONTENT)
}

/// Rejects path segments that cannot be a coupon code before they reach
/// the database.
pub(crate) fn check_code(code: &str) -> ApiResult<()> {
    if is_coupon_code(code) {
        Ok(())
    } else {
        Err(ApiError::validation(format!("Código de cupom inválido: {}", code)))
    }
}

async fn load_details(state: &AppState, code: &str) -> ApiResult<CouponWithDetails> {
    check_code(code)?;
    state
        .db
        .coupons()
        .get_with_details(code)
        .await?
        .ok_or_else(|| ApiError::from(CoreError::CouponNotFound(code.to_string())))
}

/// The coupon, if the session's merchant published it.
pub(crate) async fn load_owned(
    state: &AppState,
    session: &AuthSession,
    code: &str,
) -> ApiResult<Coupon> {
    let cnpj = session.require_merchant()?;
    check_code(code)?;

    let coupon = state
        .db
        .coupons()
        .get(code)
        .await?
        .ok_or_else(|| ApiError::from(CoreError::CouponNotFound(code.to_string())))?;

    if coupon.merchant_id != cnpj {
        return Err(ApiError::forbidden("Cupom pertence a outro comércio"));
    }

    Ok(coupon)
}
