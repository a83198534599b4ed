//! # Reservation Routes
//!
//! ```text
//! Resident                                Merchant
//! ────────                                ────────
//! POST /api/cupons/{id}/reservas          GET  /api/cupons/{id}/reservas
//! GET  /api/cupons/{id}/reservas/minha    POST /api/reservas/{id}/uso
//! GET  /api/reservas
//! ```
//!
//! Rules are checked up front for a readable error; the database still
//! has the last word on duplicates and capacity.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use cupons_core::reservation::{check_redeemable, check_reservable};
use cupons_core::window::today;
use cupons_core::{CoreError, Reservation, ReservationWithCoupon, ReservationWithResident};

use crate::auth::AuthSession;
use crate::error::{ApiError, ApiResult};
use crate::routes::coupons::{check_code, load_owned};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MyReservationResponse {
    pub reservado: bool,
}

/// `GET /api/cupons/{id}/reservas`: who reserved the merchant's coupon.
pub async fn list_coupon_reservations(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(code): Path<String>,
) -> ApiResult<Json<Vec<ReservationWithResident>>> {
    load_owned(&state, &session, &code).await?;
    Ok(Json(state.db.reservations().list_by_coupon(&code).await?))
}

/// `GET /api/cupons/{id}/reservas/minha`
pub async fn my_reservation(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(code): Path<String>,
) -> ApiResult<Json<MyReservationResponse>> {
    let cpf = session.require_resident()?;
    check_code(&code)?;
    let reservado = state.db.reservations().exists(&code, cpf).await?;
    Ok(Json(MyReservationResponse { reservado }))
}

/// `POST /api/cupons/{id}/reservas`
pub async fn reserve_coupon(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(code): Path<String>,
) -> ApiResult<(StatusCode, Json<Reservation>)> {
    let cpf = session.require_resident()?;
    check_code(&code)?;

    let coupon = state
        .db
        .coupons()
        .get(&code)
        .await?
        .ok_or_else(|| ApiError::from(CoreError::CouponNotFound(code.clone())))?;

    let reservations = state.db.reservations();
    let count = reservations.count_for_coupon(&code).await?;
    let already_reserved = reservations.exists(&code, cpf).await?;

    if let Err(e) = check_reservable(&coupon, today(), count, already_reserved) {
        warn!(code = %code, cpf = %cpf, reason = %e, "Reservation refused");
        state.notifier.error("Erro ao reservar cupom");
        return Err(e.into());
    }

    let reservation = match reservations.insert(&code, cpf, today()).await {
        Ok(Some(reservation)) => reservation,
        // Another resident took the last unit after the check above
        Ok(None) => {
            state.notifier.error("Erro ao reservar cupom");
            return Err(CoreError::SoldOut {
                code,
                total: coupon.total_quantity.unwrap_or(count),
            }
            .into());
        }
        Err(e) if e.is_unique_violation() => {
            state.notifier.error("Erro ao reservar cupom");
            return Err(CoreError::AlreadyReserved(code).into());
        }
        Err(e) => return Err(e.into()),
    };

    info!(code = %code, cpf = %cpf, id = reservation.id, "Coupon reserved");
    state.notifier.success("Cupom reservado com sucesso!");

    Ok((StatusCode::CREATED, Json(reservation)))
}

/// `GET /api/reservas`: the resident's reservations, newest first.
pub async fn list_my_reservations(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
) -> ApiResult<Json<Vec<ReservationWithCoupon>>> {
    let cpf = session.require_resident()?;
    Ok(Json(state.db.reservations().list_by_resident(cpf).await?))
}

/// `POST /api/reservas/{id}/uso`: the coupon's merchant redeems a reservation.
pub async fn redeem_reservation(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<i64>,
) -> ApiResult<Json<Reservation>> {
    session.require_merchant()?;

    let reservations = state.db.reservations();
    let reservation = reservations
        .get(id)
        .await?
        .ok_or_else(|| ApiError::from(CoreError::ReservationNotFound(id)))?;

    load_owned(&state, &session, &reservation.coupon_id).await?;
    check_redeemable(&reservation)?;

    if !reservations.mark_used(id, today()).await? {
        // Redeemed concurrently between the read and the update
        let current = reservations
            .get(id)
            .await?
            .ok_or_else(|| ApiError::from(CoreError::ReservationNotFound(id)))?;
        check_redeemable(&current)?;
        return Err(ApiError::internal("Não foi possível registrar o uso da reserva"));
    }

    let redeemed = reservations
        .get(id)
        .await?
        .ok_or_else(|| ApiError::from(CoreError::ReservationNotFound(id)))?;

    info!(id, code = %redeemed.coupon_id, "Reservation redeemed");
    state.notifier.success("Uso do cupom registrado");

    Ok(Json(redeemed))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{day, TestApp, CNPJ, CPF, OTHER_CNPJ, OTHER_CPF};

    async fn reserve(app: &TestApp, token: &str, code: &str) -> (StatusCode, serde_json::Value) {
        app.send(
            Method::POST,
            &format!("/api/cupons/{code}/reservas"),
            Some(token),
            None,
        )
        .await
    }

    #[tokio::test]
    async fn test_reserve_once() {
        let app = TestApp::new().await;
        let merchant = app.merchant_token(CNPJ).await;
        let resident = app.resident_token(CPF).await;
        let code = app.create_coupon(&merchant, &day(-1), &day(1), None).await;

        let (status, body) = reserve(&app, &resident, &code).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["cupom_id"], code.as_str());
        assert_eq!(body["associado_id"], CPF);
        assert_eq!(body["data_reserva"], day(0));
        assert_eq!(body["usado"], false);

        let (status, body) = reserve(&app, &resident, &code).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");

        let (_, mine) = app
            .send(
                Method::GET,
                &format!("/api/cupons/{code}/reservas/minha"),
                Some(&resident),
                None,
            )
            .await;
        assert_eq!(mine["reservado"], true);
    }

    #[tokio::test]
    async fn test_reserve_rules() {
        let app = TestApp::new().await;
        let merchant = app.merchant_token(CNPJ).await;
        let resident = app.resident_token(CPF).await;

        let future = app.create_coupon(&merchant, &day(1), &day(10), None).await;
        let (status, body) = reserve(&app, &resident, &future).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "BUSINESS_LOGIC");

        let inactive = app.create_coupon(&merchant, &day(0), &day(10), None).await;
        app.send(
            Method::PATCH,
            &format!("/api/cupons/{inactive}/status"),
            Some(&merchant),
            Some(json!({ "ativo": false })),
        )
        .await;
        let (status, _) = reserve(&app, &resident, &inactive).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = reserve(&app, &resident, "ZZZZZZZZZZZZ").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = reserve(&app, &resident, "zzz").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = app
            .send(Method::GET, "/api/cupons/zzz/reservas/minha", Some(&resident), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = reserve(&app, &merchant, &inactive).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_reserve_sold_out() {
        let app = TestApp::new().await;
        let merchant = app.merchant_token(CNPJ).await;
        let first = app.resident_token(CPF).await;
        let second = app.resident_token(OTHER_CPF).await;
        let code = app.create_coupon(&merchant, &day(0), &day(0), Some(1)).await;

        let (status, _) = reserve(&app, &first, &code).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = reserve(&app, &second, &code).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["message"].as_str().unwrap().contains("esgotado"));

        let errors = app
            .notifier
            .sent()
            .into_iter()
            .filter(|n| n.message == "Erro ao reservar cupom")
            .count();
        assert_eq!(errors, 1);
    }

    #[tokio::test]
    async fn test_listings() {
        let app = TestApp::new().await;
        let owner = app.merchant_token(CNPJ).await;
        let other = app.merchant_token(OTHER_CNPJ).await;
        let resident = app.resident_token(CPF).await;
        let code = app.create_coupon(&owner, &day(0), &day(5), None).await;
        reserve(&app, &resident, &code).await;

        let uri = format!("/api/cupons/{code}/reservas");
        let (status, body) = app.send(Method::GET, &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["associado"]["nome"], "Maria Silva");

        let (status, _) = app.send(Method::GET, &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.send(Method::GET, "/api/reservas", Some(&resident), None).await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["cupom"]["id"], code.as_str());
        assert_eq!(list[0]["cupom"]["comercio"]["nome_fantasia"], "Pizza Boa");
        assert_eq!(list[0]["cupom"]["reservas"]["count"], 1);

        let (status, _) = app.send(Method::GET, "/api/reservas", Some(&owner), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_redeem_once_by_owner() {
        let app = TestApp::new().await;
        let owner = app.merchant_token(CNPJ).await;
        let other = app.merchant_token(OTHER_CNPJ).await;
        let resident = app.resident_token(CPF).await;
        let code = app.create_coupon(&owner, &day(0), &day(5), None).await;
        let (_, reservation) = reserve(&app, &resident, &code).await;
        let uri = format!("/api/reservas/{}/uso", reservation["id"]);

        let (status, _) = app.send(Method::POST, &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.send(Method::POST, &uri, Some(&resident), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.send(Method::POST, &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["usado"], true);
        assert_eq!(body["data_uso"], day(0));

        let (status, body) = app.send(Method::POST, &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["message"].as_str().unwrap().contains("já utilizada"));

        let (status, _) = app
            .send(Method::POST, "/api/reservas/9999/uso", Some(&owner), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
