//! # Account Routes
//!
//! Sign-up, login and profile.
//!
//! ## Sign-up Flow
//! ```text
//! form ──validate──► document free? ──► identity (synthetic email, argon2)
//!                          │                    │
//!                          ▼ no                 ▼
//!                         409            insert profile ──fails──► delete identity
//!                                               │
//!                                               ▼
//!                                      201 { success, message, userId }
//! ```
//!
//! Logins use the document, never the contact email: the identity's email
//! is `user{digits}@cupons.app`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use cupons_core::document::document_to_synthetic_email;
use cupons_core::validation::{
    validate_login, validate_merchant_registration, validate_resident_registration,
};
use cupons_core::{
    CoreError, DocumentNumber, LoginRequest, MerchantRegistration, Profile, ResidentRegistration,
    UserKind,
};
use cupons_db::{DbError, Identity};

use crate::auth::{hash_password_blocking, verify_password_blocking, AuthSession};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub tipo: UserKind,
    pub perfil: Profile,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub tipo: UserKind,
    pub perfil: Profile,
}

// =============================================================================
// Sign-up
// =============================================================================

/// `POST /api/auth/cadastro-comercio`
pub async fn register_merchant(
    State(state): State<Arc<AppState>>,
    ApiJson(form): ApiJson<MerchantRegistration>,
) -> ApiResult<(StatusCode, Json<RegistrationResponse>)> {
    let merchant = validate_merchant_registration(&form)?;

    if state.db.merchants().exists(merchant.cnpj.digits()).await? {
        return Err(already_registered(&merchant.cnpj));
    }

    let metadata = json!({
        "tipo": UserKind::Merchant,
        "cnpj": merchant.cnpj.digits(),
        "razaoSocial": merchant.legal_name,
    });
    let identity = create_identity(&state, &merchant.cnpj, form.password, metadata).await?;

    if let Err(e) = state.db.merchants().insert(&merchant, &identity.id).await {
        rollback_identity(&state, &identity).await;
        return Err(profile_insert_error(e, &merchant.cnpj));
    }

    info!(cnpj = %merchant.cnpj.digits(), user_id = %identity.id, "Merchant registered");
    state.notifier.success("Comércio cadastrado com sucesso!");

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            success: true,
            message: "Cadastro realizado com sucesso! Faça login com seu CNPJ.".to_string(),
            user_id: identity.id,
        }),
    ))
}

/// `POST /api/auth/cadastro-morador`
pub async fn register_resident(
    State(state): State<Arc<AppState>>,
    ApiJson(form): ApiJson<ResidentRegistration>,
) -> ApiResult<(StatusCode, Json<RegistrationResponse>)> {
    let resident = validate_resident_registration(&form)?;

    if state.db.residents().exists(resident.cpf.digits()).await? {
        return Err(already_registered(&resident.cpf));
    }

    let metadata = json!({
        "tipo": UserKind::Resident,
        "cpf": resident.cpf.digits(),
        "nome": resident.name,
    });
    let identity = create_identity(&state, &resident.cpf, form.password, metadata).await?;

    if let Err(e) = state.db.residents().insert(&resident, &identity.id).await {
        rollback_identity(&state, &identity).await;
        return Err(profile_insert_error(e, &resident.cpf));
    }

    info!(cpf = %resident.cpf.digits(), user_id = %identity.id, "Resident registered");
    state.notifier.success("Cadastro de morador realizado com sucesso!");

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            success: true,
            message: "Cadastro realizado com sucesso! Faça login com seu CPF.".to_string(),
            user_id: identity.id,
        }),
    ))
}

fn already_registered(document: &DocumentNumber) -> ApiError {
    CoreError::DocumentAlreadyRegistered {
        kind: document.kind().label().to_string(),
        document: document.formatted(),
    }
    .into()
}

async fn create_identity(
    state: &AppState,
    document: &DocumentNumber,
    password: String,
    metadata: serde_json::Value,
) -> ApiResult<Identity> {
    let hash = hash_password_blocking(password).await?;

    match state
        .db
        .identities()
        .insert(&document.synthetic_email(), &hash, &metadata)
        .await
    {
        Ok(identity) => Ok(identity),
        // A leftover identity without a profile still blocks the document
        Err(e) if e.is_unique_violation() => Err(already_registered(document)),
        Err(e) => Err(e.into()),
    }
}

async fn rollback_identity(state: &AppState, identity: &Identity) {
    warn!(user_id = %identity.id, "Profile insert failed, deleting identity");

    if let Err(e) = state.db.identities().delete(&identity.id).await {
        error!(user_id = %identity.id, error = %e, "Failed to delete orphaned identity");
    }
}

fn profile_insert_error(err: DbError, document: &DocumentNumber) -> ApiError {
    if err.is_unique_violation() {
        already_registered(document)
    } else {
        err.into()
    }
}

// =============================================================================
// Session
// =============================================================================

/// `POST /api/auth/login`
///
/// Unknown document and wrong password are indistinguishable (401).
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(form): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (digits, kind) = validate_login(&form)?;
    let email = document_to_synthetic_email(&digits);

    let identity = state
        .db
        .identities()
        .get_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_ok =
        verify_password_blocking(form.password, identity.password_hash.clone()).await?;
    if !password_ok {
        warn!(email = %email, "Login with wrong password");
        return Err(invalid_credentials());
    }

    let perfil = load_profile(&state, &identity.id, kind)
        .await?
        .ok_or_else(|| match kind {
            UserKind::Merchant => ApiError::unauthorized("Usuário não é um comerciante"),
            UserKind::Resident => ApiError::unauthorized("Usuário não é um morador"),
        })?;

    let token = state
        .jwt
        .generate_access_token(&identity.id, kind, perfil.document())?;

    info!(user_id = %identity.id, kind = kind.as_str(), "Login");

    Ok(Json(LoginResponse {
        success: true,
        token,
        token_type: "Bearer",
        expires_in: state.jwt.access_lifetime_secs(),
        tipo: kind,
        perfil,
    }))
}

/// `POST /api/auth/logout`
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout(session: AuthSession) -> Json<serde_json::Value> {
    info!(user_id = %session.claims.sub, "Logout");
    Json(json!({ "success": true }))
}

/// `GET /api/perfil`
pub async fn profile(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
) -> ApiResult<Json<ProfileResponse>> {
    let kind = session.claims.kind;
    let perfil = load_profile(&state, &session.claims.sub, kind)
        .await?
        .ok_or_else(|| ApiError::not_found("Perfil", &session.claims.document))?;

    Ok(Json(ProfileResponse { tipo: kind, perfil }))
}

async fn load_profile(
    state: &AppState,
    auth_user_id: &str,
    kind: UserKind,
) -> ApiResult<Option<Profile>> {
    let profile = match kind {
        UserKind::Merchant => state
            .db
            .merchants()
            .get_by_auth_user(auth_user_id)
            .await?
            .map(Profile::Merchant),
        UserKind::Resident => state
            .db
            .residents()
            .get_by_auth_user(auth_user_id)
            .await?
            .map(Profile::Resident),
    };
    Ok(profile)
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Credenciais inválidas")
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{TestApp, CNPJ, CPF, PASSWORD};
    use cupons_core::NotificationVariant;

    #[tokio::test]
    async fn test_register_merchant() {
        let app = TestApp::new().await;

        let (status, body) = app.register_merchant("11.222.333/0001-81").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["message"],
            "Cadastro realizado com sucesso! Faça login com seu CNPJ."
        );

        let identity = app
            .state
            .db
            .identities()
            .get_by_email("user11222333000181@cupons.app")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(body["userId"], identity.id.as_str());
        assert_eq!(identity.metadata["cnpj"], CNPJ);
        assert_eq!(identity.metadata["tipo"], "comerciante");

        let merchant = app.state.db.merchants().get_by_cnpj(CNPJ).await.unwrap().unwrap();
        assert_eq!(merchant.phone.as_deref(), Some("11987654321"));
        assert_eq!(merchant.state.as_deref(), Some("SP"));

        let sent = app.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].variant, NotificationVariant::Success);
    }

    #[tokio::test]
    async fn test_register_duplicate_document() {
        let app = TestApp::new().await;
        app.register_merchant(CNPJ).await;

        let (status, body) = app.register_merchant(CNPJ).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");

        app.register_resident(CPF).await;
        let (status, _) = app.register_resident("111.444.777-35").await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_document() {
        let app = TestApp::new().await;

        let (status, body) = app.register_merchant("11222333000180").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "cnpj não é um CNPJ válido");

        let (status, _) = app.register_resident("11111111111").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_failed_profile_insert_removes_identity() {
        let app = TestApp::new().await;

        let body = json!({
            "cnpj": CNPJ,
            "razaoSocial": "Pizzaria Boa Ltda",
            "nomeFantasia": "Pizza Boa",
            "categoriaId": 999,
            "email": "contato@pizzaboa.com",
            "senha": PASSWORD,
        });
        let (status, _) = app
            .send(Method::POST, "/api/auth/cadastro-comercio", None, Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let identity = app
            .state
            .db
            .identities()
            .get_by_email("user11222333000181@cupons.app")
            .await
            .unwrap();
        assert!(identity.is_none());

        // The document is free again
        let (status, _) = app.register_merchant(CNPJ).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_login_returns_token_and_profile() {
        let app = TestApp::new().await;
        app.register_merchant(CNPJ).await;

        let body = json!({ "documento": "11.222.333/0001-81", "senha": PASSWORD, "tipo": "comerciante" });
        let (status, body) = app.send(Method::POST, "/api/auth/login", None, Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["tokenType"], "Bearer");
        assert_eq!(body["expiresIn"], 3600);
        assert_eq!(body["tipo"], "comerciante");
        assert_eq!(body["perfil"]["nome_fantasia"], "Pizza Boa");

        let claims = app
            .state
            .jwt
            .validate_token(body["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.document, CNPJ);
    }

    #[tokio::test]
    async fn test_login_infers_kind_from_document() {
        let app = TestApp::new().await;
        app.register_resident(CPF).await;

        let body = json!({ "documento": "111.444.777-35", "senha": PASSWORD });
        let (status, body) = app.send(Method::POST, "/api/auth/login", None, Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tipo"], "morador");
        assert_eq!(body["perfil"]["nome"], "Maria Silva");
    }

    #[tokio::test]
    async fn test_login_failures() {
        let app = TestApp::new().await;
        app.register_resident(CPF).await;

        let wrong_password = json!({ "documento": CPF, "senha": "errada", "tipo": "morador" });
        let (status, body) = app
            .send(Method::POST, "/api/auth/login", None, Some(wrong_password))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Credenciais inválidas");

        let wrong_kind = json!({ "documento": CPF, "senha": PASSWORD, "tipo": "comerciante" });
        let (status, body) = app
            .send(Method::POST, "/api/auth/login", None, Some(wrong_kind))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Usuário não é um comerciante");

        let unknown = json!({ "documento": "52998224725", "senha": PASSWORD });
        let (status, _) = app.send(Method::POST, "/api/auth/login", None, Some(unknown)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let empty = json!({ "documento": "", "senha": PASSWORD });
        let (status, body) = app.send(Method::POST, "/api/auth/login", None, Some(empty)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_profile_and_logout() {
        let app = TestApp::new().await;
        let token = app.resident_token(CPF).await;

        let (status, body) = app.send(Method::GET, "/api/perfil", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tipo"], "morador");
        assert_eq!(body["perfil"]["cpf"], CPF);

        let (status, body) = app.send(Method::POST, "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_protected_routes_need_token() {
        let app = TestApp::new().await;

        let (status, body) = app.send(Method::GET, "/api/perfil", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert_eq!(body["message"], "Autenticação necessária");

        let (status, body) = app
            .send(Method::GET, "/api/perfil", Some("not-a-jwt"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Sessão inválida ou expirada");
    }
}
