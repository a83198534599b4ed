//! JWT authentication module.
//!
//! Token issuing and validation, password hashing and the
//! [`AuthSession`] extractor used by protected routes.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use cupons_core::UserKind;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (auth user id)
    pub sub: String,

    /// Merchant or resident
    pub kind: UserKind,

    /// CNPJ or CPF digits
    pub document: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: String, access_lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_secs,
        }
    }

    pub fn access_lifetime_secs(&self) -> i64 {
        self.access_lifetime_secs
    }

    /// Generate an access token.
    pub fn generate_access_token(
        &self,
        auth_user_id: &str,
        kind: UserKind,
        document: &str,
    ) -> ApiResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_lifetime_secs);

        let claims = Claims {
            sub: auth_user_id.to_string(),
            kind,
            document: document.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            error!(error = %e, "Failed to generate token");
            ApiError::internal("Erro interno do servidor")
        })
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> ApiResult<Claims> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            debug!(error = %e, "Token rejected");
            ApiError::unauthorized("Sessão inválida ou expirada")
        })?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password with argon2 and a random salt.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "Failed to hash password");
            ApiError::internal("Erro interno do servidor")
        })
}

/// Verify a password against a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// [`hash_password`] off the async runtime.
pub async fn hash_password_blocking(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!(error = %e, "Hashing task failed");
            ApiError::internal("Erro interno do servidor")
        })?
}

/// [`verify_password`] off the async runtime.
pub async fn verify_password_blocking(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            error!(error = %e, "Verification task failed");
            ApiError::internal("Erro interno do servidor")
        })
}

// =============================================================================
// Extractor
// =============================================================================

/// The caller behind a valid bearer token.
///
/// Adding it to a handler's arguments makes the route require
/// authentication; a missing or bad token is rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub claims: Claims,
}

impl AuthSession {
    /// CNPJ of the calling merchant, or 403 for residents.
    pub fn require_merchant(&self) -> ApiResult<&str> {
        match self.claims.kind {
            UserKind::Merchant => Ok(&self.claims.document),
            UserKind::Resident => Err(ApiError::forbidden("Apenas comerciantes podem fazer isso")),
        }
    }

    /// CPF of the calling resident, or 403 for merchants.
    pub fn require_resident(&self) -> ApiResult<&str> {
        match self.claims.kind {
            UserKind::Resident => Ok(&self.claims.document),
            UserKind::Merchant => Err(ApiError::forbidden("Apenas moradores podem fazer isso")),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Autenticação necessária"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Token de acesso inválido"))?;

        let claims = state.jwt.validate_token(token)?;
        Ok(AuthSession { claims })
    }
}
