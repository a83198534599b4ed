//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow                                           │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  POST /api/cupons/X/reservas                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler → ApiResult<T>                                          │  │
//! │  │         │                                                        │  │
//! │  │  Database Error? ─── DbError::UniqueViolation ──┐                │  │
//! │  │         │                                       ▼                │  │
//! │  │  Rule violated? ─── CoreError::SoldOut ───── ApiError ──────────►│  │
//! │  │         │                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  HTTP 422                                                               │
//! │  { "code": "BUSINESS_LOGIC",                                            │
//! │    "message": "Cupom ABCDEF123456 esgotado (10 reservados)" }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Database internals are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

use cupons_core::{CoreError, ValidationError};
use cupons_db::DbError;

/// Error body returned by every failing endpoint.
///
/// ```json
/// { "code": "NOT_FOUND", "message": "Cupom não encontrado: ABCDEF123456" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Missing, invalid or expired credentials (401)
    Unauthorized,

    /// Authenticated, but not allowed to touch this resource (403)
    Forbidden,

    /// Already exists (409)
    Conflict,

    /// Business rule violated (422)
    BusinessLogic,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::BusinessLogic => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} não encontrado: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                debug!(entity = %entity, id = %id, "Record not found");
                ApiError::not_found("Registro", &id)
            }
            DbError::UniqueViolation { field, .. } => {
                ApiError::conflict(format!("{} já cadastrado", field))
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::validation("Referência inválida")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Falha na conexão com o banco de dados")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Falha na migração do banco de dados")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Banco de dados ocupado, tente novamente")
            }
            DbError::QueryFailed(e) | DbError::Corrupt(e) | DbError::Internal(e) => {
                error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Erro ao acessar o banco de dados")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::CouponNotFound(_) | CoreError::ReservationNotFound(_) => ErrorCode::NotFound,
            CoreError::AlreadyReserved(_) | CoreError::DocumentAlreadyRegistered { .. } => {
                ErrorCode::Conflict
            }
            CoreError::CouponInactive(_)
            | CoreError::OutsideWindow { .. }
            | CoreError::SoldOut { .. }
            | CoreError::AlreadyRedeemed { .. } => ErrorCode::BusinessLogic,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };

        let message = match err {
            CoreError::Validation(e) => e.to_string(),
            other => other.to_string(),
        };

        ApiError::new(code, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
