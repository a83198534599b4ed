//! Request body extraction.
//!
//! [`ApiJson`] behaves like `axum::Json` but answers a bad body with the
//! same `{ code, message }` shape as every other failure.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use tracing::debug;

use crate::error::ApiError;

/// JSON body extractor whose rejection is an [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection.body_text(), "Rejected request body");

        match rejection {
            JsonRejection::JsonDataError(_) => {
                ApiError::validation("Campos obrigatórios faltando ou inválidos")
            }
            JsonRejection::JsonSyntaxError(_) => ApiError::validation("JSON inválido"),
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::validation("Content-Type deve ser application/json")
            }
            _ => ApiError::validation("Corpo da requisição inválido"),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_support::TestApp;

    async fn post_raw(
        app: &TestApp,
        uri: &str,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let app = TestApp::new().await;

        let (status, body) = post_raw(
            &app,
            "/api/auth/cadastro-comercio",
            "application/json",
            "{not json",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "JSON inválido");
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_validation_error() {
        let app = TestApp::new().await;

        let form = json!({
            "cnpj": "11222333000181",
            "razaoSocial": "Pizzaria Boa Ltda",
            "nomeFantasia": "Pizza Boa",
            "categoriaId": "1",
            "email": "contato@pizzaboa.com",
            "senha": "segredo123",
        });
        let (status, body) = app
            .send(Method::POST, "/api/auth/cadastro-comercio", None, Some(form))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = app
            .send(Method::POST, "/api/auth/login", None, Some(json!({ "senha": 1 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_validation_error() {
        let app = TestApp::new().await;

        let (status, body) = post_raw(&app, "/api/auth/login", "text/plain", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
