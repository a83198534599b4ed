use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use cupons_core::Category;

use crate::error::ApiResult;
use crate::AppState;

/// `GET /api/categorias`: every category, ordered by name.
pub async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_categories_sorted_by_name() {
        let app = TestApp::new().await;
        app.state.db.categories().insert_if_missing("Saúde").await.unwrap();
        app.state.db.categories().insert_if_missing("Beleza").await.unwrap();

        let (status, body) = app.send(Method::GET, "/api/categorias", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let names: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["nome"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["Alimentação", "Beleza", "Saúde"]);
    }
}
