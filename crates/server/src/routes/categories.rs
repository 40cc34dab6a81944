//! Category route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use crate::db::menu::CategoryRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Category;
use crate::state::AppState;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_categories).post(create_category))
}

/// Request to create a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// List all categories. Public.
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// Create a category. Admin only.
///
/// # Errors
///
/// Returns 409 when the name already exists.
pub async fn create_category(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest(
            "Category name must not be empty".to_owned(),
        ));
    }

    let category = CategoryRepository::new(state.pool()).create(name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
