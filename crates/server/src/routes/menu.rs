//! Menu item route handlers.
//!
//! Reads are public (the menu is the shop window); writes are admin only.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use tamarind_core::{CategoryId, MenuItemId};

use crate::db::menu::{CategoryRepository, MenuItemRepository, NewMenuItem};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::MenuItem;
use crate::state::AppState;

/// Build the menu router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/search", get(search_items))
        .route("/category/{category_id}", get(list_by_category))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
}

/// Request to create or replace a menu item.
#[derive(Debug, Deserialize)]
pub struct MenuItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: CategoryId,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

const fn default_available() -> bool {
    true
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

fn validate_item(request: &MenuItemRequest) -> Result<()> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".to_owned()));
    }
    if request.price <= Decimal::ZERO {
        return Err(AppError::BadRequest("Price must be positive".to_owned()));
    }
    Ok(())
}

/// List the full menu. Public.
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<MenuItem>>> {
    let items = MenuItemRepository::new(state.pool()).list().await?;
    Ok(Json(items))
}

/// Get one menu item. Public.
///
/// # Errors
///
/// Returns 404 for an unknown item.
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<MenuItemId>,
) -> Result<Json<MenuItem>> {
    let item = MenuItemRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("menu item".to_owned()))?;

    Ok(Json(item))
}

/// List the items in one category. Public.
///
/// # Errors
///
/// Returns 404 for an unknown category.
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Vec<MenuItem>>> {
    if !CategoryRepository::new(state.pool()).exists(category_id).await? {
        return Err(AppError::NotFound("category".to_owned()));
    }

    let items = MenuItemRepository::new(state.pool())
        .list_by_category(category_id)
        .await?;

    Ok(Json(items))
}

/// Search items by name substring. Public.
///
/// # Errors
///
/// Returns 400 for a blank query.
pub async fn search_items(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<MenuItem>>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest(
            "Search query must not be empty".to_owned(),
        ));
    }

    let items = MenuItemRepository::new(state.pool()).search(query).await?;
    Ok(Json(items))
}

/// Create a menu item. Admin only.
///
/// # Errors
///
/// Returns 400 for an unknown category and 409 for a duplicate name.
pub async fn create_item(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<MenuItemRequest>,
) -> Result<(StatusCode, Json<MenuItem>)> {
    validate_item(&request)?;

    if !CategoryRepository::new(state.pool())
        .exists(request.category_id)
        .await?
    {
        return Err(AppError::BadRequest("Unknown category".to_owned()));
    }

    let item = MenuItemRepository::new(state.pool())
        .create(NewMenuItem {
            name: request.name.trim(),
            description: request.description.as_deref(),
            price: request.price,
            category_id: request.category_id,
            ingredients: &request.ingredients,
            is_available: request.is_available,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Replace a menu item. Admin only.
///
/// Price changes only affect future orders; existing lines keep their
/// snapshotted price.
///
/// # Errors
///
/// Returns 404 for an unknown item.
pub async fn update_item(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<MenuItemId>,
    Json(request): Json<MenuItemRequest>,
) -> Result<Json<MenuItem>> {
    validate_item(&request)?;

    if !CategoryRepository::new(state.pool())
        .exists(request.category_id)
        .await?
    {
        return Err(AppError::BadRequest("Unknown category".to_owned()));
    }

    let item = MenuItemRepository::new(state.pool())
        .update(
            id,
            NewMenuItem {
                name: request.name.trim(),
                description: request.description.as_deref(),
                price: request.price,
                category_id: request.category_id,
                ingredients: &request.ingredients,
                is_available: request.is_available,
            },
        )
        .await?;

    Ok(Json(item))
}

/// Delete a menu item. Admin only.
///
/// # Errors
///
/// Returns 404 for an unknown item.
pub async fn delete_item(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<MenuItemId>,
) -> Result<StatusCode> {
    let deleted = MenuItemRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("menu item".to_owned()));
    }
    Ok(StatusCode::NO_CONTENT)
}
