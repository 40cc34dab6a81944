//! Order route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;

use tamarind_core::{MenuItemId, OrderId, OrderStatus};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::Order;
use crate::services::orders::{OrderLineRequest, OrderService};
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order).get(list_all_orders))
        .route("/my", get(my_orders))
        .route("/pending", get(pending_orders))
        .route("/{id}", get(get_order).delete(delete_order))
        .route("/{id}/status", put(update_status))
}

/// Request to place an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequestBody>,
}

/// One requested order line.
#[derive(Debug, Deserialize)]
pub struct OrderLineRequestBody {
    pub menu_item_id: MenuItemId,
    pub quantity: i32,
    #[serde(default)]
    pub excluded_ingredients: Vec<String>,
}

/// Request to change an order's status.
///
/// Unknown status strings are rejected during deserialization, producing a
/// 400 before the handler runs.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Place an order. Any authenticated user.
///
/// # Errors
///
/// Returns 400 when the item list is empty, a quantity is not positive, or
/// an item is unknown or unavailable. Nothing is written on failure.
pub async fn create_order(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let lines = request
        .items
        .into_iter()
        .map(|line| OrderLineRequest {
            menu_item_id: line.menu_item_id,
            quantity: line.quantity,
            excluded_ingredients: line.excluded_ingredients,
        })
        .collect();

    let order = OrderService::new(state.pool())
        .place_order(user.id, lines)
        .await?;

    tracing::info!(order_id = %order.id, user_id = %user.id, total = %order.total_price, "Order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

/// The caller's own orders, newest first.
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn my_orders(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(orders))
}

/// All orders. Admin only.
///
/// # Errors
///
/// Returns 403 for non-admin callers.
pub async fn list_all_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// The kitchen queue: pending orders, oldest first. Admin only.
///
/// # Errors
///
/// Returns 403 for non-admin callers.
pub async fn pending_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_status(OrderStatus::Pending)
        .await?;

    Ok(Json(orders))
}

/// One order. The owner or an admin.
///
/// # Errors
///
/// Returns 403 when a customer asks for someone else's order and 404 for an
/// unknown order.
pub async fn get_order(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_owned()))?;

    if order.user_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "You can only view your own orders".to_owned(),
        ));
    }

    Ok(Json(order))
}

/// Change an order's status. Admin only.
///
/// # Errors
///
/// Returns 404 for an unknown order.
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, request.status)
        .await?;

    tracing::info!(order_id = %id, status = %request.status, admin_id = %admin.id, "Order status updated");

    Ok(Json(order))
}

/// Delete an order and its lines. Admin only.
///
/// # Errors
///
/// Returns 404 for an unknown order.
pub async fn delete_order(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<StatusCode> {
    let deleted = OrderRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("order".to_owned()));
    }
    Ok(StatusCode::NO_CONTENT)
}
