//! HTTP route handlers for the restaurant API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (pings the database)
//!
//! # Auth
//! POST /api/auth/register          - Create an account and log in (201)
//! POST /api/auth/login             - Log in (sets both token cookies)
//! POST /api/auth/refresh           - Rotate the token pair from cookies
//! POST /api/auth/logout            - Revoke the refresh token, clear cookies
//!
//! # Users
//! GET  /api/users                  - List users (admin)
//! POST /api/users/admin            - Create an admin account (admin)
//! GET  /api/users/me               - Own profile
//! PUT  /api/users/me               - Update own name/phone
//! PUT  /api/users/me/password      - Change own password
//!
//! # Catalog (reads public, writes admin)
//! GET  /api/categories             - List categories
//! POST /api/categories             - Create a category (admin)
//! GET  /api/menu                   - Full menu
//! GET  /api/menu/search?q=         - Search by name
//! GET  /api/menu/category/{id}     - Items in a category
//! GET  /api/menu/{id}              - One item
//! POST /api/menu                   - Create an item (admin)
//! PUT  /api/menu/{id}              - Replace an item (admin)
//! DELETE /api/menu/{id}            - Delete an item (admin)
//!
//! # Orders
//! POST /api/orders                 - Place an order (201)
//! GET  /api/orders/my              - Own orders
//! GET  /api/orders                 - All orders (admin)
//! GET  /api/orders/pending         - Kitchen queue (admin)
//! GET  /api/orders/{id}            - One order (owner or admin)
//! PUT  /api/orders/{id}/status     - Change status (admin)
//! DELETE /api/orders/{id}          - Delete an order (admin)
//!
//! # Reports (admin)
//! GET  /api/reports/sales?start_date=&end_date=[&force_refresh=]
//! GET  /api/reports/revenue?start_date=&end_date=[&force_refresh=]
//! ```

pub mod auth;
pub mod categories;
pub mod menu;
pub mod orders;
pub mod reports;
pub mod users;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Build the complete application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .nest("/api/auth", auth::router())
        .nest("/api/users", users::router())
        .nest("/api/categories", categories::router())
        .nest("/api/menu", menu::router())
        .nest("/api/orders", orders::router())
        .nest("/api/reports", reports::router())
}

/// Liveness check.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Readiness check: pings the database.
async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => Ok(Json(serde_json::json!({ "status": "ready" }))),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
