//! User management route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::DateTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use tamarind_core::{Email, Phone, UserId};

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::User;
use crate::services::auth::{hash_password, verify_password};
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/admin", post(create_admin))
        .route("/me", get(me).put(update_me))
        .route("/me/password", put(change_password))
}

/// User summary returned by every user-bearing endpoint.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub phone: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_owned(),
            phone: user.phone.as_str().to_owned(),
            name: user.name.clone(),
            role: user.role.clone(),
            created_at: user.created_at,
        }
    }
}

/// Request to create an admin account.
#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Request to update the caller's profile.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub phone: String,
}

/// Request to change the caller's password.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// List all users. Admin only.
///
/// # Errors
///
/// Returns 403 for non-admin callers.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// Create another admin account. Admin only.
///
/// Unlike self-registration this does not log the new account in.
///
/// # Errors
///
/// Returns 409 when the email or phone is taken.
pub async fn create_admin(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".to_owned()));
    }
    let email = Email::parse(&request.email)
        .map_err(|e| AppError::BadRequest(format!("Invalid email: {e}")))?;
    let phone = Phone::parse(&request.phone)
        .map_err(|e| AppError::BadRequest(format!("Invalid phone: {e}")))?;
    let password_hash =
        hash_password(&request.password).map_err(AppError::Auth)?;

    let user = UserRepository::new(state.pool())
        .create(crate::db::users::NewUser {
            email: &email,
            phone: &phone,
            name: request.name.trim(),
            password_hash: &password_hash,
            role: "Admin",
        })
        .await?;

    tracing::info!(created_by = %admin.id, user_id = %user.id, "Admin account created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// The caller's own profile.
///
/// # Errors
///
/// Returns 404 if the account behind a valid token has been deleted.
pub async fn me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_owned()))?;

    Ok(Json(UserResponse::from(&user)))
}

/// Update the caller's name and phone.
///
/// # Errors
///
/// Returns 409 when the phone is taken by another account.
pub async fn update_me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".to_owned()));
    }
    let phone = Phone::parse(&request.phone)
        .map_err(|e| AppError::BadRequest(format!("Invalid phone: {e}")))?;

    let updated = UserRepository::new(state.pool())
        .update_profile(user.id, request.name.trim(), &phone)
        .await?;

    Ok(Json(UserResponse::from(&updated)))
}

/// Change the caller's password after verifying the current one.
///
/// # Errors
///
/// Returns 401 when the current password is wrong.
pub async fn change_password(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    if request.new_password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_owned(),
        ));
    }

    let repo = UserRepository::new(state.pool());
    let current_hash = repo
        .get_password_hash(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_owned()))?;

    if !verify_password(&current_hash, &request.current_password) {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_owned(),
        ));
    }

    let new_hash = hash_password(&request.new_password).map_err(AppError::Auth)?;
    repo.update_password_hash(user.id, &new_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(Json(serde_json::json!({})))
}
