//! Authentication route handlers.
//!
//! Tokens are set and cleared exclusively through cookies; response bodies
//! carry the user summary and the access-token expiry, never the tokens.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use tamarind_core::{Email, Phone};

use crate::cookies::{REFRESH_COOKIE, clear_session_cookies, set_session_cookies};
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::RequireAuth;
use crate::routes::users::UserResponse;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// Minimum account age in years.
const MIN_AGE_YEARS: u32 = 10;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

/// Request to create an account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub date_of_birth: NaiveDate,
}

/// Request to log in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session payload returned by register, login, and refresh.
#[derive(Debug, serde::Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub access_token_expires_at: DateTime<Utc>,
}

fn validate_registration(request: &RegisterRequest) -> Result<()> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".to_owned()));
    }
    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if request.password != request.confirm_password {
        return Err(AppError::BadRequest("Passwords do not match".to_owned()));
    }

    let today = Utc::now().date_naive();
    let old_enough = request
        .date_of_birth
        .checked_add_months(chrono::Months::new(12 * MIN_AGE_YEARS))
        .is_some_and(|tenth_birthday| tenth_birthday <= today);
    if !old_enough {
        return Err(AppError::BadRequest(format!(
            "You must be at least {MIN_AGE_YEARS} years old to register"
        )));
    }

    Ok(())
}

/// Create a customer account and log it in immediately.
///
/// # Errors
///
/// Returns 400 for validation failures and 409 when the email or phone is
/// already registered.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    validate_registration(&request)?;

    let email =
        Email::parse(&request.email).map_err(|e| AppError::BadRequest(format!("Invalid email: {e}")))?;
    let phone =
        Phone::parse(&request.phone).map_err(|e| AppError::BadRequest(format!("Invalid phone: {e}")))?;

    let auth = AuthService::new(state.pool(), state.tokens());
    let session = auth
        .register(Registration {
            email: &email,
            phone: &phone,
            name: request.name.trim(),
            password: &request.password,
            role: "Customer",
        })
        .await?;

    set_sentry_user(&session.user.id, Some(session.user.email.as_str()));
    tracing::info!(user_id = %session.user.id, "New account registered");

    let response = SessionResponse {
        user: UserResponse::from(&session.user),
        access_token_expires_at: session.access_expires_at,
    };
    let jar = set_session_cookies(jar, &state.config().jwt, &session);

    Ok((StatusCode::CREATED, jar, Json(response)))
}

/// Verify credentials and establish a session.
///
/// # Errors
///
/// Returns 401 for an unknown email and a wrong password alike.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let email = Email::parse(&request.email)
        .map_err(|_| AppError::Unauthorized("Invalid email or password".to_owned()))?;

    let auth = AuthService::new(state.pool(), state.tokens());
    let session = auth.login(&email, &request.password).await?;

    set_sentry_user(&session.user.id, Some(session.user.email.as_str()));
    tracing::info!(user_id = %session.user.id, "User logged in");

    let response = SessionResponse {
        user: UserResponse::from(&session.user),
        access_token_expires_at: session.access_expires_at,
    };
    let jar = set_session_cookies(jar, &state.config().jwt, &session);

    Ok((jar, Json(response)))
}

/// Exchange the cookie pair for a fresh session, rotating the refresh token.
///
/// # Errors
///
/// Returns 401 when either cookie is missing or the stored credential does
/// not match. Rejection clears both cookies.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> std::result::Result<(CookieJar, Json<SessionResponse>), (CookieJar, AppError)> {
    let reject = |jar: CookieJar, state: &AppState| {
        (
            clear_session_cookies(jar, &state.config().jwt),
            AppError::Unauthorized("Invalid or expired token".to_owned()),
        )
    };

    let Some(access_token) = jar
        .get(crate::cookies::ACCESS_COOKIE)
        .map(|c| c.value().to_owned())
    else {
        return Err(reject(jar, &state));
    };
    let Some(refresh_token) = jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned()) else {
        return Err(reject(jar, &state));
    };

    let auth = AuthService::new(state.pool(), state.tokens());
    let session = match auth.refresh(&access_token, &refresh_token).await {
        Ok(session) => session,
        Err(crate::services::auth::AuthError::InvalidToken) => return Err(reject(jar, &state)),
        Err(e) => return Err((jar, AppError::Auth(e))),
    };

    tracing::debug!(user_id = %session.user.id, "Session refreshed");

    let response = SessionResponse {
        user: UserResponse::from(&session.user),
        access_token_expires_at: session.access_expires_at,
    };
    let jar = set_session_cookies(jar, &state.config().jwt, &session);

    Ok((jar, Json(response)))
}

/// Revoke the refresh credential and clear both cookies.
///
/// Idempotent: logging out twice succeeds.
///
/// # Errors
///
/// Returns 401 without a valid access token.
pub async fn logout(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>)> {
    let auth = AuthService::new(state.pool(), state.tokens());
    auth.revoke(&user).await?;

    clear_sentry_user();
    tracing::info!(user_id = %user.id, "User logged out");

    let jar = clear_session_cookies(jar, &state.config().jwt);
    Ok((jar, Json(serde_json::json!({}))))
}
