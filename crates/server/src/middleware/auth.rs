//! Authentication extractors.
//!
//! Handlers take `RequireAuth` or `RequireAdmin` as an argument to require a
//! verified access-token cookie. The token is fully verified here, so the
//! silent-refresh layer running before us only ever improves the outcome.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;

use tamarind_core::UserId;

use crate::cookies::ACCESS_COOKIE;
use crate::error::AppError;
use crate::models::AuthUser;
use crate::state::AppState;

/// Extractor that requires a valid access token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub AuthUser);

/// Extractor that additionally requires the `Admin` role.
pub struct RequireAdmin(pub AuthUser);

fn authenticated_user(parts: &Parts, state: &AppState) -> Result<AuthUser, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar
        .get(ACCESS_COOKIE)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_owned()))?
        .value();

    let claims = state
        .tokens()
        .verify_access_token(token)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_owned()))?;

    let id = claims
        .sub
        .parse::<UserId>()
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_owned()))?;

    Ok(AuthUser {
        id,
        email: claims.email,
        role: claims.role,
    })
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticated_user(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticated_user(parts, state)?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_owned()));
        }
        Ok(Self(user))
    }
}
