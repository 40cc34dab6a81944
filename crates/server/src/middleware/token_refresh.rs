//! Silent token refresh.
//!
//! Runs before the auth extractors. When the access-token cookie is within
//! five minutes of expiry (or already past it), the layer rotates the
//! session using the refresh cookie, rewrites the request's cookies so
//! downstream extractors see the fresh token, and sets the new cookies on
//! the response. Auth endpoints are skipped so login and refresh manage
//! their own cookies.
//!
//! A rejected refresh clears both cookies but still lets the request
//! through; the extractor produces the 401. Transient failures are logged
//! and the request continues untouched.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, TimeDelta, Utc};

use crate::cookies::{ACCESS_COOKIE, REFRESH_COOKIE, clear_session_cookies, set_session_cookies};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// How close to expiry a token must be before it is refreshed in-flight.
const REFRESH_WINDOW: TimeDelta = TimeDelta::minutes(5);

/// Whether an access token expiring at `expires_at` should be refreshed now.
fn needs_refresh(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at - now <= REFRESH_WINDOW
}

/// Paths that manage their own cookies or need no auth at all.
fn is_exempt(path: &str) -> bool {
    path.starts_with("/api/auth") || path.starts_with("/health")
}

/// Rewrite the request's `Cookie` header with the rotated token pair.
fn rewrite_request_cookies(request: &mut Request, access_token: &str, refresh_token: &str) {
    let jar = CookieJar::from_headers(request.headers())
        .add(Cookie::new(ACCESS_COOKIE, access_token.to_owned()))
        .add(Cookie::new(REFRESH_COOKIE, refresh_token.to_owned()));

    let header = jar
        .iter()
        .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
        .collect::<Vec<_>>()
        .join("; ");

    if let Ok(value) = HeaderValue::from_str(&header) {
        request.headers_mut().insert(COOKIE, value);
    }
}

/// Middleware entry point, attached with `middleware::from_fn_with_state`.
pub async fn token_refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(access_token) = jar.get(ACCESS_COOKIE).map(|c| c.value().to_owned()) else {
        return next.run(request).await;
    };

    // Unverified read: this only decides whether to attempt a refresh. The
    // refresh itself re-verifies the signature, and the extractor verifies
    // whatever token the handler finally sees.
    let Ok(expires_at) = state.tokens().decode_expiry_unverified(&access_token) else {
        return next.run(request).await;
    };

    if !needs_refresh(expires_at, Utc::now()) {
        return next.run(request).await;
    }

    let Some(refresh_token) = jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned()) else {
        return next.run(request).await;
    };

    let auth = AuthService::new(state.pool(), state.tokens());
    match auth.refresh(&access_token, &refresh_token).await {
        Ok(session) => {
            tracing::debug!(user_id = %session.user.id, "Silently refreshed access token");
            rewrite_request_cookies(&mut request, &session.access_token, session.refresh.token());

            let response = next.run(request).await;
            let cookies = set_session_cookies(CookieJar::new(), &state.config().jwt, &session);
            (cookies, response).into_response()
        }
        Err(AuthError::InvalidToken) => {
            // Stale or replayed credentials: clear them so the client stops
            // retrying, and let the extractor reject the request.
            let response = next.run(request).await;
            let cookies = clear_session_cookies(CookieJar::new(), &state.config().jwt);
            (cookies, response).into_response()
        }
        Err(error) => {
            tracing::warn!(%error, "Silent token refresh failed; continuing without refresh");
            next.run(request).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_not_refreshed() {
        let now = Utc::now();
        assert!(!needs_refresh(now + TimeDelta::minutes(10), now));
    }

    #[test]
    fn test_token_near_expiry_refreshed() {
        let now = Utc::now();
        assert!(needs_refresh(now + TimeDelta::minutes(4), now));
        assert!(needs_refresh(now + TimeDelta::minutes(5), now));
    }

    #[test]
    fn test_expired_token_refreshed() {
        let now = Utc::now();
        assert!(needs_refresh(now - TimeDelta::minutes(1), now));
    }

    #[test]
    fn test_auth_and_health_paths_exempt() {
        assert!(is_exempt("/api/auth/login"));
        assert!(is_exempt("/api/auth/refresh"));
        assert!(is_exempt("/health"));
        assert!(is_exempt("/health/ready"));
        assert!(!is_exempt("/api/orders"));
        assert!(!is_exempt("/api/reports/sales"));
    }
}
