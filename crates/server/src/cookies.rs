//! Auth cookie construction.
//!
//! Both tokens travel exclusively in `HttpOnly` cookies; response bodies
//! never carry them. The pair is always set together and cleared together.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;

use crate::config::JwtConfig;
use crate::services::auth::AuthSession;

/// Cookie carrying the JWT access token.
pub const ACCESS_COOKIE: &str = "access_token";

/// Cookie carrying the opaque refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

fn build_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    config: &JwtConfig,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(max_age_secs));

    if let Some(domain) = &config.cookie_domain {
        builder = builder.domain(domain.clone());
    }

    builder.build()
}

/// Add both session cookies for a freshly established session.
#[must_use]
pub fn set_session_cookies(jar: CookieJar, config: &JwtConfig, session: &AuthSession) -> CookieJar {
    let access_max_age = (session.access_expires_at - Utc::now()).num_seconds().max(0);
    let refresh_max_age = (session.refresh.expires_at() - Utc::now())
        .num_seconds()
        .max(0);

    jar.add(build_cookie(
        ACCESS_COOKIE,
        session.access_token.clone(),
        access_max_age,
        config,
    ))
    .add(build_cookie(
        REFRESH_COOKIE,
        session.refresh.token().to_owned(),
        refresh_max_age,
        config,
    ))
}

/// Expire both session cookies immediately.
#[must_use]
pub fn clear_session_cookies(jar: CookieJar, config: &JwtConfig) -> CookieJar {
    jar.add(build_cookie(ACCESS_COOKIE, String::new(), 0, config))
        .add(build_cookie(REFRESH_COOKIE, String::new(), 0, config))
}
