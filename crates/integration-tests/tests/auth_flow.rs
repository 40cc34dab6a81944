//! End-to-end authentication lifecycle tests.
//!
//! All tests require a running server and database; see the crate docs for
//! setup. Tokens must only ever travel in cookies, so several tests assert
//! on `Set-Cookie` headers and on the absence of tokens in bodies.

use reqwest::header::COOKIE;
use serde_json::{Value, json};
use tamarind_integration_tests::{
    base_url, client, register_customer, registration_body, set_cookie_value, unique_email,
    unique_phone,
};

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn register_sets_cookies_and_omits_tokens_from_body() {
    let client = client();
    let email = unique_email();

    let response = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&registration_body(&email, &unique_phone(), "hunter2hunter2"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    assert!(set_cookie_value(&response, "access_token").is_some());
    assert!(set_cookie_value(&response, "refresh_token").is_some());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["role"], "Customer");
    assert!(body["access_token_expires_at"].is_string());
    assert!(body.get("access_token").is_none());
    assert!(body.get("refresh_token").is_none());
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn duplicate_registration_conflicts() {
    let client = client();
    let email = unique_email();
    let phone = unique_phone();
    let body = registration_body(&email, &phone, "hunter2hunter2");

    let first = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn under_age_registration_rejected() {
    let client = client();
    let mut body = registration_body(&unique_email(), &unique_phone(), "hunter2hunter2");
    body["date_of_birth"] = json!("2024-01-01");

    let response = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn bad_email_and_bad_password_are_indistinguishable() {
    let client = client();
    let (email, _) = register_customer(&client).await;

    let wrong_password = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": email, "password": "not-the-password" }))
        .send()
        .await
        .unwrap();
    let unknown_email = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": unique_email(), "password": "whatever-pass" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), 401);
    assert_eq!(unknown_email.status(), 401);

    let a = wrong_password.text().await.unwrap();
    let b = unknown_email.text().await.unwrap();
    assert_eq!(a, b, "both failures must produce the same response body");
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn login_establishes_session() {
    let client = client();
    let (email, password) = register_customer(&client).await;

    let response = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let me = client
        .get(format!("{}/api/users/me", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), 200);
    let body: Value = me.json().await.unwrap();
    assert_eq!(body["email"], email);
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn protected_endpoint_without_cookies_is_unauthorized() {
    let response = client()
        .get(format!("{}/api/users/me", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn refresh_rotates_and_old_token_is_rejected() {
    // Bare client: cookies are managed by hand to replay an old pair.
    let bare = reqwest::Client::new();
    let email = unique_email();

    let response = bare
        .post(format!("{}/api/auth/register", base_url()))
        .json(&registration_body(&email, &unique_phone(), "hunter2hunter2"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let old_access = set_cookie_value(&response, "access_token").unwrap();
    let old_refresh = set_cookie_value(&response, "refresh_token").unwrap();

    // First refresh succeeds and issues a new pair.
    let response = bare
        .post(format!("{}/api/auth/refresh", base_url()))
        .header(
            COOKIE,
            format!("access_token={old_access}; refresh_token={old_refresh}"),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let new_refresh = set_cookie_value(&response, "refresh_token").unwrap();
    assert_ne!(new_refresh, old_refresh, "refresh token must rotate");

    // Replaying the superseded pair is rejected and clears the cookies.
    let replay = bare
        .post(format!("{}/api/auth/refresh", base_url()))
        .header(
            COOKIE,
            format!("access_token={old_access}; refresh_token={old_refresh}"),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(replay.status(), 401);
    assert_eq!(
        set_cookie_value(&replay, "refresh_token").as_deref(),
        Some("")
    );
}

#[tokio::test]
#[ignore = "Requires running server with JWT_ACCESS_TOKEN_MINUTES=1 (set TAMARIND_BASE_URL)"]
async fn near_expiry_access_token_is_silently_rotated() {
    // With a 1-minute access token, the cookie sits inside the rotation
    // window from the moment it is issued, so any protected request
    // triggers the in-flight refresh.
    let bare = reqwest::Client::new();
    let response = bare
        .post(format!("{}/api/auth/register", base_url()))
        .json(&registration_body(
            &unique_email(),
            &unique_phone(),
            "hunter2hunter2",
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let old_access = set_cookie_value(&response, "access_token").unwrap();
    let old_refresh = set_cookie_value(&response, "refresh_token").unwrap();

    let response = bare
        .get(format!("{}/api/users/me", base_url()))
        .header(
            COOKIE,
            format!("access_token={old_access}; refresh_token={old_refresh}"),
        )
        .send()
        .await
        .unwrap();

    // The request itself succeeds against the rewritten cookies, and the
    // rotated pair rides out on Set-Cookie.
    assert_eq!(response.status(), 200);
    let new_access = set_cookie_value(&response, "access_token").unwrap();
    let new_refresh = set_cookie_value(&response, "refresh_token").unwrap();
    assert!(!new_access.is_empty());
    assert_ne!(new_access, old_access);
    assert_ne!(new_refresh, old_refresh);

    // The rotated pair is live.
    let with_new = bare
        .get(format!("{}/api/users/me", base_url()))
        .header(
            COOKIE,
            format!("access_token={new_access}; refresh_token={new_refresh}"),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(with_new.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn refresh_without_cookies_is_unauthorized() {
    let response = reqwest::Client::new()
        .post(format!("{}/api/auth/refresh", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn logout_revokes_refresh_and_is_idempotent() {
    let bare = reqwest::Client::new();
    let response = bare
        .post(format!("{}/api/auth/register", base_url()))
        .json(&registration_body(
            &unique_email(),
            &unique_phone(),
            "hunter2hunter2",
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let access = set_cookie_value(&response, "access_token").unwrap();
    let refresh = set_cookie_value(&response, "refresh_token").unwrap();
    let cookie_header = format!("access_token={access}; refresh_token={refresh}");

    let logout = bare
        .post(format!("{}/api/auth/logout", base_url()))
        .header(COOKIE, cookie_header.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status(), 200);

    // Refresh is dead after revocation, even though the pair is intact.
    let refresh_after = bare
        .post(format!("{}/api/auth/refresh", base_url()))
        .header(COOKIE, cookie_header.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(refresh_after.status(), 401);

    // Logging out again still succeeds.
    let again = bare
        .post(format!("{}/api/auth/logout", base_url()))
        .header(COOKIE, cookie_header)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn password_change_requires_current_password() {
    let client = client();
    let (_, password) = register_customer(&client).await;

    let wrong = client
        .put(format!("{}/api/users/me/password", base_url()))
        .json(&json!({ "current_password": "not-it", "new_password": "brand-new-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 401);

    let right = client
        .put(format!("{}/api/users/me/password", base_url()))
        .json(&json!({ "current_password": password, "new_password": "brand-new-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(right.status(), 200);
}
