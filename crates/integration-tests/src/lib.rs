//! Shared helpers for the end-to-end API tests.
//!
//! The ignored tests in `tests/` exercise a running server:
//!
//! ```bash
//! cargo run -p tamarind-cli -- migrate
//! TAMARIND_ADMIN_PASSWORD=... cargo run -p tamarind-cli -- admin create \
//!     -e admin@test.local -n "Test Admin" -p "+15550000001"
//! COOKIE_SECURE=false cargo run -p tamarind-server &
//! TAMARIND_BASE_URL=http://127.0.0.1:8080 cargo test -p tamarind-integration-tests -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("TAMARIND_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_owned())
}

/// HTTP client with a cookie store, mirroring a browser session.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("failed to build HTTP client")
}

/// A unique email for this test run.
#[must_use]
pub fn unique_email() -> String {
    format!("user-{}@test.local", Uuid::new_v4().simple())
}

/// A unique E.164-ish phone number for this test run.
#[must_use]
pub fn unique_phone() -> String {
    // 10 digits from the UUID keeps it inside the accepted length range.
    let digits: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .filter(char::is_ascii_digit)
        .chain("0000000000".chars())
        .take(10)
        .collect();
    format!("+1{digits}")
}

/// Registration body for a fresh adult customer.
#[must_use]
pub fn registration_body(email: &str, phone: &str, password: &str) -> Value {
    json!({
        "name": "Test Customer",
        "email": email,
        "phone": phone,
        "password": password,
        "confirm_password": password,
        "date_of_birth": "1990-06-15",
    })
}

/// Register a fresh customer and leave its session cookies in the client.
///
/// Returns the email and password.
///
/// # Panics
///
/// Panics if registration does not return 201.
pub async fn register_customer(client: &reqwest::Client) -> (String, String) {
    let email = unique_email();
    let phone = unique_phone();
    let password = "correct-horse-battery".to_owned();

    let response = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&registration_body(&email, &phone, &password))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(response.status(), 201, "registration should succeed");

    (email, password)
}

/// Client logged in as the test admin.
///
/// Requires an admin created via
/// `tamarind-cli admin create -e admin@test.local ...` with the password in
/// `TAMARIND_TEST_ADMIN_PASSWORD`.
///
/// # Panics
///
/// Panics if the login fails.
pub async fn admin_client() -> reqwest::Client {
    let email = std::env::var("TAMARIND_TEST_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@test.local".to_owned());
    let password = std::env::var("TAMARIND_TEST_ADMIN_PASSWORD")
        .expect("TAMARIND_TEST_ADMIN_PASSWORD must be set for admin tests");

    let client = client();
    let response = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("admin login request failed");
    assert_eq!(response.status(), 200, "admin login should succeed");

    client
}

/// Extract a cookie's value from a response's `Set-Cookie` headers.
#[must_use]
pub fn set_cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .find_map(|raw| {
            let (pair, _) = raw.split_once(';').unwrap_or((raw, ""));
            let (cookie_name, value) = pair.split_once('=')?;
            (cookie_name.trim() == name).then(|| value.to_owned())
        })
}

/// Create a category and an available menu item via the admin API.
///
/// Returns `(menu_item_id, price_as_string)`.
///
/// # Panics
///
/// Panics if either create call fails.
pub async fn create_menu_item(admin: &reqwest::Client, price: &str) -> (String, String) {
    let category_name = format!("Category {}", Uuid::new_v4().simple());
    let response = admin
        .post(format!("{}/api/categories", base_url()))
        .json(&json!({ "name": category_name }))
        .send()
        .await
        .expect("create category request failed");
    assert_eq!(response.status(), 201);
    let category: Value = response.json().await.expect("category body");

    let item_name = format!("Item {}", Uuid::new_v4().simple());
    let response = admin
        .post(format!("{}/api/menu", base_url()))
        .json(&json!({
            "name": item_name,
            "description": "test item",
            "price": price,
            "category_id": category["id"],
            "ingredients": ["rice", "chili"],
            "is_available": true,
        }))
        .send()
        .await
        .expect("create menu item request failed");
    assert_eq!(response.status(), 201);
    let item: Value = response.json().await.expect("menu item body");

    (
        item["id"].as_str().expect("item id").to_owned(),
        price.to_owned(),
    )
}
