//! End-to-end report caching tests.

use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tamarind_integration_tests::{
    admin_client, base_url, client, create_menu_item, register_customer,
};

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn days_ago(days: i64) -> String {
    (Utc::now().date_naive() - Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
#[ignore = "Requires running server, database, and seeded admin"]
async fn inverted_range_rejected() {
    let admin = admin_client().await;

    let response = admin
        .get(format!(
            "{}/api/reports/sales?start_date={}&end_date={}",
            base_url(),
            today(),
            days_ago(7),
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn reports_require_admin() {
    let customer = client();
    register_customer(&customer).await;

    let response = customer
        .get(format!(
            "{}/api/reports/revenue?start_date={}&end_date={}",
            base_url(),
            days_ago(7),
            today(),
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore = "Requires running server, database, and seeded admin"]
async fn repeated_sales_report_is_served_from_cache() {
    let admin = admin_client().await;
    // A distinct range keeps this test's cache entry to itself.
    let url = format!(
        "{}/api/reports/sales?start_date={}&end_date={}",
        base_url(),
        days_ago(93),
        days_ago(90),
    );

    let first: Value = admin.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(first["from_cache"], false);

    let second: Value = admin.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(second["from_cache"], true);
    assert_eq!(second["total_revenue"], first["total_revenue"]);
    assert_eq!(second["generated_at"], first["generated_at"]);

    // Bypass regenerates and re-caches.
    let forced: Value = admin
        .get(format!("{url}&force_refresh=true"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(forced["from_cache"], false);
}

#[tokio::test]
#[ignore = "Requires running server, database, and seeded admin"]
async fn cancelled_orders_are_excluded_from_reports() {
    let admin = admin_client().await;
    let (item_id, _) = create_menu_item(&admin, "30.00").await;

    let customer = client();
    register_customer(&customer).await;

    // One counted order, one cancelled.
    let mut order_ids = Vec::new();
    for _ in 0..2 {
        let order: Value = customer
            .post(format!("{}/api/orders", base_url()))
            .json(&json!({ "items": [{ "menu_item_id": item_id, "quantity": 1 }] }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        order_ids.push(order["id"].as_str().unwrap().to_owned());
    }
    let cancelled = admin
        .put(format!("{}/api/orders/{}/status", base_url(), order_ids[1]))
        .json(&json!({ "status": "Cancelled" }))
        .send()
        .await
        .unwrap();
    assert_eq!(cancelled.status(), 200);

    // force_refresh so earlier cached payloads for today don't mask the data.
    let report: Value = admin
        .get(format!(
            "{}/api/reports/sales?start_date={}&end_date={}&force_refresh=true",
            base_url(),
            today(),
            today(),
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let row = report["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["menu_item_id"] == json!(item_id))
        .expect("item should appear in the report");
    assert_eq!(row["quantity_sold"], 1);
    assert_eq!(row["total_revenue"], "30.00");
}

#[tokio::test]
#[ignore = "Requires running server, database, and seeded admin"]
async fn revenue_report_matches_order_totals() {
    let admin = admin_client().await;
    let (item_id, _) = create_menu_item(&admin, "15.00").await;

    let customer = client();
    register_customer(&customer).await;
    let order = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "items": [{ "menu_item_id": item_id, "quantity": 2 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(order.status(), 201);

    let report: Value = admin
        .get(format!(
            "{}/api/reports/revenue?start_date={}&end_date={}&force_refresh=true",
            base_url(),
            today(),
            today(),
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Other tests contribute revenue too, so assert a lower bound.
    let total: f64 = report["total_revenue"].as_str().unwrap().parse().unwrap();
    assert!(total >= 30.0);
    assert_eq!(report["from_cache"], false);
}
