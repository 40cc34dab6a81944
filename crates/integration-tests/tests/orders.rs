//! End-to-end order placement and access-control tests.
//!
//! Admin-dependent tests need the seeded test admin; see the crate docs.

use serde_json::{Value, json};
use tamarind_integration_tests::{
    admin_client, base_url, client, create_menu_item, register_customer,
};

#[tokio::test]
#[ignore = "Requires running server, database, and seeded admin"]
async fn order_total_is_snapshotted_sum_of_lines() {
    let admin = admin_client().await;
    let (item_id, _) = create_menu_item(&admin, "12.50").await;

    let customer = client();
    register_customer(&customer).await;

    let response = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({
            "items": [
                { "menu_item_id": item_id, "quantity": 2, "excluded_ingredients": ["chili"] },
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let order: Value = response.json().await.unwrap();
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["total_price"], "25.00");
    assert_eq!(order["items"][0]["unit_price"], "12.50");
    assert_eq!(order["items"][0]["excluded_ingredients"][0], "chili");
}

#[tokio::test]
#[ignore = "Requires running server, database, and seeded admin"]
async fn price_change_does_not_rewrite_existing_orders() {
    let admin = admin_client().await;
    let (item_id, _) = create_menu_item(&admin, "10.00").await;

    let customer = client();
    register_customer(&customer).await;

    let response = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "items": [{ "menu_item_id": item_id, "quantity": 1 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let order: Value = response.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap();

    // Admin doubles the price.
    let item: Value = admin
        .get(format!("{}/api/menu/{item_id}", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let update = admin
        .put(format!("{}/api/menu/{item_id}", base_url()))
        .json(&json!({
            "name": item["name"],
            "description": item["description"],
            "price": "20.00",
            "category_id": item["category_id"],
            "ingredients": item["ingredients"],
            "is_available": true,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(update.status(), 200);

    // The existing order still shows the captured price.
    let fetched: Value = customer
        .get(format!("{}/api/orders/{order_id}", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["items"][0]["unit_price"], "10.00");
    assert_eq!(fetched["total_price"], "10.00");
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn empty_order_rejected() {
    let customer = client();
    register_customer(&customer).await;

    let response = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "items": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running server, database, and seeded admin"]
async fn zero_quantity_rejected_and_nothing_written() {
    let admin = admin_client().await;
    let (item_id, _) = create_menu_item(&admin, "9.00").await;

    let customer = client();
    register_customer(&customer).await;

    let response = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({
            "items": [
                { "menu_item_id": item_id, "quantity": 1 },
                { "menu_item_id": item_id, "quantity": 0 },
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // The valid line must not have been committed on its own.
    let orders: Value = customer
        .get(format!("{}/api/orders/my", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 0);
}

#[tokio::test]
#[ignore = "Requires running server, database, and seeded admin"]
async fn bulk_quantities_are_accepted() {
    let admin = admin_client().await;
    let (item_id, _) = create_menu_item(&admin, "4.00").await;

    let customer = client();
    register_customer(&customer).await;

    // A catering-sized line: any positive quantity is valid.
    let response = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "items": [{ "menu_item_id": item_id, "quantity": 150 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let order: Value = response.json().await.unwrap();
    assert_eq!(order["items"][0]["quantity"], 150);
    assert_eq!(order["total_price"], "600.00");
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn unknown_menu_item_rejected() {
    let customer = client();
    register_customer(&customer).await;

    let response = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({
            "items": [{ "menu_item_id": uuid::Uuid::new_v4(), "quantity": 1 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running server, database, and seeded admin"]
async fn unavailable_item_rejected() {
    let admin = admin_client().await;
    let (item_id, _) = create_menu_item(&admin, "7.00").await;

    // Flip the item to unavailable.
    let item: Value = admin
        .get(format!("{}/api/menu/{item_id}", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    admin
        .put(format!("{}/api/menu/{item_id}", base_url()))
        .json(&json!({
            "name": item["name"],
            "description": item["description"],
            "price": item["price"],
            "category_id": item["category_id"],
            "ingredients": item["ingredients"],
            "is_available": false,
        }))
        .send()
        .await
        .unwrap();

    let customer = client();
    register_customer(&customer).await;

    let response = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "items": [{ "menu_item_id": item_id, "quantity": 1 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running server, database, and seeded admin"]
async fn customers_cannot_read_each_others_orders() {
    let admin = admin_client().await;
    let (item_id, _) = create_menu_item(&admin, "5.00").await;

    let alice = client();
    register_customer(&alice).await;
    let order: Value = alice
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "items": [{ "menu_item_id": item_id, "quantity": 1 }] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order_id = order["id"].as_str().unwrap();

    let mallory = client();
    register_customer(&mallory).await;
    let response = mallory
        .get(format!("{}/api/orders/{order_id}", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Admins can read any order.
    let as_admin = admin
        .get(format!("{}/api/orders/{order_id}", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(as_admin.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running server and database (set TAMARIND_BASE_URL)"]
async fn customers_cannot_use_admin_order_endpoints() {
    let customer = client();
    register_customer(&customer).await;

    let all_orders = customer
        .get(format!("{}/api/orders", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(all_orders.status(), 403);

    let pending = customer
        .get(format!("{}/api/orders/pending", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(pending.status(), 403);
}

#[tokio::test]
#[ignore = "Requires running server, database, and seeded admin"]
async fn status_updates_are_admin_only_and_reject_unknown_statuses() {
    let admin = admin_client().await;
    let (item_id, _) = create_menu_item(&admin, "8.00").await;

    let customer = client();
    register_customer(&customer).await;
    let order: Value = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "items": [{ "menu_item_id": item_id, "quantity": 1 }] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order_id = order["id"].as_str().unwrap();

    let forbidden = customer
        .put(format!("{}/api/orders/{order_id}/status", base_url()))
        .json(&json!({ "status": "Preparing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status(), 403);

    let unknown = admin
        .put(format!("{}/api/orders/{order_id}/status", base_url()))
        .json(&json!({ "status": "Shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 400);

    let ok = admin
        .put(format!("{}/api/orders/{order_id}/status", base_url()))
        .json(&json!({ "status": "Preparing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), 200);
    let updated: Value = ok.json().await.unwrap();
    assert_eq!(updated["status"], "Preparing");
}
