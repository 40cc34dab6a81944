//! Demo data seeding command.
//!
//! Inserts a small Thai menu for local development. Idempotent: existing
//! categories and items are left alone.

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::connect;

struct SeedItem {
    name: &'static str,
    description: &'static str,
    price: Decimal,
    category: &'static str,
    ingredients: &'static [&'static str],
}

fn demo_menu() -> Vec<SeedItem> {
    vec![
        SeedItem {
            name: "Spring Rolls",
            description: "Crispy vegetable rolls with sweet chili dip",
            price: Decimal::new(650, 2),
            category: "Starters",
            ingredients: &["cabbage", "carrot", "glass noodles", "peanuts"],
        },
        SeedItem {
            name: "Tom Yum Soup",
            description: "Hot and sour soup with prawns and lemongrass",
            price: Decimal::new(895, 2),
            category: "Starters",
            ingredients: &["prawns", "lemongrass", "chili", "mushrooms"],
        },
        SeedItem {
            name: "Pad Thai",
            description: "Rice noodles with tamarind sauce, egg, and peanuts",
            price: Decimal::new(1250, 2),
            category: "Mains",
            ingredients: &["rice noodles", "egg", "peanuts", "bean sprouts"],
        },
        SeedItem {
            name: "Green Curry",
            description: "Coconut green curry with seasonal vegetables",
            price: Decimal::new(1395, 2),
            category: "Mains",
            ingredients: &["coconut milk", "green curry paste", "bamboo shoots"],
        },
        SeedItem {
            name: "Mango Sticky Rice",
            description: "Sweet coconut rice with fresh mango",
            price: Decimal::new(750, 2),
            category: "Desserts",
            ingredients: &["sticky rice", "mango", "coconut milk"],
        },
        SeedItem {
            name: "Thai Iced Tea",
            description: "Spiced black tea with condensed milk",
            price: Decimal::new(450, 2),
            category: "Drinks",
            ingredients: &["black tea", "condensed milk", "star anise"],
        },
    ]
}

async fn ensure_category(pool: &PgPool, name: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}

async fn ensure_item(pool: &PgPool, item: &SeedItem) -> Result<(), sqlx::Error> {
    let ingredients: Vec<String> = item.ingredients.iter().map(|s| (*s).to_owned()).collect();

    sqlx::query(
        "INSERT INTO menu_items (name, description, price, category_id, ingredients)
         SELECT $1, $2, $3, c.id, $4 FROM categories c WHERE c.name = $5
         ON CONFLICT (name) DO NOTHING",
    )
    .bind(item.name)
    .bind(item.description)
    .bind(item.price)
    .bind(&ingredients)
    .bind(item.category)
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed the menu with demo categories and items.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    let items = demo_menu();
    for category in ["Starters", "Mains", "Desserts", "Drinks"] {
        ensure_category(&pool, category).await?;
    }
    for item in &items {
        ensure_item(&pool, item).await?;
    }

    tracing::info!(items = items.len(), "Demo menu seeded");
    Ok(())
}
