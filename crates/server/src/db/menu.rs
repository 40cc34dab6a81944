//! Menu catalog repositories (categories and menu items).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use tamarind_core::{CategoryId, MenuItemId};

use super::{RepositoryError, map_unique_violation};
use crate::models::{Category, MenuItem};

/// Fields required to insert or replace a menu item.
#[derive(Debug)]
pub struct NewMenuItem<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: Decimal,
    pub category_id: CategoryId,
    pub ingredients: &'a [String],
    pub is_available: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    category_id: Uuid,
    category_name: String,
    ingredients: Vec<String>,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(r: MenuItemRow) -> Self {
        Self {
            id: MenuItemId::from_uuid(r.id),
            name: r.name,
            description: r.description,
            price: r.price,
            category_id: CategoryId::from_uuid(r.category_id),
            category_name: r.category_name,
            ingredients: r.ingredients,
            is_available: r.is_available,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const MENU_ITEM_COLUMNS: &str = "m.id, m.name, m.description, m.price, m.category_id, \
                                 c.name AS category_name, m.ingredients, m.is_available, \
                                 m.created_at, m.updated_at";

/// Repository for menu categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<(Uuid, String, DateTime<Utc>)> =
            sqlx::query_as("SELECT id, name, created_at FROM categories ORDER BY name ASC")
                .fetch_all(self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, created_at)| Category {
                id: CategoryId::from_uuid(id),
                name,
                created_at,
            })
            .collect())
    }

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    pub async fn create(&self, name: &str) -> Result<Category, RepositoryError> {
        let row: (Uuid, String, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "category name already exists"))?;

        Ok(Category {
            id: CategoryId::from_uuid(row.0),
            name: row.1,
            created_at: row.2,
        })
    }

    /// Check that a category exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(self.pool)
            .await?;

        Ok(row.0)
    }
}

/// Repository for menu items.
pub struct MenuItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuItemRepository<'a> {
    /// Create a new menu item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a menu item by ID, hydrated with its category name.
    ///
    /// Order creation uses this for the availability check and price snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items m \
             JOIN categories c ON m.category_id = c.id WHERE m.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(MenuItem::from))
    }

    /// List all menu items, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items m \
             JOIN categories c ON m.category_id = c.id ORDER BY m.name ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    /// List menu items in one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items m \
             JOIN categories c ON m.category_id = c.id \
             WHERE m.category_id = $1 ORDER BY m.name ASC"
        ))
        .bind(category_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    /// Search menu items by case-insensitive name substring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<MenuItem>, RepositoryError> {
        let pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
        let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items m \
             JOIN categories c ON m.category_id = c.id \
             WHERE m.name ILIKE $1 ORDER BY m.name ASC"
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    /// Create a new menu item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    pub async fn create(&self, item: NewMenuItem<'_>) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            "WITH inserted AS (
                 INSERT INTO menu_items (name, description, price, category_id, ingredients, is_available)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING id, name, description, price, category_id, ingredients,
                           is_available, created_at, updated_at
             )
             SELECT m.id, m.name, m.description, m.price, m.category_id,
                    c.name AS category_name, m.ingredients, m.is_available,
                    m.created_at, m.updated_at
             FROM inserted m JOIN categories c ON m.category_id = c.id",
        )
        .bind(item.name)
        .bind(item.description)
        .bind(item.price)
        .bind(item.category_id.as_uuid())
        .bind(item.ingredients)
        .bind(item.is_available)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "menu item name already exists"))?;

        Ok(row.into())
    }

    /// Replace a menu item's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn update(
        &self,
        id: MenuItemId,
        item: NewMenuItem<'_>,
    ) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            "WITH updated AS (
                 UPDATE menu_items
                 SET name = $1, description = $2, price = $3, category_id = $4,
                     ingredients = $5, is_available = $6, updated_at = NOW()
                 WHERE id = $7
                 RETURNING id, name, description, price, category_id, ingredients,
                           is_available, created_at, updated_at
             )
             SELECT m.id, m.name, m.description, m.price, m.category_id,
                    c.name AS category_name, m.ingredients, m.is_available,
                    m.created_at, m.updated_at
             FROM updated m JOIN categories c ON m.category_id = c.id",
        )
        .bind(item.name)
        .bind(item.description)
        .bind(item.price)
        .bind(item.category_id.as_uuid())
        .bind(item.ingredients)
        .bind(item.is_available)
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "menu item name already exists"))?;

        row.map_or(Err(RepositoryError::NotFound), |r| Ok(r.into()))
    }

    /// Delete a menu item.
    ///
    /// Returns `true` if the item was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: MenuItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
