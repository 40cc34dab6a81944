//! Order repository.
//!
//! Order creation writes the header and all lines inside a single
//! transaction, so a failed line insert never leaves a partial order behind.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use tamarind_core::{MenuItemId, OrderId, OrderItemId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

/// One validated, price-snapshotted line ready to insert.
#[derive(Debug)]
pub struct NewOrderLine {
    pub menu_item_id: MenuItemId,
    pub quantity: i32,
    pub excluded_ingredients: Vec<String>,
    /// Unit price captured from the menu item at validation time.
    pub unit_price: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderHeaderRow {
    id: Uuid,
    user_id: Uuid,
    user_name: String,
    total_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderHeaderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let status = self.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            user_name: self.user_name,
            total_price: self.total_price,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    menu_item_id: Uuid,
    menu_item_name: String,
    category_name: String,
    quantity: i32,
    excluded_ingredients: Vec<String>,
    unit_price: Decimal,
    created_at: DateTime<Utc>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(r: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::from_uuid(r.id),
            menu_item_id: MenuItemId::from_uuid(r.menu_item_id),
            menu_item_name: r.menu_item_name,
            category_name: r.category_name,
            quantity: r.quantity,
            excluded_ingredients: r.excluded_ingredients,
            unit_price: r.unit_price,
            created_at: r.created_at,
        }
    }
}

const ORDER_COLUMNS: &str = "o.id, o.user_id, u.name AS user_name, o.total_price, \
                             o.status, o.created_at, o.updated_at";

const ORDER_ITEM_COLUMNS: &str = "oi.id, oi.order_id, oi.menu_item_id, \
                                  m.name AS menu_item_name, c.name AS category_name, \
                                  oi.quantity, oi.excluded_ingredients, oi.unit_price, \
                                  oi.created_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Atomically insert an order header and all of its lines.
    ///
    /// The stored total is the caller-computed sum over the snapshotted
    /// lines; either everything commits or nothing does.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails. The
    /// transaction is rolled back on drop.
    pub async fn create(
        &self,
        user_id: UserId,
        total_price: Decimal,
        lines: &[NewOrderLine],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (order_id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO orders (user_id, total_price, status) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id.as_uuid())
        .bind(total_price)
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                "INSERT INTO order_items \
                 (order_id, menu_item_id, quantity, excluded_ingredients, unit_price) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(order_id)
            .bind(line.menu_item_id.as_uuid())
            .bind(line.quantity)
            .bind(&line.excluded_ingredients)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_by_id(OrderId::from_uuid(order_id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get a single order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` for an unknown stored status.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let header = sqlx::query_as::<_, OrderHeaderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN users u ON o.user_id = u.id \
             WHERE o.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let items = self.items_for(id).await?;
        Ok(Some(header.into_order(items)?))
    }

    /// List all orders placed by one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderHeaderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN users u ON o.user_id = u.id \
             WHERE o.user_id = $1 ORDER BY o.created_at DESC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        self.hydrate(headers).await
    }

    /// List all orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderHeaderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN users u ON o.user_id = u.id \
             ORDER BY o.created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.hydrate(headers).await
    }

    /// List all orders in one status, oldest first (kitchen queue order).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderHeaderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN users u ON o.user_id = u.id \
             WHERE o.status = $1 ORDER BY o.created_at ASC"
        ))
        .bind(status.as_str())
        .fetch_all(self.pool)
        .await?;

        self.hydrate(headers).await
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let result =
            sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
                .bind(status.as_str())
                .bind(id.as_uuid())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete an order. Lines are removed by the cascade.
    ///
    /// Returns `true` if the order was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn items_for(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items oi \
             JOIN menu_items m ON oi.menu_item_id = m.id \
             JOIN categories c ON m.category_id = c.id \
             WHERE oi.order_id = $1 ORDER BY oi.created_at ASC"
        ))
        .bind(order_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    /// Attach lines to a batch of headers with one items query.
    async fn hydrate(
        &self,
        headers: Vec<OrderHeaderRow>,
    ) -> Result<Vec<Order>, RepositoryError> {
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items oi \
             JOIN menu_items m ON oi.menu_item_id = m.id \
             JOIN categories c ON m.category_id = c.id \
             WHERE oi.order_id = ANY($1) ORDER BY oi.created_at ASC"
        ))
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_order: std::collections::HashMap<Uuid, Vec<OrderItem>> =
            std::collections::HashMap::new();
        for row in rows {
            items_by_order
                .entry(row.order_id)
                .or_default()
                .push(row.into());
        }

        headers
            .into_iter()
            .map(|h| {
                let items = items_by_order.remove(&h.id).unwrap_or_default();
                h.into_order(items)
            })
            .collect()
    }
}
