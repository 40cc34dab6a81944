//! Order placement.
//!
//! Validation, price snapshotting, and the total computation happen here;
//! the repository only sees fully validated lines.

use rust_decimal::Decimal;
use thiserror::Error;

use sqlx::PgPool;
use tamarind_core::{MenuItemId, UserId};

use crate::db::RepositoryError;
use crate::db::menu::MenuItemRepository;
use crate::db::orders::{NewOrderLine, OrderRepository};
use crate::db::users::UserRepository;
use crate::models::Order;

/// Errors from order placement.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request contained no lines.
    #[error("order must contain at least one item")]
    Empty,

    /// The ordering user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// A requested menu item does not exist.
    #[error("menu item {0} does not exist")]
    UnknownMenuItem(MenuItemId),

    /// A requested menu item is currently unavailable.
    #[error("'{0}' is currently unavailable")]
    ItemUnavailable(String),

    /// A line quantity was zero or negative.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One requested line, as it arrives from the client.
#[derive(Debug)]
pub struct OrderLineRequest {
    pub menu_item_id: MenuItemId,
    pub quantity: i32,
    pub excluded_ingredients: Vec<String>,
}

/// Sum of `quantity * unit_price` over snapshotted lines.
fn compute_total(lines: &[NewOrderLine]) -> Decimal {
    lines
        .iter()
        .map(|line| Decimal::from(line.quantity) * line.unit_price)
        .sum()
}

/// Validates and places orders.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Validate every requested line, snapshot prices, and atomically
    /// insert the order in `Pending` status.
    ///
    /// # Errors
    ///
    /// Returns a validation variant if any line is empty, unknown,
    /// unavailable, or has a bad quantity; nothing is written in that case.
    pub async fn place_order(
        &self,
        user_id: UserId,
        requests: Vec<OrderLineRequest>,
    ) -> Result<Order, OrderError> {
        if requests.is_empty() {
            return Err(OrderError::Empty);
        }

        // The token may outlive the account it was issued for.
        if UserRepository::new(self.pool).get_by_id(user_id).await?.is_none() {
            return Err(OrderError::UserNotFound);
        }

        let menu = MenuItemRepository::new(self.pool);
        let mut lines = Vec::with_capacity(requests.len());

        for request in requests {
            if request.quantity < 1 {
                return Err(OrderError::InvalidQuantity);
            }

            let item = menu
                .get_by_id(request.menu_item_id)
                .await?
                .ok_or(OrderError::UnknownMenuItem(request.menu_item_id))?;

            if !item.is_available {
                return Err(OrderError::ItemUnavailable(item.name));
            }

            lines.push(NewOrderLine {
                menu_item_id: request.menu_item_id,
                quantity: request.quantity,
                excluded_ingredients: request.excluded_ingredients,
                unit_price: item.price,
            });
        }

        let total = compute_total(&lines);
        let order = OrderRepository::new(self.pool)
            .create(user_id, total, &lines)
            .await?;

        Ok(order)
    }
}
