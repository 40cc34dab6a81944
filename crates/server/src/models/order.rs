//! Order models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tamarind_core::{MenuItemId, OrderId, OrderItemId, OrderStatus, UserId};

/// An order with its line items, hydrated for display.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub user_name: String,
    /// Derived at creation from the line snapshots and stored; never
    /// recomputed on read.
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// A single order line.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub menu_item_id: MenuItemId,
    pub menu_item_name: String,
    pub category_name: String,
    pub quantity: i32,
    pub excluded_ingredients: Vec<String>,
    /// Unit price captured when the order was placed. Immutable even if the
    /// menu item's price later changes.
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Line total: quantity times the snapshotted unit price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            id: OrderItemId::new(),
            menu_item_id: MenuItemId::new(),
            menu_item_name: "Pad Thai".to_owned(),
            category_name: "Mains".to_owned(),
            quantity: 3,
            excluded_ingredients: vec![],
            unit_price: Decimal::new(1250, 2),
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total(), Decimal::new(3750, 2));
    }
}
