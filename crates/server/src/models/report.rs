//! Report payloads.
//!
//! These are the values stored in the report cache, so they derive both
//! `Serialize` and `Deserialize` and are cheap to clone.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tamarind_core::MenuItemId;

/// Itemized sales report over a date range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_revenue: Decimal,
    pub total_items_sold: i64,
    /// Per-menu-item rows, sorted by revenue descending.
    pub items: Vec<SalesReportItem>,
    pub generated_at: DateTime<Utc>,
    /// Whether this payload was served from the cache accelerator.
    pub from_cache: bool,
}

/// One row of the itemized sales report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesReportItem {
    pub menu_item_id: MenuItemId,
    pub menu_item_name: String,
    pub category_name: String,
    pub quantity_sold: i64,
    /// Sum of `quantity * snapshotted unit price` across counted orders.
    pub total_revenue: Decimal,
}

/// Revenue-only report over a date range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_revenue: Decimal,
    pub generated_at: DateTime<Utc>,
    /// Whether this payload was served from the cache accelerator.
    pub from_cache: bool,
}
