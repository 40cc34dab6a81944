//! Report aggregation queries.
//!
//! Both queries count orders in any status except `Cancelled`, and treat the
//! requested range as inclusive of both endpoint dates (the SQL upper bound
//! is the day after `end`, exclusive). Revenue is computed from the
//! snapshotted line prices, never from current menu prices.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use tamarind_core::{MenuItemId, OrderStatus};

use super::RepositoryError;
use crate::models::SalesReportItem;

const COUNTED_STATUS_FILTER: &str = "o.status <> 'Cancelled'";

/// UTC instant bounds `[start 00:00, end + 1 day 00:00)` for a date range.
fn range_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let lower = start.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let upper = (end + TimeDelta::days(1))
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();
    (lower, upper)
}

#[derive(Debug, sqlx::FromRow)]
struct SalesLineRow {
    menu_item_id: Uuid,
    menu_item_name: String,
    category_name: String,
    quantity_sold: i64,
    total_revenue: Decimal,
}

/// Repository for report aggregations.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Per-menu-item sales rows for the range, sorted by revenue descending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_lines(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SalesReportItem>, RepositoryError> {
        let (lower, upper) = range_bounds(start, end);

        let rows = sqlx::query_as::<_, SalesLineRow>(&format!(
            "SELECT m.id AS menu_item_id, m.name AS menu_item_name, \
                    c.name AS category_name, \
                    SUM(oi.quantity)::BIGINT AS quantity_sold, \
                    SUM(oi.quantity * oi.unit_price) AS total_revenue \
             FROM order_items oi \
             JOIN orders o ON oi.order_id = o.id \
             JOIN menu_items m ON oi.menu_item_id = m.id \
             JOIN categories c ON m.category_id = c.id \
             WHERE o.created_at >= $1 AND o.created_at < $2 AND {COUNTED_STATUS_FILTER} \
             GROUP BY m.id, m.name, c.name \
             ORDER BY total_revenue DESC, m.name ASC"
        ))
        .bind(lower)
        .bind(upper)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| SalesReportItem {
                menu_item_id: MenuItemId::from_uuid(r.menu_item_id),
                menu_item_name: r.menu_item_name,
                category_name: r.category_name,
                quantity_sold: r.quantity_sold,
                total_revenue: r.total_revenue,
            })
            .collect())
    }

    /// Total revenue for the range, from the stored order totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revenue_total(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Decimal, RepositoryError> {
        let (lower, upper) = range_bounds(start, end);

        let (total,): (Decimal,) = sqlx::query_as(&format!(
            "SELECT COALESCE(SUM(o.total_price), 0) FROM orders o \
             WHERE o.created_at >= $1 AND o.created_at < $2 AND {COUNTED_STATUS_FILTER}"
        ))
        .bind(lower)
        .bind(upper)
        .fetch_one(self.pool)
        .await?;

        Ok(total)
    }
}
