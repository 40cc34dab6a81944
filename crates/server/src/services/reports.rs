//! Cached sales and revenue reports.
//!
//! Reports over a date range are expensive aggregations, so generated
//! payloads are kept in an in-process TTL cache keyed by report kind and
//! range. A cache hit returns the stored payload with `from_cache` flipped
//! to `true`; staleness within the TTL is accepted by design.

use chrono::{NaiveDate, Utc};
use moka::future::Cache;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::db::reports::ReportRepository;
use crate::models::{RevenueReport, SalesReport, SalesReportItem};

/// Errors from report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The start date is after the end date.
    #[error("start date must not be after end date")]
    InvalidRange,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A cached report payload of either kind.
#[derive(Debug, Clone)]
pub enum CachedReport {
    Sales(SalesReport),
    Revenue(RevenueReport),
}

/// Cache key: report kind plus the compact date range, e.g.
/// `sales:20250301-20250331`.
fn cache_key(kind: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{kind}:{}-{}",
        start.format("%Y%m%d"),
        end.format("%Y%m%d")
    )
}

/// Totals across the per-item rows: (revenue, items sold).
fn aggregate_sales(items: &[SalesReportItem]) -> (Decimal, i64) {
    items.iter().fold(
        (Decimal::ZERO, 0),
        |(revenue, count), item| (revenue + item.total_revenue, count + item.quantity_sold),
    )
}

/// Generates reports, serving repeats from the TTL cache.
pub struct ReportService<'a> {
    pool: &'a PgPool,
    cache: &'a Cache<String, CachedReport>,
}

impl<'a> ReportService<'a> {
    /// Create a new report service over the shared cache.
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a Cache<String, CachedReport>) -> Self {
        Self { pool, cache }
    }

    /// Itemized sales report for an inclusive date range.
    ///
    /// `force_refresh` bypasses the cache lookup; the fresh payload still
    /// replaces the cached entry.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidRange` when `start > end`.
    pub async fn sales_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        force_refresh: bool,
    ) -> Result<SalesReport, ReportError> {
        if start > end {
            return Err(ReportError::InvalidRange);
        }

        let key = cache_key("sales", start, end);

        if !force_refresh
            && let Some(CachedReport::Sales(mut report)) = self.cache.get(&key).await
        {
            report.from_cache = true;
            return Ok(report);
        }

        let items = ReportRepository::new(self.pool).sales_lines(start, end).await?;
        let (total_revenue, total_items_sold) = aggregate_sales(&items);

        let report = SalesReport {
            start_date: start,
            end_date: end,
            total_revenue,
            total_items_sold,
            items,
            generated_at: Utc::now(),
            from_cache: false,
        };

        self.cache
            .insert(key, CachedReport::Sales(report.clone()))
            .await;

        Ok(report)
    }

    /// Revenue-only report for an inclusive date range.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidRange` when `start > end`.
    pub async fn revenue_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        force_refresh: bool,
    ) -> Result<RevenueReport, ReportError> {
        if start > end {
            return Err(ReportError::InvalidRange);
        }

        let key = cache_key("revenue", start, end);

        if !force_refresh
            && let Some(CachedReport::Revenue(mut report)) = self.cache.get(&key).await
        {
            report.from_cache = true;
            return Ok(report);
        }

        let total_revenue = ReportRepository::new(self.pool)
            .revenue_total(start, end)
            .await?;

        let report = RevenueReport {
            start_date: start,
            end_date: end,
            total_revenue,
            generated_at: Utc::now(),
            from_cache: false,
        };

        self.cache
            .insert(key, CachedReport::Revenue(report.clone()))
            .await;

        Ok(report)
    }
}
