//! Report route handlers. Admin only.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{RevenueReport, SalesReport};
use crate::services::reports::ReportService;
use crate::state::AppState;

/// Build the reports router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(sales_report))
        .route("/revenue", get(revenue_report))
}

/// Date range parameters shared by both reports.
#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Bypass the cache and regenerate; the fresh payload is re-cached.
    #[serde(default)]
    pub force_refresh: bool,
}

/// Itemized sales report for an inclusive date range.
///
/// # Errors
///
/// Returns 400 when `start_date > end_date`.
pub async fn sales_report(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<SalesReport>> {
    let report = ReportService::new(state.pool(), state.report_cache())
        .sales_report(params.start_date, params.end_date, params.force_refresh)
        .await?;

    Ok(Json(report))
}

/// Revenue total for an inclusive date range.
///
/// # Errors
///
/// Returns 400 when `start_date > end_date`.
pub async fn revenue_report(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<RevenueReport>> {
    let report = ReportService::new(state.pool(), state.report_cache())
        .revenue_report(params.start_date, params.end_date, params.force_refresh)
        .await?;

    Ok(Json(report))
}
