//! Dashboard API endpoint.

use axum::extract::State;
use chrono::Local;

use super::{error, success, ApiResult};
use crate::models::DashboardStats;
use crate::AppState;

/// GET /api/dashboard/stats - Farm totals and current-month figures.
pub async fn get_dashboard_stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    match state.repo.dashboard_stats(Local::now().date_naive()).await {
        Ok(stats) => success(stats),
        Err(e) => error(e),
    }
}
