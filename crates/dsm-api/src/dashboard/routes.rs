use axum::{Router, extract::State, routing::get};
use chrono::Utc;
use dsm_db::{models::SessionOverview, repositories::dashboard};

use super::model::{DashboardSummary, UpcomingQuery};
use crate::{ApiState, error::ApiError, extract::ListQuery, response::ApiResponse};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/dashboard/stats", get(stats))
        .route("/dashboard/upcoming-sessions", get(upcoming_sessions))
}

async fn stats(State(state): State<ApiState>) -> Result<ApiResponse<DashboardSummary>, ApiError> {
    let stats = dashboard::stats(&state.pool, Utc::now().date_naive()).await?;

    Ok(ApiResponse::ok(stats.into()))
}

async fn upcoming_sessions(
    State(state): State<ApiState>,
    ListQuery(query): ListQuery<UpcomingQuery>,
) -> Result<ApiResponse<Vec<SessionOverview>>, ApiError> {
    let sessions =
        dashboard::upcoming_sessions(&state.pool, Utc::now().date_naive(), query.limit()).await?;

    Ok(ApiResponse::ok(sessions))
}
