use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::stats::CommunityStats;

pub async fn community_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CommunityStats>>, ApiError> {
    let stats = state.shared.stats.overview().await?;

    Ok(Json(ApiResponse::success(stats)))
}
