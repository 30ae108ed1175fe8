use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::domain::UserId;
use crate::services::Recommendation;

/// Personalized suggestions for one user. A fresh or inactive account gets
/// an empty list; a datastore failure fails the whole request rather than
/// returning a partial list.
pub async fn recommendations_for_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Recommendation>>>, ApiError> {
    let user_id = UserId::new(user_id);
    let recommendations = state
        .shared
        .recommendations
        .recommendations_for(&user_id)
        .await?;

    Ok(Json(ApiResponse::success(recommendations)))
}
