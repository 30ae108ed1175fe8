use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CreateUserRequest};
use crate::services::{FollowOverview, FollowToggle, UserProfile};

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let user = state
        .shared
        .tracking
        .create_user(&request.username, &request.name, request.image.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let user = state.shared.tracking.get_user(&user_id).await?;

    Ok(Json(ApiResponse::success(user)))
}

pub async fn toggle_follow(
    State(state): State<Arc<AppState>>,
    Path((user_id, target_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<FollowToggle>>, ApiError> {
    let toggle = state
        .shared
        .tracking
        .toggle_follow(&user_id, &target_id)
        .await?;

    Ok(Json(ApiResponse::success(toggle)))
}

pub async fn follow_overview(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<FollowOverview>>, ApiError> {
    let overview = state.shared.tracking.follow_overview(&user_id).await?;

    Ok(Json(ApiResponse::success(overview)))
}
