use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MediaQuery};
use crate::domain::MediaType;
use crate::models::entry::{AnimeEntryInput, MangaEntryInput, TrackedEntry};

pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<MediaQuery>,
) -> Result<Json<ApiResponse<Vec<TrackedEntry>>>, ApiError> {
    let entries = state
        .shared
        .tracking
        .list_entries(query.media, &user_id)
        .await?;

    Ok(Json(ApiResponse::success(entries)))
}

pub async fn upsert_anime_entry(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(input): Json<AnimeEntryInput>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .shared
        .tracking
        .upsert_anime_entry(&user_id, input)
        .await?;

    Ok(Json(ApiResponse::success(())))
}

pub async fn upsert_manga_entry(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(input): Json<MangaEntryInput>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .shared
        .tracking
        .upsert_manga_entry(&user_id, input)
        .await?;

    Ok(Json(ApiResponse::success(())))
}

pub async fn remove_entry(
    State(state): State<Arc<AppState>>,
    Path((user_id, media, mal_id)): Path<(String, MediaType, i32)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .shared
        .tracking
        .remove_entry(media, &user_id, mal_id)
        .await?;

    Ok(Json(ApiResponse::success(())))
}
