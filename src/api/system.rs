use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};
use crate::domain::MediaType;

pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database_ok = state.shared.store.ping().await.is_ok();

    let (users, anime_entries, manga_entries) = tokio::join!(
        state.shared.store.count_users(),
        state.shared.store.count_entries(MediaType::Anime),
        state.shared.store.count_entries(MediaType::Manga),
    );

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        database_ok,
        users: users?,
        anime_entries: anime_entries?,
        manga_entries: manga_entries?,
    })))
}
