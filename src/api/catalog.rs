use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CatalogSearchQuery};
use crate::clients::jikan::CatalogTitle;

/// Proxies a title search to the MAL catalog so clients can find titles to
/// track without talking to Jikan directly.
pub async fn search_catalog(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogSearchQuery>,
) -> Result<Json<ApiResponse<Vec<CatalogTitle>>>, ApiError> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }

    let results = state
        .shared
        .jikan
        .search(query.media, q)
        .await
        .map_err(|e| ApiError::catalog_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(results)))
}
