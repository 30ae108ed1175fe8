use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod catalog;
mod entries;
mod error;
mod recommendations;
mod stats;
mod system;
mod types;
mod users;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

pub async fn create_app_state(shared: Arc<SharedState>) -> anyhow::Result<Arc<AppState>> {
    Ok(Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    }))
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared).await
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.shared.config.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/users", post(users::create_user))
        .route("/users/{user_id}", get(users::get_user))
        .route(
            "/users/{user_id}/recommendations",
            get(recommendations::recommendations_for_user),
        )
        .route("/users/{user_id}/entries", get(entries::list_entries))
        .route(
            "/users/{user_id}/entries/anime",
            put(entries::upsert_anime_entry),
        )
        .route(
            "/users/{user_id}/entries/manga",
            put(entries::upsert_manga_entry),
        )
        .route(
            "/users/{user_id}/entries/{media}/{mal_id}",
            delete(entries::remove_entry),
        )
        .route(
            "/users/{user_id}/follows/{target_id}",
            post(users::toggle_follow),
        )
        .route("/users/{user_id}/follows", get(users::follow_overview))
        .route("/stats", get(stats::community_stats))
        .route("/catalog/search", get(catalog::search_catalog))
        .route("/system/status", get(system::status))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
