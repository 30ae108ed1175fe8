use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use aninotes::config::Config;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps every query on the same in-memory db
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = aninotes::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    aninotes::api::router(state)
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn create_user(app: &Router, username: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/users",
        serde_json::json!({ "username": username, "name": username }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_str().unwrap().to_string()
}

fn anime_entry_body(mal_id: i32, title: &str, score: Option<i32>) -> serde_json::Value {
    serde_json::json!({
        "mal_id": mal_id,
        "title": title,
        "status": "COMPLETED",
        "score": score,
        "episodes_watched": 12,
        "total_episodes": 12
    })
}

#[tokio::test]
async fn test_user_registration() {
    let app = spawn_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/users",
        serde_json::json!({ "username": "kenji_42", "name": "Kenji" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "kenji_42");
    assert!(body["data"]["id"].as_str().is_some());

    // Same username again conflicts
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users",
        serde_json::json!({ "username": "kenji_42", "name": "Impostor" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Malformed username is rejected outright
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users",
        serde_json::json!({ "username": "no spaces allowed", "name": "X" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entry_tracking_lifecycle() {
    let app = spawn_app().await;
    let user = create_user(&app, "tracker").await;

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{user}/entries/anime"),
        anime_entry_body(100, "X", Some(8)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, &format!("/api/users/{user}/entries?media=anime")).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["mal_id"], 100);
    assert_eq!(entries[0]["score"], 8);

    // Upsert updates in place rather than duplicating
    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{user}/entries/anime"),
        anime_entry_body(100, "X", Some(9)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, &format!("/api/users/{user}/entries?media=anime")).await;
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["score"], 9);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/users/{user}/entries/anime/100"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Removing it again is a 404
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/users/{user}/entries/anime/100"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_entry_validation() {
    let app = spawn_app().await;
    let user = create_user(&app, "strict").await;

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{user}/entries/anime"),
        anime_entry_body(100, "X", Some(11)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{user}/entries/anime"),
        anime_entry_body(100, "  ", Some(5)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown user
    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/users/ghost/entries/anime",
        anime_entry_body(100, "X", Some(5)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_follow_toggle() {
    let app = spawn_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/users/{alice}/follows/{bob}"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["following"], true);

    let (_, body) = get(&app, &format!("/api/users/{alice}/follows")).await;
    assert_eq!(body["data"]["following"], 1);
    assert_eq!(body["data"]["following_ids"][0], serde_json::json!(bob));

    // Toggling again unfollows
    let (_, body) = send_json(
        &app,
        "POST",
        &format!("/api/users/{alice}/follows/{bob}"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(body["data"]["following"], false);

    // Self-follow is rejected
    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/users/{alice}/follows/{alice}"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_endpoint() {
    let app = spawn_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;

    // No history yet: still 200, empty list
    let (status, body) = get(&app, &format!("/api/users/{alice}/recommendations")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    send_json(
        &app,
        "POST",
        &format!("/api/users/{alice}/follows/{bob}"),
        serde_json::json!({}),
    )
    .await;
    send_json(
        &app,
        "PUT",
        &format!("/api/users/{bob}/entries/anime"),
        anime_entry_body(100, "X", Some(9)),
    )
    .await;

    let (status, body) = get(&app, &format!("/api/users/{alice}/recommendations")).await;
    assert_eq!(status, StatusCode::OK);
    let recs = body["data"].as_array().unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["mal_id"], 100);
    assert_eq!(recs[0]["media_type"], "anime");
    assert_eq!(recs[0]["reason"], "Highly rated by someone you follow");
}

#[tokio::test]
async fn test_community_stats() {
    let app = spawn_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;

    for user in [&alice, &bob] {
        send_json(
            &app,
            "PUT",
            &format!("/api/users/{user}/entries/anime"),
            anime_entry_body(100, "X", Some(8)),
        )
        .await;
    }

    let (status, body) = get(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totals"]["users"], 2);
    assert_eq!(body["data"]["totals"]["anime_tracked"], 2);
    assert_eq!(body["data"]["totals"]["episodes_watched"], 24);

    let popular = body["data"]["popular_anime"].as_array().unwrap();
    assert_eq!(popular.len(), 1);
    assert_eq!(popular[0]["mal_id"], 100);
    assert_eq!(popular[0]["trackers"], 2);

    let leaders = body["data"]["most_entries"].as_array().unwrap();
    assert_eq!(leaders.len(), 2);
    assert_eq!(leaders[0]["value"], 1);
}

#[tokio::test]
async fn test_system_status() {
    let app = spawn_app().await;

    let (status, body) = get(&app, "/api/system/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database_ok"], true);
    assert_eq!(body["data"]["users"], 0);
    assert!(body["data"]["version"].as_str().is_some());
}

#[tokio::test]
async fn test_catalog_search_rejects_blank_query() {
    let app = spawn_app().await;

    let (status, _) = get(&app, "/api/catalog/search?media=anime&q=%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let app = spawn_app().await;

    let (status, _) = get(&app, "/api/users/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/users/ghost/entries?media=manga").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
