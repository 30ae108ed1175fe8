//! End-to-end tests for the recommendation engine against a seeded
//! in-memory database.

use std::collections::HashSet;
use std::sync::Arc;

use aninotes::config::Config;
use aninotes::db::Store;
use aninotes::domain::{MediaType, UserId};
use aninotes::models::entry::{AnimeEntryInput, MangaEntryInput};
use aninotes::services::recommendation_service::FOLLOW_REASON;
use aninotes::state::SharedState;

async fn test_state() -> Arc<SharedState> {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps every query on the same in-memory db
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    Arc::new(
        SharedState::new(config)
            .await
            .expect("Failed to create shared state"),
    )
}

async fn create_user(store: &Store, username: &str) -> String {
    store
        .create_user(username, username, None)
        .await
        .expect("Failed to create user")
        .id
}

fn anime_input(
    mal_id: i32,
    title: &str,
    score: Option<i32>,
    mal_score: Option<f32>,
) -> AnimeEntryInput {
    AnimeEntryInput {
        mal_id,
        title: title.to_string(),
        image_url: None,
        synopsis: None,
        total_episodes: Some(12),
        media_format: Some("TV".to_string()),
        airing_status: None,
        mal_score,
        status: "COMPLETED".to_string(),
        score,
        episodes_watched: 12,
        notes: None,
    }
}

fn manga_input(
    mal_id: i32,
    title: &str,
    score: Option<i32>,
    mal_score: Option<f32>,
) -> MangaEntryInput {
    MangaEntryInput {
        mal_id,
        title: title.to_string(),
        image_url: None,
        synopsis: None,
        total_chapters: None,
        total_volumes: None,
        media_format: Some("Manga".to_string()),
        publishing_status: None,
        mal_score,
        status: "READING".to_string(),
        score,
        chapters_read: 0,
        volumes_read: 0,
        notes: None,
    }
}

#[tokio::test]
async fn empty_history_user_gets_empty_list() {
    let state = test_state().await;
    let user = create_user(&state.store, "newcomer").await;

    let recommendations = state
        .recommendations
        .recommendations_for(&UserId::new(user))
        .await
        .unwrap();

    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn follow_tier_surfaces_followed_users_favorites() {
    let state = test_state().await;
    let a = create_user(&state.store, "alice").await;
    let b = create_user(&state.store, "bob").await;

    state.store.add_follow(&a, &b).await.unwrap();
    state
        .store
        .upsert_anime_entry(&b, &anime_input(100, "X", Some(9), None))
        .await
        .unwrap();

    let recommendations = state
        .recommendations
        .recommendations_for(&UserId::new(a))
        .await
        .unwrap();

    assert_eq!(recommendations.len(), 1);
    let rec = &recommendations[0];
    assert_eq!(rec.mal_id, 100);
    assert_eq!(rec.title, "X");
    assert_eq!(rec.media_type, MediaType::Anime);
    assert_eq!(rec.reason, FOLLOW_REASON);
    assert!(rec.entry.is_some(), "representative entry should be attached");
}

#[tokio::test]
async fn follow_tier_keeps_highest_score_across_followed_users() {
    let state = test_state().await;
    let a = create_user(&state.store, "alice").await;
    let b = create_user(&state.store, "bob").await;
    let c = create_user(&state.store, "carol").await;

    state.store.add_follow(&a, &b).await.unwrap();
    state.store.add_follow(&a, &c).await.unwrap();

    // Both followed users rated the same title; one also rated another
    state
        .store
        .upsert_anime_entry(&b, &anime_input(100, "X", Some(7), None))
        .await
        .unwrap();
    state
        .store
        .upsert_anime_entry(&c, &anime_input(100, "X", Some(10), None))
        .await
        .unwrap();
    state
        .store
        .upsert_anime_entry(&c, &anime_input(101, "Y", Some(8), None))
        .await
        .unwrap();

    let recommendations = state
        .recommendations
        .recommendations_for(&UserId::new(a))
        .await
        .unwrap();

    assert_eq!(recommendations.len(), 2);
    // Highest score seen for id 100 is 10, so it outranks id 101
    assert_eq!(recommendations[0].mal_id, 100);
    assert_eq!(recommendations[1].mal_id, 101);
}

#[tokio::test]
async fn platform_tier_fills_when_user_follows_nobody() {
    let state = test_state().await;
    let a = create_user(&state.store, "alice").await;
    let c = create_user(&state.store, "carol").await;

    state
        .store
        .upsert_manga_entry(&c, &manga_input(200, "Y", None, Some(8.2)))
        .await
        .unwrap();

    let recommendations = state
        .recommendations
        .recommendations_for(&UserId::new(a))
        .await
        .unwrap();

    assert_eq!(recommendations.len(), 1);
    let rec = &recommendations[0];
    assert_eq!(rec.mal_id, 200);
    assert_eq!(rec.media_type, MediaType::Manga);
    assert_eq!(rec.reason, "MAL score 8.2 · tracked on AniNotes");
}

#[tokio::test]
async fn platform_tier_ignores_low_rated_titles() {
    let state = test_state().await;
    let a = create_user(&state.store, "alice").await;
    let c = create_user(&state.store, "carol").await;

    state
        .store
        .upsert_anime_entry(&c, &anime_input(210, "Mediocre", None, Some(7.4)))
        .await
        .unwrap();

    let recommendations = state
        .recommendations
        .recommendations_for(&UserId::new(a))
        .await
        .unwrap();

    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn collaborative_tier_recommends_similar_users_titles() {
    let state = test_state().await;
    let a = create_user(&state.store, "alice").await;
    let d = create_user(&state.store, "dora").await;
    let e = create_user(&state.store, "eli").await;

    // Alice loves two titles; no platform scores anywhere so only the
    // similar-taste tier can contribute
    state
        .store
        .upsert_anime_entry(&a, &anime_input(300, "Shared One", Some(8), None))
        .await
        .unwrap();
    state
        .store
        .upsert_anime_entry(&a, &anime_input(310, "Shared Two", Some(8), None))
        .await
        .unwrap();

    // Dora and Eli both rated the same two titles highly, plus one more
    for user in [&d, &e] {
        state
            .store
            .upsert_anime_entry(user, &anime_input(300, "Shared One", Some(8), None))
            .await
            .unwrap();
        state
            .store
            .upsert_anime_entry(user, &anime_input(310, "Shared Two", Some(7), None))
            .await
            .unwrap();
        state
            .store
            .upsert_anime_entry(user, &anime_input(400, "Hidden Gem", Some(7), None))
            .await
            .unwrap();
    }

    let recommendations = state
        .recommendations
        .recommendations_for(&UserId::new(a))
        .await
        .unwrap();

    assert_eq!(recommendations.len(), 1);
    let rec = &recommendations[0];
    assert_eq!(rec.mal_id, 400);
    assert_eq!(rec.reason, "Liked by 2 users with similar taste");
}

#[tokio::test]
async fn collaborative_tier_requires_two_shared_titles() {
    let state = test_state().await;
    let a = create_user(&state.store, "alice").await;
    let d = create_user(&state.store, "dora").await;

    // Only one shared title, so Dora does not count as similar
    state
        .store
        .upsert_anime_entry(&a, &anime_input(300, "Shared One", Some(8), None))
        .await
        .unwrap();
    state
        .store
        .upsert_anime_entry(&d, &anime_input(300, "Shared One", Some(8), None))
        .await
        .unwrap();
    state
        .store
        .upsert_anime_entry(&d, &anime_input(400, "Hidden Gem", Some(9), None))
        .await
        .unwrap();

    let recommendations = state
        .recommendations
        .recommendations_for(&UserId::new(a))
        .await
        .unwrap();

    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn own_titles_are_never_recommended() {
    let state = test_state().await;
    let a = create_user(&state.store, "alice").await;
    let b = create_user(&state.store, "bob").await;

    state.store.add_follow(&a, &b).await.unwrap();

    // Alice already tracks 500, unrated
    state
        .store
        .upsert_anime_entry(&a, &anime_input(500, "Known", None, None))
        .await
        .unwrap();
    state
        .store
        .upsert_anime_entry(&b, &anime_input(500, "Known", Some(9), None))
        .await
        .unwrap();
    state
        .store
        .upsert_anime_entry(&b, &anime_input(501, "New To Alice", Some(8), None))
        .await
        .unwrap();

    let recommendations = state
        .recommendations
        .recommendations_for(&UserId::new(a))
        .await
        .unwrap();

    let ids: Vec<i32> = recommendations.iter().map(|r| r.mal_id).collect();
    assert!(!ids.contains(&500));
    assert!(ids.contains(&501));
}

#[tokio::test]
async fn output_is_capped_and_duplicate_free() {
    let state = test_state().await;
    let a = create_user(&state.store, "alice").await;
    let b = create_user(&state.store, "bob").await;
    let c = create_user(&state.store, "carol").await;

    state.store.add_follow(&a, &b).await.unwrap();

    // 6 highly rated anime from the followed user, platform-popular titles
    // from a stranger overlapping two of them
    for i in 0..6 {
        state
            .store
            .upsert_anime_entry(&b, &anime_input(600 + i, &format!("F{i}"), Some(8), None))
            .await
            .unwrap();
    }
    for i in 0..8 {
        state
            .store
            .upsert_anime_entry(
                &c,
                &anime_input(604 + i, &format!("P{i}"), None, Some(8.5)),
            )
            .await
            .unwrap();
    }

    let recommendations = state
        .recommendations
        .recommendations_for(&UserId::new(a))
        .await
        .unwrap();

    assert!(recommendations.len() <= 8);

    let mut seen = HashSet::new();
    for rec in &recommendations {
        assert!(
            seen.insert((rec.media_type, rec.mal_id)),
            "duplicate recommendation for {} {}",
            rec.media_type,
            rec.mal_id
        );
    }
}

#[tokio::test]
async fn follow_tier_short_circuits_later_tiers() {
    let state = test_state().await;
    let a = create_user(&state.store, "alice").await;
    let b = create_user(&state.store, "bob").await;
    let c = create_user(&state.store, "carol").await;

    state.store.add_follow(&a, &b).await.unwrap();

    // The follow graph alone can fill the quota; platform data exists but
    // should never be reached
    for i in 0..10 {
        state
            .store
            .upsert_anime_entry(&b, &anime_input(700 + i, &format!("F{i}"), Some(8), None))
            .await
            .unwrap();
    }
    state
        .store
        .upsert_anime_entry(&c, &anime_input(800, "Popular", None, Some(9.0)))
        .await
        .unwrap();

    let recommendations = state
        .recommendations
        .recommendations_for(&UserId::new(a))
        .await
        .unwrap();

    assert_eq!(recommendations.len(), 8);
    for rec in &recommendations {
        assert_eq!(rec.reason, FOLLOW_REASON);
    }
}

#[tokio::test]
async fn tiers_stack_until_quota_is_reached() {
    let state = test_state().await;
    let a = create_user(&state.store, "alice").await;
    let b = create_user(&state.store, "bob").await;
    let c = create_user(&state.store, "carol").await;

    state.store.add_follow(&a, &b).await.unwrap();

    state
        .store
        .upsert_anime_entry(&b, &anime_input(900, "From Follow", Some(9), None))
        .await
        .unwrap();
    state
        .store
        .upsert_manga_entry(&c, &manga_input(901, "From Platform", None, Some(8.0)))
        .await
        .unwrap();

    let recommendations = state
        .recommendations
        .recommendations_for(&UserId::new(a))
        .await
        .unwrap();

    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0].reason, FOLLOW_REASON);
    assert_eq!(
        recommendations[1].reason,
        "MAL score 8.0 · tracked on AniNotes"
    );
}

#[tokio::test]
async fn consecutive_calls_return_identical_lists() {
    let state = test_state().await;
    let a = create_user(&state.store, "alice").await;
    let b = create_user(&state.store, "bob").await;
    let c = create_user(&state.store, "carol").await;

    state.store.add_follow(&a, &b).await.unwrap();
    for i in 0..4 {
        state
            .store
            .upsert_anime_entry(&b, &anime_input(920 + i, &format!("F{i}"), Some(8), None))
            .await
            .unwrap();
        state
            .store
            .upsert_manga_entry(
                &c,
                &manga_input(940 + i, &format!("P{i}"), None, Some(8.5)),
            )
            .await
            .unwrap();
    }

    let user = UserId::new(a);
    let first = state.recommendations.recommendations_for(&user).await.unwrap();
    let second = state.recommendations.recommendations_for(&user).await.unwrap();

    let key = |recs: &[aninotes::services::Recommendation]| {
        recs.iter()
            .map(|r| (r.media_type, r.mal_id, r.reason.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(key(&first), key(&second));
}
