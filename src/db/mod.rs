use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::domain::MediaType;
use crate::entities::users;
use crate::models::entry::{AnimeEntryInput, MangaEntryInput, TrackedEntry};

pub mod migrator;
pub mod repositories;

pub use repositories::entry::{PopularTitleRow, ScoredTitleRow};
pub use repositories::stats::TrackedCountRow;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn follow_repo(&self) -> repositories::follow::FollowRepository {
        repositories::follow::FollowRepository::new(self.conn.clone())
    }

    fn entry_repo(&self) -> repositories::entry::EntryRepository {
        repositories::entry::EntryRepository::new(self.conn.clone())
    }

    fn stats_repo(&self) -> repositories::stats::StatsRepository {
        repositories::stats::StatsRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(
        &self,
        username: &str,
        name: &str,
        image: Option<&str>,
    ) -> Result<users::Model> {
        self.user_repo().create(username, name, image).await
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<users::Model>> {
        self.user_repo().get(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        self.user_repo().username_taken(username).await
    }

    pub async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<users::Model>> {
        self.user_repo().get_by_ids(ids).await
    }

    // ========== Follow graph ==========

    pub async fn list_following(&self, user_id: &str) -> Result<Vec<String>> {
        self.follow_repo().list_following(user_id).await
    }

    pub async fn follow_exists(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        self.follow_repo().exists(follower_id, following_id).await
    }

    pub async fn add_follow(&self, follower_id: &str, following_id: &str) -> Result<()> {
        self.follow_repo().add(follower_id, following_id).await
    }

    pub async fn remove_follow(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        self.follow_repo().remove(follower_id, following_id).await
    }

    pub async fn follower_count(&self, user_id: &str) -> Result<u64> {
        self.follow_repo().follower_count(user_id).await
    }

    pub async fn following_count(&self, user_id: &str) -> Result<u64> {
        self.follow_repo().following_count(user_id).await
    }

    // ========== Tracked entries (recommendation read capabilities) ==========

    pub async fn list_own_mal_ids(
        &self,
        media_type: MediaType,
        user_id: &str,
    ) -> Result<HashSet<i32>> {
        self.entry_repo().list_own_mal_ids(media_type, user_id).await
    }

    pub async fn list_high_scored(
        &self,
        media_type: MediaType,
        owner_ids: &[String],
        min_score: i32,
        exclude_mal_ids: &HashSet<i32>,
    ) -> Result<Vec<ScoredTitleRow>> {
        self.entry_repo()
            .list_high_scored(media_type, owner_ids, min_score, exclude_mal_ids)
            .await
    }

    pub async fn list_popular(
        &self,
        media_type: MediaType,
        exclude_user_id: &str,
        min_mal_score: f32,
        exclude_mal_ids: &HashSet<i32>,
        limit: u64,
    ) -> Result<Vec<PopularTitleRow>> {
        self.entry_repo()
            .list_popular(
                media_type,
                exclude_user_id,
                min_mal_score,
                exclude_mal_ids,
                limit,
            )
            .await
    }

    pub async fn find_similar_users(
        &self,
        media_type: MediaType,
        mal_ids: &[i32],
        min_score: i32,
        min_shared: i32,
        exclude_user_id: &str,
    ) -> Result<Vec<String>> {
        self.entry_repo()
            .find_similar_users(media_type, mal_ids, min_score, min_shared, exclude_user_id)
            .await
    }

    pub async fn find_representative_entry(
        &self,
        media_type: MediaType,
        mal_id: i32,
    ) -> Result<Option<TrackedEntry>> {
        self.entry_repo().find_representative(media_type, mal_id).await
    }

    // ========== Tracked entries (write side) ==========

    pub async fn upsert_anime_entry(&self, user_id: &str, input: &AnimeEntryInput) -> Result<()> {
        self.entry_repo().upsert_anime(user_id, input).await
    }

    pub async fn upsert_manga_entry(&self, user_id: &str, input: &MangaEntryInput) -> Result<()> {
        self.entry_repo().upsert_manga(user_id, input).await
    }

    pub async fn remove_entry(
        &self,
        media_type: MediaType,
        user_id: &str,
        mal_id: i32,
    ) -> Result<bool> {
        self.entry_repo().remove(media_type, user_id, mal_id).await
    }

    pub async fn list_entries(
        &self,
        media_type: MediaType,
        user_id: &str,
    ) -> Result<Vec<TrackedEntry>> {
        self.entry_repo().list_for_user(media_type, user_id).await
    }

    // ========== Community stats ==========

    pub async fn count_users(&self) -> Result<u64> {
        self.stats_repo().count_users().await
    }

    pub async fn count_entries(&self, media_type: MediaType) -> Result<u64> {
        self.stats_repo().count_entries(media_type).await
    }

    pub async fn total_episodes_watched(&self) -> Result<i64> {
        self.stats_repo().total_episodes_watched().await
    }

    pub async fn total_chapters_read(&self) -> Result<i64> {
        self.stats_repo().total_chapters_read().await
    }

    pub async fn most_tracked(
        &self,
        media_type: MediaType,
        limit: u64,
    ) -> Result<Vec<TrackedCountRow>> {
        self.stats_repo().most_tracked(media_type, limit).await
    }

    pub async fn entry_counts_by_user(&self, media_type: MediaType) -> Result<Vec<(String, i64)>> {
        self.stats_repo().entry_counts_by_user(media_type).await
    }

    pub async fn top_watchers(&self, limit: u64) -> Result<Vec<(String, i64)>> {
        self.stats_repo().top_watchers(limit).await
    }
}
