use std::collections::HashSet;

use anyhow::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::MediaType;
use crate::entities::{anime_entries, manga_entries};
use crate::models::entry::{AnimeEntryInput, MangaEntryInput, TrackedEntry};

/// One candidate title from a personal-score query, possibly repeated per
/// owning user. Callers deduplicate by `mal_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredTitleRow {
    pub mal_id: i32,
    pub title: String,
    pub image_url: Option<String>,
    pub score: i32,
}

/// One candidate title from the platform-score query, already distinct by
/// `mal_id` and ordered by `mal_score` descending.
#[derive(Debug, Clone, PartialEq)]
pub struct PopularTitleRow {
    pub mal_id: i32,
    pub title: String,
    pub image_url: Option<String>,
    pub mal_score: Option<f32>,
}

/// Read and write access to the per-user tracked-entry tables.
///
/// The read side is the capability surface the recommendation engine runs on;
/// every query takes a `MediaType` and dispatches to the matching table.
pub struct EntryRepository {
    conn: DatabaseConnection,
}

impl EntryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Catalog ids of every entry the user tracks for this media type.
    pub async fn list_own_mal_ids(
        &self,
        media_type: MediaType,
        user_id: &str,
    ) -> Result<HashSet<i32>> {
        let ids: Vec<i32> = match media_type {
            MediaType::Anime => {
                anime_entries::Entity::find()
                    .select_only()
                    .column(anime_entries::Column::MalId)
                    .filter(anime_entries::Column::UserId.eq(user_id))
                    .into_tuple()
                    .all(&self.conn)
                    .await?
            }
            MediaType::Manga => {
                manga_entries::Entity::find()
                    .select_only()
                    .column(manga_entries::Column::MalId)
                    .filter(manga_entries::Column::UserId.eq(user_id))
                    .into_tuple()
                    .all(&self.conn)
                    .await?
            }
        };

        Ok(ids.into_iter().collect())
    }

    /// Entries owned by any of `owner_ids` with a personal score of at least
    /// `min_score`, excluding the given catalog ids. Rows are ordered by
    /// score descending with a `mal_id` tiebreak so equal scores come back in
    /// the same order on every call; one row per (owner, title) pair.
    pub async fn list_high_scored(
        &self,
        media_type: MediaType,
        owner_ids: &[String],
        min_score: i32,
        exclude_mal_ids: &HashSet<i32>,
    ) -> Result<Vec<ScoredTitleRow>> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = match media_type {
            MediaType::Anime => anime_entries::Entity::find()
                .filter(anime_entries::Column::UserId.is_in(owner_ids.iter().cloned()))
                .filter(anime_entries::Column::Score.gte(min_score))
                .filter(anime_entries::Column::MalId.is_not_in(exclude_mal_ids.iter().copied()))
                .order_by_desc(anime_entries::Column::Score)
                .order_by_asc(anime_entries::Column::MalId)
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|e| ScoredTitleRow {
                    mal_id: e.mal_id,
                    title: e.title,
                    image_url: e.image_url,
                    score: e.score.unwrap_or(0),
                })
                .collect(),
            MediaType::Manga => manga_entries::Entity::find()
                .filter(manga_entries::Column::UserId.is_in(owner_ids.iter().cloned()))
                .filter(manga_entries::Column::Score.gte(min_score))
                .filter(manga_entries::Column::MalId.is_not_in(exclude_mal_ids.iter().copied()))
                .order_by_desc(manga_entries::Column::Score)
                .order_by_asc(manga_entries::Column::MalId)
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|e| ScoredTitleRow {
                    mal_id: e.mal_id,
                    title: e.title,
                    image_url: e.image_url,
                    score: e.score.unwrap_or(0),
                })
                .collect(),
        };

        Ok(rows)
    }

    /// Titles tracked by anyone but `exclude_user_id` whose platform-wide
    /// score reaches `min_mal_score`, distinct by `mal_id` (highest platform
    /// score wins the group), ordered by that score descending, capped at
    /// `limit`.
    pub async fn list_popular(
        &self,
        media_type: MediaType,
        exclude_user_id: &str,
        min_mal_score: f32,
        exclude_mal_ids: &HashSet<i32>,
        limit: u64,
    ) -> Result<Vec<PopularTitleRow>> {
        let rows: Vec<(i32, String, Option<String>, Option<f32>)> = match media_type {
            MediaType::Anime => {
                anime_entries::Entity::find()
                    .select_only()
                    .column(anime_entries::Column::MalId)
                    .column(anime_entries::Column::Title)
                    .column(anime_entries::Column::ImageUrl)
                    .column_as(anime_entries::Column::MalScore.max(), "mal_score")
                    .filter(anime_entries::Column::UserId.ne(exclude_user_id))
                    .filter(anime_entries::Column::MalScore.gte(min_mal_score))
                    .filter(anime_entries::Column::MalId.is_not_in(exclude_mal_ids.iter().copied()))
                    .group_by(anime_entries::Column::MalId)
                    .order_by_desc(anime_entries::Column::MalScore.max())
                    .order_by_asc(anime_entries::Column::MalId)
                    .limit(limit)
                    .into_tuple()
                    .all(&self.conn)
                    .await?
            }
            MediaType::Manga => {
                manga_entries::Entity::find()
                    .select_only()
                    .column(manga_entries::Column::MalId)
                    .column(manga_entries::Column::Title)
                    .column(manga_entries::Column::ImageUrl)
                    .column_as(manga_entries::Column::MalScore.max(), "mal_score")
                    .filter(manga_entries::Column::UserId.ne(exclude_user_id))
                    .filter(manga_entries::Column::MalScore.gte(min_mal_score))
                    .filter(manga_entries::Column::MalId.is_not_in(exclude_mal_ids.iter().copied()))
                    .group_by(manga_entries::Column::MalId)
                    .order_by_desc(manga_entries::Column::MalScore.max())
                    .order_by_asc(manga_entries::Column::MalId)
                    .limit(limit)
                    .into_tuple()
                    .all(&self.conn)
                    .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|(mal_id, title, image_url, mal_score)| PopularTitleRow {
                mal_id,
                title,
                image_url,
                mal_score,
            })
            .collect())
    }

    /// Users other than `exclude_user_id` who scored at least `min_shared` of
    /// the given titles at `min_score` or higher.
    ///
    /// The shared-count threshold runs as a grouped HAVING here; a store
    /// without HAVING could post-filter the grouped counts instead.
    pub async fn find_similar_users(
        &self,
        media_type: MediaType,
        mal_ids: &[i32],
        min_score: i32,
        min_shared: i32,
        exclude_user_id: &str,
    ) -> Result<Vec<String>> {
        if mal_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users: Vec<String> = match media_type {
            MediaType::Anime => {
                anime_entries::Entity::find()
                    .select_only()
                    .column(anime_entries::Column::UserId)
                    .filter(anime_entries::Column::MalId.is_in(mal_ids.iter().copied()))
                    .filter(anime_entries::Column::Score.gte(min_score))
                    .filter(anime_entries::Column::UserId.ne(exclude_user_id))
                    .group_by(anime_entries::Column::UserId)
                    .having(Expr::expr(anime_entries::Column::MalId.count()).gte(min_shared))
                    .order_by_asc(anime_entries::Column::UserId)
                    .into_tuple()
                    .all(&self.conn)
                    .await?
            }
            MediaType::Manga => {
                manga_entries::Entity::find()
                    .select_only()
                    .column(manga_entries::Column::UserId)
                    .filter(manga_entries::Column::MalId.is_in(mal_ids.iter().copied()))
                    .filter(manga_entries::Column::Score.gte(min_score))
                    .filter(manga_entries::Column::UserId.ne(exclude_user_id))
                    .group_by(manga_entries::Column::UserId)
                    .having(Expr::expr(manga_entries::Column::MalId.count()).gte(min_shared))
                    .order_by_asc(manga_entries::Column::UserId)
                    .into_tuple()
                    .all(&self.conn)
                    .await?
            }
        };

        Ok(users)
    }

    /// A sample tracked-entry row for the given title, for UI detail display.
    /// Any user's row qualifies; the lowest row id wins so the pick is stable.
    pub async fn find_representative(
        &self,
        media_type: MediaType,
        mal_id: i32,
    ) -> Result<Option<TrackedEntry>> {
        let entry = match media_type {
            MediaType::Anime => anime_entries::Entity::find()
                .filter(anime_entries::Column::MalId.eq(mal_id))
                .order_by_asc(anime_entries::Column::Id)
                .one(&self.conn)
                .await?
                .map(TrackedEntry::from),
            MediaType::Manga => manga_entries::Entity::find()
                .filter(manga_entries::Column::MalId.eq(mal_id))
                .order_by_asc(manga_entries::Column::Id)
                .one(&self.conn)
                .await?
                .map(TrackedEntry::from),
        };

        Ok(entry)
    }

    pub async fn upsert_anime(&self, user_id: &str, input: &AnimeEntryInput) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = anime_entries::ActiveModel {
            user_id: Set(user_id.to_string()),
            mal_id: Set(input.mal_id),
            title: Set(input.title.clone()),
            image_url: Set(input.image_url.clone()),
            synopsis: Set(input.synopsis.clone()),
            total_episodes: Set(input.total_episodes),
            media_format: Set(input.media_format.clone()),
            airing_status: Set(input.airing_status.clone()),
            mal_score: Set(input.mal_score),
            status: Set(input.status.clone()),
            score: Set(input.score),
            episodes_watched: Set(input.episodes_watched),
            notes: Set(input.notes.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        anime_entries::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    anime_entries::Column::UserId,
                    anime_entries::Column::MalId,
                ])
                .update_columns([
                    anime_entries::Column::Title,
                    anime_entries::Column::ImageUrl,
                    anime_entries::Column::Synopsis,
                    anime_entries::Column::TotalEpisodes,
                    anime_entries::Column::MediaFormat,
                    anime_entries::Column::AiringStatus,
                    anime_entries::Column::MalScore,
                    anime_entries::Column::Status,
                    anime_entries::Column::Score,
                    anime_entries::Column::EpisodesWatched,
                    anime_entries::Column::Notes,
                    anime_entries::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn upsert_manga(&self, user_id: &str, input: &MangaEntryInput) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = manga_entries::ActiveModel {
            user_id: Set(user_id.to_string()),
            mal_id: Set(input.mal_id),
            title: Set(input.title.clone()),
            image_url: Set(input.image_url.clone()),
            synopsis: Set(input.synopsis.clone()),
            total_chapters: Set(input.total_chapters),
            total_volumes: Set(input.total_volumes),
            media_format: Set(input.media_format.clone()),
            publishing_status: Set(input.publishing_status.clone()),
            mal_score: Set(input.mal_score),
            status: Set(input.status.clone()),
            score: Set(input.score),
            chapters_read: Set(input.chapters_read),
            volumes_read: Set(input.volumes_read),
            notes: Set(input.notes.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        manga_entries::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    manga_entries::Column::UserId,
                    manga_entries::Column::MalId,
                ])
                .update_columns([
                    manga_entries::Column::Title,
                    manga_entries::Column::ImageUrl,
                    manga_entries::Column::Synopsis,
                    manga_entries::Column::TotalChapters,
                    manga_entries::Column::TotalVolumes,
                    manga_entries::Column::MediaFormat,
                    manga_entries::Column::PublishingStatus,
                    manga_entries::Column::MalScore,
                    manga_entries::Column::Status,
                    manga_entries::Column::Score,
                    manga_entries::Column::ChaptersRead,
                    manga_entries::Column::VolumesRead,
                    manga_entries::Column::Notes,
                    manga_entries::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn remove(&self, media_type: MediaType, user_id: &str, mal_id: i32) -> Result<bool> {
        let result = match media_type {
            MediaType::Anime => {
                anime_entries::Entity::delete_many()
                    .filter(anime_entries::Column::UserId.eq(user_id))
                    .filter(anime_entries::Column::MalId.eq(mal_id))
                    .exec(&self.conn)
                    .await?
            }
            MediaType::Manga => {
                manga_entries::Entity::delete_many()
                    .filter(manga_entries::Column::UserId.eq(user_id))
                    .filter(manga_entries::Column::MalId.eq(mal_id))
                    .exec(&self.conn)
                    .await?
            }
        };

        Ok(result.rows_affected > 0)
    }

    /// The user's tracked entries, most recently updated first.
    pub async fn list_for_user(
        &self,
        media_type: MediaType,
        user_id: &str,
    ) -> Result<Vec<TrackedEntry>> {
        let entries = match media_type {
            MediaType::Anime => anime_entries::Entity::find()
                .filter(anime_entries::Column::UserId.eq(user_id))
                .order_by_desc(anime_entries::Column::UpdatedAt)
                .order_by_asc(anime_entries::Column::MalId)
                .all(&self.conn)
                .await?
                .into_iter()
                .map(TrackedEntry::from)
                .collect(),
            MediaType::Manga => manga_entries::Entity::find()
                .filter(manga_entries::Column::UserId.eq(user_id))
                .order_by_desc(manga_entries::Column::UpdatedAt)
                .order_by_asc(manga_entries::Column::MalId)
                .all(&self.conn)
                .await?
                .into_iter()
                .map(TrackedEntry::from)
                .collect(),
        };

        Ok(entries)
    }
}
