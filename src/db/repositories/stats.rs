use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
};

use crate::domain::MediaType;
use crate::entities::{anime_entries, manga_entries, users};

/// One title in a most-tracked ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCountRow {
    pub mal_id: i32,
    pub title: String,
    pub image_url: Option<String>,
    pub trackers: i64,
}

/// Community-wide aggregate queries for the stats page.
pub struct StatsRepository {
    conn: DatabaseConnection,
}

impl StatsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn count_users(&self) -> Result<u64> {
        Ok(users::Entity::find().count(&self.conn).await?)
    }

    pub async fn count_entries(&self, media_type: MediaType) -> Result<u64> {
        let count = match media_type {
            MediaType::Anime => anime_entries::Entity::find().count(&self.conn).await?,
            MediaType::Manga => manga_entries::Entity::find().count(&self.conn).await?,
        };

        Ok(count)
    }

    pub async fn total_episodes_watched(&self) -> Result<i64> {
        let sum: Option<i64> = anime_entries::Entity::find()
            .select_only()
            .column_as(anime_entries::Column::EpisodesWatched.sum(), "total")
            .into_tuple()
            .one(&self.conn)
            .await?
            .flatten();

        Ok(sum.unwrap_or(0))
    }

    pub async fn total_chapters_read(&self) -> Result<i64> {
        let sum: Option<i64> = manga_entries::Entity::find()
            .select_only()
            .column_as(manga_entries::Column::ChaptersRead.sum(), "total")
            .into_tuple()
            .one(&self.conn)
            .await?
            .flatten();

        Ok(sum.unwrap_or(0))
    }

    /// Titles ranked by how many users track them.
    pub async fn most_tracked(
        &self,
        media_type: MediaType,
        limit: u64,
    ) -> Result<Vec<TrackedCountRow>> {
        let rows: Vec<(i32, String, Option<String>, i64)> = match media_type {
            MediaType::Anime => {
                anime_entries::Entity::find()
                    .select_only()
                    .column(anime_entries::Column::MalId)
                    .column(anime_entries::Column::Title)
                    .column(anime_entries::Column::ImageUrl)
                    .column_as(anime_entries::Column::Id.count(), "trackers")
                    .group_by(anime_entries::Column::MalId)
                    .order_by_desc(anime_entries::Column::Id.count())
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
                    .column_as(manga_entries::Column::Id.count(), "trackers")
                    .group_by(manga_entries::Column::MalId)
                    .order_by_desc(manga_entries::Column::Id.count())
                    .order_by_asc(manga_entries::Column::MalId)
                    .limit(limit)
                    .into_tuple()
                    .all(&self.conn)
                    .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|(mal_id, title, image_url, trackers)| TrackedCountRow {
                mal_id,
                title,
                image_url,
                trackers,
            })
            .collect())
    }

    /// Entry count per user for one media type; merged across types by the
    /// service layer.
    pub async fn entry_counts_by_user(&self, media_type: MediaType) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = match media_type {
            MediaType::Anime => {
                anime_entries::Entity::find()
                    .select_only()
                    .column(anime_entries::Column::UserId)
                    .column_as(anime_entries::Column::Id.count(), "entries")
                    .group_by(anime_entries::Column::UserId)
                    .into_tuple()
                    .all(&self.conn)
                    .await?
            }
            MediaType::Manga => {
                manga_entries::Entity::find()
                    .select_only()
                    .column(manga_entries::Column::UserId)
                    .column_as(manga_entries::Column::Id.count(), "entries")
                    .group_by(manga_entries::Column::UserId)
                    .into_tuple()
                    .all(&self.conn)
                    .await?
            }
        };

        Ok(rows)
    }

    /// Users ranked by total episodes watched.
    pub async fn top_watchers(&self, limit: u64) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, Option<i64>)> = anime_entries::Entity::find()
            .select_only()
            .column(anime_entries::Column::UserId)
            .column_as(anime_entries::Column::EpisodesWatched.sum(), "watched")
            .group_by(anime_entries::Column::UserId)
            .order_by_desc(anime_entries::Column::EpisodesWatched.sum())
            .order_by_asc(anime_entries::Column::UserId)
            .limit(limit)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, watched)| (user_id, watched.unwrap_or(0)))
            .collect())
    }
}
