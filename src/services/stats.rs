//! Community-wide statistics: global totals, most-tracked titles, and user
//! leaderboards.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::db::Store;
use crate::domain::MediaType;
use crate::models::entry::TrackedEntry;

const RANKING_SIZE: u64 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct GlobalTotals {
    pub users: u64,
    pub anime_tracked: u64,
    pub manga_tracked: u64,
    pub episodes_watched: i64,
    pub chapters_read: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopularTitle {
    pub mal_id: i32,
    pub title: String,
    pub image_url: Option<String>,
    pub trackers: i64,
    pub entry: Option<TrackedEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub username: String,
    pub name: String,
    pub image: Option<String>,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommunityStats {
    pub totals: GlobalTotals,
    pub popular_anime: Vec<PopularTitle>,
    pub popular_manga: Vec<PopularTitle>,
    pub most_entries: Vec<LeaderboardRow>,
    pub most_episodes_watched: Vec<LeaderboardRow>,
}

pub struct StatsService {
    store: Arc<Store>,
}

impl StatsService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn overview(&self) -> Result<CommunityStats> {
        let (users, anime_tracked, manga_tracked, episodes_watched, chapters_read) = tokio::join!(
            self.store.count_users(),
            self.store.count_entries(MediaType::Anime),
            self.store.count_entries(MediaType::Manga),
            self.store.total_episodes_watched(),
            self.store.total_chapters_read(),
        );

        let totals = GlobalTotals {
            users: users?,
            anime_tracked: anime_tracked?,
            manga_tracked: manga_tracked?,
            episodes_watched: episodes_watched?,
            chapters_read: chapters_read?,
        };

        let (popular_anime, popular_manga) = tokio::join!(
            self.popular_titles(MediaType::Anime),
            self.popular_titles(MediaType::Manga),
        );

        let (most_entries, most_episodes_watched) =
            tokio::join!(self.most_entries(), self.most_episodes_watched());

        Ok(CommunityStats {
            totals,
            popular_anime: popular_anime?,
            popular_manga: popular_manga?,
            most_entries: most_entries?,
            most_episodes_watched: most_episodes_watched?,
        })
    }

    /// Titles ranked by tracker count, each with a representative entry for
    /// detail display.
    async fn popular_titles(&self, media_type: MediaType) -> Result<Vec<PopularTitle>> {
        let rows = self.store.most_tracked(media_type, RANKING_SIZE).await?;

        let mut titles = Vec::with_capacity(rows.len());
        for row in rows {
            let entry = self
                .store
                .find_representative_entry(media_type, row.mal_id)
                .await?;
            titles.push(PopularTitle {
                mal_id: row.mal_id,
                title: row.title,
                image_url: row.image_url,
                trackers: row.trackers,
                entry,
            });
        }

        Ok(titles)
    }

    /// Users ranked by combined anime + manga entry count.
    async fn most_entries(&self) -> Result<Vec<LeaderboardRow>> {
        let (anime_counts, manga_counts) = tokio::join!(
            self.store.entry_counts_by_user(MediaType::Anime),
            self.store.entry_counts_by_user(MediaType::Manga),
        );

        let mut combined: HashMap<String, i64> = HashMap::new();
        for (user_id, count) in anime_counts?.into_iter().chain(manga_counts?) {
            *combined.entry(user_id).or_insert(0) += count;
        }

        let mut ranked: Vec<(String, i64)> = combined.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(RANKING_SIZE as usize);

        self.attach_users(ranked).await
    }

    async fn most_episodes_watched(&self) -> Result<Vec<LeaderboardRow>> {
        let ranked = self.store.top_watchers(RANKING_SIZE).await?;
        self.attach_users(ranked).await
    }

    async fn attach_users(&self, ranked: Vec<(String, i64)>) -> Result<Vec<LeaderboardRow>> {
        let ids: Vec<String> = ranked.iter().map(|(id, _)| id.clone()).collect();
        let users = self.store.get_users_by_ids(&ids).await?;
        let by_id: HashMap<String, _> =
            users.into_iter().map(|u| (u.id.clone(), u)).collect();

        // Rows whose user vanished between queries are dropped rather than
        // rendered with placeholder identities
        Ok(ranked
            .into_iter()
            .filter_map(|(user_id, value)| {
                by_id.get(&user_id).map(|user| LeaderboardRow {
                    username: user.username.clone(),
                    name: user.name.clone(),
                    image: user.image.clone(),
                    value,
                })
            })
            .collect())
    }
}
