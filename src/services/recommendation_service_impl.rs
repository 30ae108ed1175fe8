//! `SeaORM` implementation of the [`RecommendationService`] trait.
//!
//! Runs the three suggestion strategies in priority order against the store.
//! Within each strategy the anime and manga queries have no data dependency
//! on each other, so they are issued concurrently and merged only after both
//! complete.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::RecommendationConfig;
use crate::db::Store;
use crate::domain::{MediaType, UserId};
use crate::services::recommendation_service::{
    FOLLOW_REASON, Recommendation, RecommendationError, RecommendationService,
    dedupe_highest_scored, interleave, platform_reason, rank_by_liker_count,
    similar_taste_reason,
};

/// SeaORM-based implementation of [`RecommendationService`].
pub struct SeaOrmRecommendationService {
    store: Arc<Store>,
    config: RecommendationConfig,
}

impl SeaOrmRecommendationService {
    #[must_use]
    pub const fn new(store: Arc<Store>, config: RecommendationConfig) -> Self {
        Self { store, config }
    }

    async fn representative(
        &self,
        media_type: MediaType,
        mal_id: i32,
    ) -> Result<Option<crate::models::entry::TrackedEntry>, RecommendationError> {
        self.store
            .find_representative_entry(media_type, mal_id)
            .await
            .map_err(|e| RecommendationError::Database(e.to_string()))
    }

    /// Titles highly rated by users the caller follows, best score first,
    /// anime accepted before manga.
    async fn fill_from_follow_graph(
        &self,
        user_id: &str,
        excluded_anime: &mut HashSet<i32>,
        excluded_manga: &mut HashSet<i32>,
        recommendations: &mut Vec<Recommendation>,
    ) -> Result<(), RecommendationError> {
        let following = self
            .store
            .list_following(user_id)
            .await
            .map_err(|e| RecommendationError::Database(e.to_string()))?;

        if following.is_empty() {
            return Ok(());
        }

        let min_score = self.config.min_personal_score;
        let target = self.config.target_count;

        let (anime_rows, manga_rows) = tokio::join!(
            self.store
                .list_high_scored(MediaType::Anime, &following, min_score, excluded_anime),
            self.store
                .list_high_scored(MediaType::Manga, &following, min_score, excluded_manga),
        );

        let anime_rows = anime_rows.map_err(|e| RecommendationError::Database(e.to_string()))?;
        let manga_rows = manga_rows.map_err(|e| RecommendationError::Database(e.to_string()))?;

        let mut top_anime = dedupe_highest_scored(anime_rows);
        top_anime.truncate(target);
        let mut top_manga = dedupe_highest_scored(manga_rows);
        top_manga.truncate(target);

        for row in top_anime {
            if recommendations.len() >= target {
                break;
            }
            excluded_anime.insert(row.mal_id);
            let entry = self.representative(MediaType::Anime, row.mal_id).await?;
            recommendations.push(Recommendation {
                title: row.title,
                image_url: row.image_url,
                media_type: MediaType::Anime,
                reason: FOLLOW_REASON.to_string(),
                mal_id: row.mal_id,
                entry,
            });
        }

        for row in top_manga {
            if recommendations.len() >= target {
                break;
            }
            excluded_manga.insert(row.mal_id);
            let entry = self.representative(MediaType::Manga, row.mal_id).await?;
            recommendations.push(Recommendation {
                title: row.title,
                image_url: row.image_url,
                media_type: MediaType::Manga,
                reason: FOLLOW_REASON.to_string(),
                mal_id: row.mal_id,
                entry,
            });
        }

        Ok(())
    }

    /// Titles with a high platform-wide score tracked by anyone else,
    /// interleaved across media types so the mix stays balanced.
    async fn fill_from_platform(
        &self,
        user_id: &str,
        excluded_anime: &mut HashSet<i32>,
        excluded_manga: &mut HashSet<i32>,
        recommendations: &mut Vec<Recommendation>,
    ) -> Result<(), RecommendationError> {
        let target = self.config.target_count;
        let needed = target - recommendations.len();
        // Overfetch so interleaving still fills the quota when one media
        // type runs short
        let overfetch = (needed * 2) as u64;
        let min_platform = self.config.min_platform_score;

        let (anime_rows, manga_rows) = tokio::join!(
            self.store.list_popular(
                MediaType::Anime,
                user_id,
                min_platform,
                excluded_anime,
                overfetch
            ),
            self.store.list_popular(
                MediaType::Manga,
                user_id,
                min_platform,
                excluded_manga,
                overfetch
            ),
        );

        let anime_rows = anime_rows.map_err(|e| RecommendationError::Database(e.to_string()))?;
        let manga_rows = manga_rows.map_err(|e| RecommendationError::Database(e.to_string()))?;

        let tagged_anime: Vec<_> = anime_rows
            .into_iter()
            .map(|row| (MediaType::Anime, row))
            .collect();
        let tagged_manga: Vec<_> = manga_rows
            .into_iter()
            .map(|row| (MediaType::Manga, row))
            .collect();

        for (media_type, row) in interleave(tagged_anime, tagged_manga, needed * 2) {
            if recommendations.len() >= target {
                break;
            }

            // The two per-type queries ran independently, so the accumulating
            // exclusion still has to be checked per item
            let excluded = match media_type {
                MediaType::Anime => &mut *excluded_anime,
                MediaType::Manga => &mut *excluded_manga,
            };
            if !excluded.insert(row.mal_id) {
                continue;
            }

            let entry = self.representative(media_type, row.mal_id).await?;
            recommendations.push(Recommendation {
                title: row.title,
                image_url: row.image_url,
                media_type,
                reason: platform_reason(row.mal_score),
                mal_id: row.mal_id,
                entry,
            });
        }

        Ok(())
    }

    /// Titles liked by users who share at least `min_shared_titles` highly
    /// rated titles with the caller. Anime runs first, then manga.
    async fn fill_from_similar_taste(
        &self,
        user_id: &str,
        excluded_anime: &mut HashSet<i32>,
        excluded_manga: &mut HashSet<i32>,
        recommendations: &mut Vec<Recommendation>,
    ) -> Result<(), RecommendationError> {
        let target = self.config.target_count;
        let still_needed = target - recommendations.len();
        let min_score = self.config.min_personal_score;
        let own = [user_id.to_string()];

        for media_type in [MediaType::Anime, MediaType::Manga] {
            if recommendations.len() >= target {
                break;
            }

            let own_high = self
                .store
                .list_high_scored(media_type, &own, min_score, &HashSet::new())
                .await
                .map_err(|e| RecommendationError::Database(e.to_string()))?;
            let own_ids: Vec<i32> = own_high.into_iter().map(|row| row.mal_id).collect();
            if own_ids.is_empty() {
                continue;
            }

            let similar_users = self
                .store
                .find_similar_users(
                    media_type,
                    &own_ids,
                    min_score,
                    self.config.min_shared_titles,
                    user_id,
                )
                .await
                .map_err(|e| RecommendationError::Database(e.to_string()))?;
            if similar_users.is_empty() {
                continue;
            }

            let excluded = match media_type {
                MediaType::Anime => &mut *excluded_anime,
                MediaType::Manga => &mut *excluded_manga,
            };

            let their_rows = self
                .store
                .list_high_scored(media_type, &similar_users, min_score, excluded)
                .await
                .map_err(|e| RecommendationError::Database(e.to_string()))?;

            let mut ranked = rank_by_liker_count(their_rows);
            ranked.truncate(still_needed);

            for item in ranked {
                if recommendations.len() >= target {
                    break;
                }
                excluded.insert(item.mal_id);
                let entry = self.representative(media_type, item.mal_id).await?;
                recommendations.push(Recommendation {
                    title: item.title,
                    image_url: item.image_url,
                    media_type,
                    reason: similar_taste_reason(item.likers),
                    mal_id: item.mal_id,
                    entry,
                });
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl RecommendationService for SeaOrmRecommendationService {
    async fn recommendations_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        let user_id = user_id.as_str();
        let target = self.config.target_count;

        // Everything the caller already tracks is off the table for every
        // strategy; accepted picks join these sets as the call progresses.
        let (own_anime, own_manga) = tokio::join!(
            self.store.list_own_mal_ids(MediaType::Anime, user_id),
            self.store.list_own_mal_ids(MediaType::Manga, user_id),
        );
        let mut excluded_anime =
            own_anime.map_err(|e| RecommendationError::Database(e.to_string()))?;
        let mut excluded_manga =
            own_manga.map_err(|e| RecommendationError::Database(e.to_string()))?;

        let mut recommendations = Vec::with_capacity(target);

        self.fill_from_follow_graph(
            user_id,
            &mut excluded_anime,
            &mut excluded_manga,
            &mut recommendations,
        )
        .await?;
        if recommendations.len() >= target {
            recommendations.truncate(target);
            return Ok(recommendations);
        }

        self.fill_from_platform(
            user_id,
            &mut excluded_anime,
            &mut excluded_manga,
            &mut recommendations,
        )
        .await?;
        if recommendations.len() >= target {
            recommendations.truncate(target);
            return Ok(recommendations);
        }

        self.fill_from_similar_taste(
            user_id,
            &mut excluded_anime,
            &mut excluded_manga,
            &mut recommendations,
        )
        .await?;

        recommendations.truncate(target);
        Ok(recommendations)
    }
}
