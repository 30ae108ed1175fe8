//! Domain service for personalized title recommendations.
//!
//! Three strategies run in priority order until the suggestion quota is
//! filled: titles highly rated by followed users, platform-popular titles,
//! and titles liked by users with overlapping taste. The ranking and merging
//! steps live here as pure functions; the queries behind them are the
//! store's read capabilities.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::db::repositories::entry::ScoredTitleRow;
use crate::domain::{MediaType, UserId};
use crate::models::entry::TrackedEntry;

/// Domain errors for recommendation runs.
///
/// The engine performs reads only, so the surface is small: any query
/// failure fails the whole call. Empty inputs (no follows, no ratings, no
/// qualifying titles) are never errors; they resolve to fewer suggestions.
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for RecommendationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// One suggested title. Built fresh on every call, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub image_url: Option<String>,
    pub media_type: MediaType,
    pub reason: String,
    pub mal_id: i32,
    /// A sample tracked-entry row for UI detail display
    pub entry: Option<TrackedEntry>,
}

/// Domain service trait for the recommendation engine.
///
/// The caller supplies the verified user id explicitly; the engine reads no
/// ambient session state and writes nothing.
#[async_trait::async_trait]
pub trait RecommendationService: Send + Sync {
    /// Produces an ordered list of at most `target_count` suggestions.
    ///
    /// A user with no history receives an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendationError::Database`] on query failure; no partial
    /// results are returned in that case.
    async fn recommendations_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Recommendation>, RecommendationError>;
}

/// Collapses per-user candidate rows to one row per title, keeping the
/// highest personal score seen for it (first row wins a tie), then orders by
/// that score descending.
///
/// # Examples
///
/// ```
/// # use aninotes::db::repositories::entry::ScoredTitleRow;
/// # use aninotes::services::recommendation_service::dedupe_highest_scored;
/// let rows = vec![
///     ScoredTitleRow { mal_id: 1, title: "A".into(), image_url: None, score: 7 },
///     ScoredTitleRow { mal_id: 2, title: "B".into(), image_url: None, score: 9 },
///     ScoredTitleRow { mal_id: 1, title: "A".into(), image_url: None, score: 8 },
/// ];
/// let deduped = dedupe_highest_scored(rows);
/// assert_eq!(deduped.len(), 2);
/// assert_eq!((deduped[0].mal_id, deduped[0].score), (2, 9));
/// assert_eq!((deduped[1].mal_id, deduped[1].score), (1, 8));
/// ```
#[must_use]
pub fn dedupe_highest_scored(rows: Vec<ScoredTitleRow>) -> Vec<ScoredTitleRow> {
    let mut order: Vec<i32> = Vec::new();
    let mut best: HashMap<i32, ScoredTitleRow> = HashMap::new();

    for row in rows {
        match best.get(&row.mal_id) {
            Some(existing) if existing.score >= row.score => {}
            Some(_) => {
                best.insert(row.mal_id, row);
            }
            None => {
                order.push(row.mal_id);
                best.insert(row.mal_id, row);
            }
        }
    }

    let mut deduped: Vec<ScoredTitleRow> = order
        .into_iter()
        .filter_map(|id| best.remove(&id))
        .collect();
    deduped.sort_by(|a, b| b.score.cmp(&a.score));
    deduped
}

/// Merges two candidate lists index-by-index (a[0], b[0], a[1], b[1], ...)
/// up to `cap` items, so neither list dominates the head of the result.
#[must_use]
pub fn interleave<T>(a: Vec<T>, b: Vec<T>, cap: usize) -> Vec<T> {
    let mut merged = Vec::with_capacity(cap.min(a.len() + b.len()));
    let mut a = a.into_iter();
    let mut b = b.into_iter();

    loop {
        let mut pushed = false;
        for item in [a.next(), b.next()].into_iter().flatten() {
            if merged.len() >= cap {
                return merged;
            }
            merged.push(item);
            pushed = true;
        }
        if !pushed {
            return merged;
        }
    }
}

/// One title ranked by how many similar-taste users rated it highly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikedTitle {
    pub mal_id: i32,
    pub title: String,
    pub image_url: Option<String>,
    pub likers: usize,
}

/// Counts how many distinct rows (one per liking user) each title has and
/// orders titles by that count descending, first-seen order on ties.
#[must_use]
pub fn rank_by_liker_count(rows: Vec<ScoredTitleRow>) -> Vec<LikedTitle> {
    let mut order: Vec<i32> = Vec::new();
    let mut counted: HashMap<i32, LikedTitle> = HashMap::new();

    for row in rows {
        if let Some(existing) = counted.get_mut(&row.mal_id) {
            existing.likers += 1;
        } else {
            order.push(row.mal_id);
            counted.insert(
                row.mal_id,
                LikedTitle {
                    mal_id: row.mal_id,
                    title: row.title,
                    image_url: row.image_url,
                    likers: 1,
                },
            );
        }
    }

    let mut ranked: Vec<LikedTitle> = order
        .into_iter()
        .filter_map(|id| counted.remove(&id))
        .collect();
    ranked.sort_by(|a, b| b.likers.cmp(&a.likers));
    ranked
}

pub const FOLLOW_REASON: &str = "Highly rated by someone you follow";

/// `"MAL score 8.2 · tracked on AniNotes"`, with `?` standing in for a
/// missing platform score.
#[must_use]
pub fn platform_reason(mal_score: Option<f32>) -> String {
    let score = mal_score.map_or_else(|| "?".to_string(), |s| format!("{s:.1}"));
    format!("MAL score {score} · tracked on AniNotes")
}

#[must_use]
pub fn similar_taste_reason(likers: usize) -> String {
    format!("Liked by {likers} users with similar taste")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(mal_id: i32, score: i32) -> ScoredTitleRow {
        ScoredTitleRow {
            mal_id,
            title: format!("Title {mal_id}"),
            image_url: None,
            score,
        }
    }

    #[test]
    fn dedupe_keeps_highest_score_per_title() {
        let rows = vec![row(10, 9), row(20, 8), row(10, 7), row(20, 10)];
        let deduped = dedupe_highest_scored(rows);

        assert_eq!(deduped.len(), 2);
        assert_eq!((deduped[0].mal_id, deduped[0].score), (20, 10));
        assert_eq!((deduped[1].mal_id, deduped[1].score), (10, 9));
    }

    #[test]
    fn dedupe_first_row_wins_score_tie() {
        let mut first = row(10, 8);
        first.title = "First".to_string();
        let mut second = row(10, 8);
        second.title = "Second".to_string();

        let deduped = dedupe_highest_scored(vec![first, second]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].title, "First");
    }

    #[test]
    fn dedupe_of_empty_is_empty() {
        assert!(dedupe_highest_scored(Vec::new()).is_empty());
    }

    #[test]
    fn interleave_alternates_sources() {
        let merged = interleave(vec![1, 3, 5], vec![2, 4, 6], 10);
        assert_eq!(merged, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn interleave_drains_longer_list_after_shorter() {
        let merged = interleave(vec![1], vec![2, 4, 6], 10);
        assert_eq!(merged, vec![1, 2, 4, 6]);
    }

    #[test]
    fn interleave_respects_cap() {
        let merged = interleave(vec![1, 3, 5], vec![2, 4, 6], 3);
        assert_eq!(merged, vec![1, 2, 3]);
    }

    #[test]
    fn rank_counts_rows_per_title() {
        let rows = vec![row(10, 8), row(20, 9), row(10, 7), row(10, 9), row(20, 8)];
        let ranked = rank_by_liker_count(rows);

        assert_eq!(ranked.len(), 2);
        assert_eq!((ranked[0].mal_id, ranked[0].likers), (10, 3));
        assert_eq!((ranked[1].mal_id, ranked[1].likers), (20, 2));
    }

    #[test]
    fn rank_ties_keep_first_seen_order() {
        let rows = vec![row(20, 8), row(10, 9), row(10, 7), row(20, 8)];
        let ranked = rank_by_liker_count(rows);

        assert_eq!(ranked[0].mal_id, 20);
        assert_eq!(ranked[1].mal_id, 10);
    }

    #[test]
    fn platform_reason_formats_one_decimal() {
        assert_eq!(
            platform_reason(Some(8.234)),
            "MAL score 8.2 · tracked on AniNotes"
        );
        assert_eq!(
            platform_reason(Some(7.0)),
            "MAL score 7.0 · tracked on AniNotes"
        );
        assert_eq!(platform_reason(None), "MAL score ? · tracked on AniNotes");
    }

    #[test]
    fn similar_taste_reason_counts_users() {
        assert_eq!(
            similar_taste_reason(2),
            "Liked by 2 users with similar taste"
        );
    }
}
