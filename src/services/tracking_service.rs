//! Domain service for tracked entries, the follow graph, and user accounts.

use serde::Serialize;
use thiserror::Error;

use crate::models::entry::{AnimeEntryInput, MangaEntryInput, TrackedEntry};

/// Domain errors for tracking operations.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error("Database error: {0}")]
    Database(String),
}

/// A registered account as the API exposes it.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
    pub created_at: String,
}

impl From<crate::entities::users::Model> for UserProfile {
    fn from(model: crate::entities::users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            name: model.name,
            image: model.image,
            created_at: model.created_at,
        }
    }
}

/// Follow-graph summary for a profile page.
#[derive(Debug, Clone, Serialize)]
pub struct FollowOverview {
    pub followers: u64,
    pub following: u64,
    pub following_ids: Vec<String>,
}

/// Result of a follow toggle: the state after the call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FollowToggle {
    pub following: bool,
}

/// Domain service trait for account, entry and follow management.
///
/// Callers pass the verified user id explicitly; session handling lives
/// outside this crate.
#[async_trait::async_trait]
pub trait TrackingService: Send + Sync {
    /// Registers an account with a fresh opaque id.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::InvalidData`] for a malformed username or name
    /// - [`TrackingError::UsernameTaken`] when the username exists
    async fn create_user(
        &self,
        username: &str,
        name: &str,
        image: Option<&str>,
    ) -> Result<UserProfile, TrackingError>;

    async fn get_user(&self, user_id: &str) -> Result<UserProfile, TrackingError>;

    /// Creates or updates the caller's entry for one anime title.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::NotFound`] for an unknown user
    /// - [`TrackingError::InvalidData`] when validation fails
    async fn upsert_anime_entry(
        &self,
        user_id: &str,
        input: AnimeEntryInput,
    ) -> Result<(), TrackingError>;

    async fn upsert_manga_entry(
        &self,
        user_id: &str,
        input: MangaEntryInput,
    ) -> Result<(), TrackingError>;

    /// Removes the caller's entry for one title.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when no such entry exists.
    async fn remove_entry(
        &self,
        media_type: crate::domain::MediaType,
        user_id: &str,
        mal_id: i32,
    ) -> Result<(), TrackingError>;

    /// The user's tracked entries, most recently updated first.
    async fn list_entries(
        &self,
        media_type: crate::domain::MediaType,
        user_id: &str,
    ) -> Result<Vec<TrackedEntry>, TrackingError>;

    /// Follows the target if not yet followed, unfollows otherwise.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::SelfFollow`] when follower and target match
    /// - [`TrackingError::NotFound`] for an unknown follower or target
    async fn toggle_follow(
        &self,
        follower_id: &str,
        target_id: &str,
    ) -> Result<FollowToggle, TrackingError>;

    async fn follow_overview(&self, user_id: &str) -> Result<FollowOverview, TrackingError>;
}

const MAX_NOTES_LEN: usize = 2000;

fn validate_common(
    title: &str,
    score: Option<i32>,
    notes: Option<&str>,
) -> Result<(), TrackingError> {
    if title.trim().is_empty() {
        return Err(TrackingError::InvalidData(
            "Title cannot be empty".to_string(),
        ));
    }

    if let Some(score) = score
        && !(1..=10).contains(&score)
    {
        return Err(TrackingError::InvalidData(
            "Score must be within 1-10".to_string(),
        ));
    }

    if let Some(notes) = notes
        && notes.chars().count() > MAX_NOTES_LEN
    {
        return Err(TrackingError::InvalidData(format!(
            "Notes cannot exceed {MAX_NOTES_LEN} characters"
        )));
    }

    Ok(())
}

/// Checks an anime entry payload before it reaches the store.
pub fn validate_anime_input(input: &AnimeEntryInput) -> Result<(), TrackingError> {
    if input.mal_id <= 0 {
        return Err(TrackingError::InvalidData(
            "Catalog id must be positive".to_string(),
        ));
    }

    validate_common(&input.title, input.score, input.notes.as_deref())?;

    if input.episodes_watched < 0 {
        return Err(TrackingError::InvalidData(
            "Episodes watched cannot be negative".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_manga_input(input: &MangaEntryInput) -> Result<(), TrackingError> {
    if input.mal_id <= 0 {
        return Err(TrackingError::InvalidData(
            "Catalog id must be positive".to_string(),
        ));
    }

    validate_common(&input.title, input.score, input.notes.as_deref())?;

    if input.chapters_read < 0 || input.volumes_read < 0 {
        return Err(TrackingError::InvalidData(
            "Progress counts cannot be negative".to_string(),
        ));
    }

    Ok(())
}

/// Checks a requested username: 3-30 characters, ascii alphanumerics plus
/// `_` and `-`.
pub fn validate_username(username: &str) -> Result<(), TrackingError> {
    let len = username.chars().count();
    if !(3..=30).contains(&len) {
        return Err(TrackingError::InvalidData(
            "Username must be 3-30 characters".to_string(),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(TrackingError::InvalidData(
            "Username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anime_input() -> AnimeEntryInput {
        AnimeEntryInput {
            mal_id: 100,
            title: "X".to_string(),
            image_url: None,
            synopsis: None,
            total_episodes: Some(12),
            media_format: None,
            airing_status: None,
            mal_score: Some(8.1),
            status: "WATCHING".to_string(),
            score: Some(8),
            episodes_watched: 3,
            notes: None,
        }
    }

    #[test]
    fn accepts_valid_anime_input() {
        assert!(validate_anime_input(&anime_input()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_score() {
        let mut input = anime_input();
        input.score = Some(11);
        assert!(matches!(
            validate_anime_input(&input),
            Err(TrackingError::InvalidData(_))
        ));

        input.score = Some(0);
        assert!(validate_anime_input(&input).is_err());

        input.score = None;
        assert!(validate_anime_input(&input).is_ok());
    }

    #[test]
    fn rejects_negative_progress() {
        let mut input = anime_input();
        input.episodes_watched = -1;
        assert!(validate_anime_input(&input).is_err());
    }

    #[test]
    fn rejects_blank_title_and_bad_mal_id() {
        let mut input = anime_input();
        input.title = "  ".to_string();
        assert!(validate_anime_input(&input).is_err());

        let mut input = anime_input();
        input.mal_id = 0;
        assert!(validate_anime_input(&input).is_err());
    }

    #[test]
    fn rejects_oversized_notes() {
        let mut input = anime_input();
        input.notes = Some("x".repeat(MAX_NOTES_LEN + 1));
        assert!(validate_anime_input(&input).is_err());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("kenji_42").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(31)).is_err());
    }
}
