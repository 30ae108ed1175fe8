//! `SeaORM` implementation of the [`TrackingService`] trait.

use std::sync::Arc;

use crate::db::Store;
use crate::domain::MediaType;
use crate::models::entry::{AnimeEntryInput, MangaEntryInput, TrackedEntry};
use crate::services::tracking_service::{
    FollowOverview, FollowToggle, TrackingError, TrackingService, UserProfile,
    validate_anime_input, validate_manga_input, validate_username,
};

pub struct SeaOrmTrackingService {
    store: Arc<Store>,
}

impl SeaOrmTrackingService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    async fn require_user(&self, user_id: &str) -> Result<(), TrackingError> {
        let user = self
            .store
            .get_user(user_id)
            .await
            .map_err(|e| TrackingError::Database(e.to_string()))?;

        if user.is_none() {
            return Err(TrackingError::NotFound(format!("User {user_id}")));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl TrackingService for SeaOrmTrackingService {
    async fn create_user(
        &self,
        username: &str,
        name: &str,
        image: Option<&str>,
    ) -> Result<UserProfile, TrackingError> {
        validate_username(username)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(TrackingError::InvalidData(
                "Display name cannot be empty".to_string(),
            ));
        }

        let taken = self
            .store
            .username_taken(username)
            .await
            .map_err(|e| TrackingError::Database(e.to_string()))?;
        if taken {
            return Err(TrackingError::UsernameTaken(username.to_string()));
        }

        let user = self
            .store
            .create_user(username, name, image)
            .await
            .map_err(|e| TrackingError::Database(e.to_string()))?;

        tracing::info!(user_id = %user.id, username = %user.username, "Registered user");
        Ok(user.into())
    }

    async fn get_user(&self, user_id: &str) -> Result<UserProfile, TrackingError> {
        self.store
            .get_user(user_id)
            .await
            .map_err(|e| TrackingError::Database(e.to_string()))?
            .map(UserProfile::from)
            .ok_or_else(|| TrackingError::NotFound(format!("User {user_id}")))
    }

    async fn upsert_anime_entry(
        &self,
        user_id: &str,
        input: AnimeEntryInput,
    ) -> Result<(), TrackingError> {
        validate_anime_input(&input)?;
        self.require_user(user_id).await?;

        self.store
            .upsert_anime_entry(user_id, &input)
            .await
            .map_err(|e| TrackingError::Database(e.to_string()))?;

        tracing::debug!(user_id, mal_id = input.mal_id, "Upserted anime entry");
        Ok(())
    }

    async fn upsert_manga_entry(
        &self,
        user_id: &str,
        input: MangaEntryInput,
    ) -> Result<(), TrackingError> {
        validate_manga_input(&input)?;
        self.require_user(user_id).await?;

        self.store
            .upsert_manga_entry(user_id, &input)
            .await
            .map_err(|e| TrackingError::Database(e.to_string()))?;

        tracing::debug!(user_id, mal_id = input.mal_id, "Upserted manga entry");
        Ok(())
    }

    async fn remove_entry(
        &self,
        media_type: MediaType,
        user_id: &str,
        mal_id: i32,
    ) -> Result<(), TrackingError> {
        let removed = self
            .store
            .remove_entry(media_type, user_id, mal_id)
            .await
            .map_err(|e| TrackingError::Database(e.to_string()))?;

        if !removed {
            return Err(TrackingError::NotFound(format!(
                "{media_type} entry {mal_id} for user {user_id}"
            )));
        }

        Ok(())
    }

    async fn list_entries(
        &self,
        media_type: MediaType,
        user_id: &str,
    ) -> Result<Vec<TrackedEntry>, TrackingError> {
        self.require_user(user_id).await?;

        self.store
            .list_entries(media_type, user_id)
            .await
            .map_err(|e| TrackingError::Database(e.to_string()))
    }

    async fn toggle_follow(
        &self,
        follower_id: &str,
        target_id: &str,
    ) -> Result<FollowToggle, TrackingError> {
        if follower_id == target_id {
            return Err(TrackingError::SelfFollow);
        }

        self.require_user(follower_id).await?;
        self.require_user(target_id).await?;

        let exists = self
            .store
            .follow_exists(follower_id, target_id)
            .await
            .map_err(|e| TrackingError::Database(e.to_string()))?;

        if exists {
            self.store
                .remove_follow(follower_id, target_id)
                .await
                .map_err(|e| TrackingError::Database(e.to_string()))?;
            return Ok(FollowToggle { following: false });
        }

        self.store
            .add_follow(follower_id, target_id)
            .await
            .map_err(|e| TrackingError::Database(e.to_string()))?;

        Ok(FollowToggle { following: true })
    }

    async fn follow_overview(&self, user_id: &str) -> Result<FollowOverview, TrackingError> {
        self.require_user(user_id).await?;

        let (followers, following, following_ids) = tokio::join!(
            self.store.follower_count(user_id),
            self.store.following_count(user_id),
            self.store.list_following(user_id),
        );

        Ok(FollowOverview {
            followers: followers.map_err(|e| TrackingError::Database(e.to_string()))?,
            following: following.map_err(|e| TrackingError::Database(e.to_string()))?,
            following_ids: following_ids.map_err(|e| TrackingError::Database(e.to_string()))?,
        })
    }
}
