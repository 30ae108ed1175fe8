use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::follows;

pub struct FollowRepository {
    conn: DatabaseConnection,
}

impl FollowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Everyone `user_id` follows, in edge-creation order.
    pub async fn list_following(&self, user_id: &str) -> Result<Vec<String>> {
        let ids: Vec<String> = follows::Entity::find()
            .select_only()
            .column(follows::Column::FollowingId)
            .filter(follows::Column::FollowerId.eq(user_id))
            .order_by_asc(follows::Column::Id)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(ids)
    }

    pub async fn exists(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        let found = follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FollowingId.eq(following_id))
            .one(&self.conn)
            .await?;

        Ok(found.is_some())
    }

    pub async fn add(&self, follower_id: &str, following_id: &str) -> Result<()> {
        let model = follows::ActiveModel {
            follower_id: Set(follower_id.to_string()),
            following_id: Set(following_id.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        model.insert(&self.conn).await?;
        Ok(())
    }

    pub async fn remove(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        let result = follows::Entity::delete_many()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FollowingId.eq(following_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn follower_count(&self, user_id: &str) -> Result<u64> {
        Ok(follows::Entity::find()
            .filter(follows::Column::FollowingId.eq(user_id))
            .count(&self.conn)
            .await?)
    }

    pub async fn following_count(&self, user_id: &str) -> Result<u64> {
        Ok(follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .count(&self.conn)
            .await?)
    }
}
