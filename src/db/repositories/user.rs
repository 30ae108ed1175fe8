use anyhow::Result;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::UserId;
use crate::entities::users;

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        username: &str,
        name: &str,
        image: Option<&str>,
    ) -> Result<users::Model> {
        let model = users::ActiveModel {
            id: Set(UserId::generate().into_string()),
            username: Set(username.to_string()),
            name: Set(name.to_string()),
            image: Set(image.map(ToString::to_string)),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        Ok(model.insert(&self.conn).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Option<users::Model>> {
        Ok(users::Entity::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?)
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<users::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.conn)
            .await?)
    }
}
