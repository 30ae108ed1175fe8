use sea_orm::entity::prelude::*;

/// One user's tracked record for one anime title.
///
/// `mal_id` is the stable MyAnimeList catalog id shared across users;
/// `(user_id, mal_id)` is unique. `score` is the owner's personal 1-10 rating
/// (null until rated), `mal_score` the platform-wide 0-10 average snapshotted
/// from the catalog.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "anime_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub mal_id: i32,
    pub title: String,
    pub image_url: Option<String>,
    pub synopsis: Option<String>,
    pub total_episodes: Option<i32>,
    pub media_format: Option<String>,
    pub airing_status: Option<String>,
    pub mal_score: Option<f32>,
    /// WATCHING, COMPLETED, ON_HOLD, DROPPED or PLAN_TO_WATCH
    pub status: String,
    pub score: Option<i32>,
    pub episodes_watched: i32,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
