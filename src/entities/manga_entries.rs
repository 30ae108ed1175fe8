use sea_orm::entity::prelude::*;

/// One user's tracked record for one manga title.
///
/// Structurally parallel to `anime_entries`, with chapter/volume progress in
/// place of episode progress. `(user_id, mal_id)` is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "manga_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub mal_id: i32,
    pub title: String,
    pub image_url: Option<String>,
    pub synopsis: Option<String>,
    pub total_chapters: Option<i32>,
    pub total_volumes: Option<i32>,
    pub media_format: Option<String>,
    pub publishing_status: Option<String>,
    pub mal_score: Option<f32>,
    /// READING, COMPLETED, ON_HOLD, DROPPED or PLAN_TO_READ
    pub status: String,
    pub score: Option<i32>,
    pub chapters_read: i32,
    pub volumes_read: i32,
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
