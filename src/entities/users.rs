use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Opaque id (UUIDv4 string, generated at registration)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    pub name: String,

    pub image: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::anime_entries::Entity")]
    AnimeEntries,
    #[sea_orm(has_many = "super::manga_entries::Entity")]
    MangaEntries,
}

impl Related<super::anime_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnimeEntries.def()
    }
}

impl Related<super::manga_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MangaEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
