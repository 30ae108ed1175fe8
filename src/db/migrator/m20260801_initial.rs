use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Follows)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AnimeEntries)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(MangaEntries)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One edge per ordered follower/following pair
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_follows_pair")
                    .table(Follows)
                    .col(crate::entities::follows::Column::FollowerId)
                    .col(crate::entities::follows::Column::FollowingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // A user tracks each catalog title at most once
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_anime_entries_user_mal")
                    .table(AnimeEntries)
                    .col(crate::entities::anime_entries::Column::UserId)
                    .col(crate::entities::anime_entries::Column::MalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_manga_entries_user_mal")
                    .table(MangaEntries)
                    .col(crate::entities::manga_entries::Column::UserId)
                    .col(crate::entities::manga_entries::Column::MalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Cross-user title correlation for recommendations and stats
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_anime_entries_mal")
                    .table(AnimeEntries)
                    .col(crate::entities::anime_entries::Column::MalId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_manga_entries_mal")
                    .table(MangaEntries)
                    .col(crate::entities::manga_entries::Column::MalId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MangaEntries).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AnimeEntries).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Follows).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
