use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create achievements table
        manager
            .create_table(
                Table::create()
                    .table(Achievements::Table)
                    .if_not_exists()
                    .col(pk_auto(Achievements::Id))
                    .col(string(Achievements::Title))
                    .col(string_null(Achievements::Description))
                    .col(boolean(Achievements::IsPublic).default(false))
                    .col(boolean(Achievements::IsFeatured).default(false))
                    .col(string_null(Achievements::CoverImage))
                    .col(integer(Achievements::UserId))
                    .col(timestamp_with_time_zone(Achievements::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_achievement_user")
                            .from(Achievements::Table, Achievements::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One author cannot hold two achievements with the same title.
        // Validation performs the same check against the store; this index
        // is the durable backstop for concurrent creates.
        manager
            .create_index(
                Index::create()
                    .name("idx_achievements_user_title")
                    .table(Achievements::Table)
                    .col(Achievements::UserId)
                    .col(Achievements::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Achievements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
}

#[derive(DeriveIden)]
enum Achievements {
    Table,
    Id,
    Title,
    Description,
    IsPublic,
    IsFeatured,
    CoverImage,
    UserId,
    CreatedAt,
}
