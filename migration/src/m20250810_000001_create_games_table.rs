use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Games::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Games::UserId).string().not_null())
                    .col(ColumnDef::new(Games::Score).double().not_null())
                    .col(ColumnDef::new(Games::Players).json().not_null())
                    .col(
                        ColumnDef::new(Games::PlayedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index for per-user history listings, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_games_user_id_played_at")
                    .table(Games::Table)
                    .col(Games::UserId)
                    .col(Games::PlayedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    UserId,
    Score,
    Players,
    PlayedAt,
}
