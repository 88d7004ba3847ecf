use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LeaderboardEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeaderboardEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LeaderboardEntries::WeekId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaderboardEntries::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaderboardEntries::Score)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaderboardEntries::Players)
                            .json()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaderboardEntries::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index matching the ranked scan: week partition, score
        // descending, submission time as tie-break
        manager
            .create_index(
                Index::create()
                    .name("idx_leaderboard_entries_week_ranking")
                    .table(LeaderboardEntries::Table)
                    .col(LeaderboardEntries::WeekId)
                    .col(LeaderboardEntries::Score)
                    .col(LeaderboardEntries::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LeaderboardEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LeaderboardEntries {
    Table,
    Id,
    WeekId,
    UserId,
    Score,
    Players,
    SubmittedAt,
}
