use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entities::{leaderboard_entries, prelude::*};
use draft_core::{NewLeaderboardEntry, RankingStore, StoreError, WeekId};
use draft_types::{LeaderboardEntry, PlayerSnapshot};

/// SQL-backed ranking store. One row per ranked game, keyed by the week
/// bucket it was filed under; the ranking index on (week_id, score,
/// submitted_at) keeps the ordered scan cheap.
pub struct LeaderboardRepository {
    db: DatabaseConnection,
}

impl LeaderboardRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn store_err(err: sea_orm::DbErr) -> StoreError {
        StoreError::Unavailable(err.to_string())
    }

    fn model_to_entry(model: leaderboard_entries::Model) -> Result<LeaderboardEntry, StoreError> {
        let players: Vec<PlayerSnapshot> = serde_json::from_value(model.players)
            .map_err(|err| StoreError::Corrupt(format!("entry {}: {}", model.id, err)))?;

        Ok(LeaderboardEntry {
            id: model.id,
            user_id: model.user_id,
            score: model.score,
            players,
            timestamp: model.submitted_at.to_rfc3339(),
        })
    }
}

#[async_trait]
impl RankingStore for LeaderboardRepository {
    async fn append_entry(
        &self,
        week: WeekId,
        entry: NewLeaderboardEntry,
    ) -> Result<LeaderboardEntry, StoreError> {
        let players = serde_json::to_value(&entry.players)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;

        let entry_model = leaderboard_entries::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            week_id: sea_orm::ActiveValue::Set(week.to_string()),
            user_id: sea_orm::ActiveValue::Set(entry.user_id),
            score: sea_orm::ActiveValue::Set(entry.score),
            players: sea_orm::ActiveValue::Set(players),
            submitted_at: sea_orm::ActiveValue::Set(entry.timestamp.into()),
        };

        let saved_model = LeaderboardEntries::insert(entry_model)
            .exec(&self.db)
            .await
            .map_err(Self::store_err)?;

        // Fetch the stored row so the caller sees exactly what ranking reads
        let stored = LeaderboardEntries::find_by_id(saved_model.last_insert_id)
            .one(&self.db)
            .await
            .map_err(Self::store_err)?
            .ok_or_else(|| StoreError::Unavailable("appended entry not found".to_string()))?;

        Self::model_to_entry(stored)
    }

    async fn ranked_entries(
        &self,
        week: WeekId,
        limit: Option<u64>,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let models = LeaderboardEntries::find()
            .filter(leaderboard_entries::Column::WeekId.eq(week.to_string()))
            .order_by_desc(leaderboard_entries::Column::Score)
            .order_by_asc(leaderboard_entries::Column::SubmittedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(Self::store_err)?;

        models.into_iter().map(Self::model_to_entry).collect()
    }

    async fn delete_entries(&self, week: WeekId, ids: &[Uuid]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }

        // Single statement, so the batch goes in one shot; ids already gone
        // simply match nothing.
        LeaderboardEntries::delete_many()
            .filter(leaderboard_entries::Column::WeekId.eq(week.to_string()))
            .filter(leaderboard_entries::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .map_err(Self::store_err)?;

        Ok(())
    }
}
