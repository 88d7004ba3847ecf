use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{games, prelude::*};
use draft_types::{GameRecord, PlayerSnapshot};

/// Append-only per-user game history. Unlike the weekly rankings, history is
/// never trimmed.
pub struct GameRepository {
    db: DatabaseConnection,
}

impl GameRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_record(model: games::Model) -> Result<GameRecord> {
        let players: Vec<PlayerSnapshot> = serde_json::from_value(model.players)?;

        Ok(GameRecord {
            id: model.id,
            user_id: model.user_id,
            score: model.score,
            players,
            played_at: model.played_at.to_rfc3339(),
        })
    }

    pub async fn record_game(
        &self,
        user_id: &str,
        score: f64,
        players: &[PlayerSnapshot],
        played_at: DateTime<Utc>,
    ) -> Result<GameRecord> {
        let game_model = games::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            user_id: sea_orm::ActiveValue::Set(user_id.to_string()),
            score: sea_orm::ActiveValue::Set(score),
            players: sea_orm::ActiveValue::Set(serde_json::to_value(players)?),
            played_at: sea_orm::ActiveValue::Set(played_at.into()),
        };

        let saved_model = Games::insert(game_model).exec(&self.db).await?;

        // Fetch the stored game
        let stored = Games::find_by_id(saved_model.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve recorded game"))?;

        Self::model_to_record(stored)
    }

    /// A user's full history, most recent game first.
    pub async fn games_for_user(&self, user_id: &str) -> Result<Vec<GameRecord>> {
        let models = Games::find()
            .filter(games::Column::UserId.eq(user_id))
            .order_by_desc(games::Column::PlayedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::model_to_record).collect()
    }
}
