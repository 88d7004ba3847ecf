use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::player::PlayerSnapshot;

/// A finished drafting session as reported by the gameplay client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameResult {
    pub score: f64,
    pub players: Vec<PlayerSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub date: Option<GameDate>,
}

/// Wire form of a submission instant: RFC 3339 text or Unix seconds.
/// Clients that omit it entirely get stamped with server time instead.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum GameDate {
    Iso(String),
    UnixSeconds(i64),
}

/// One game in a user's history. History is append-only and never trimmed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GameRecord {
    pub id: Uuid,
    pub user_id: String,
    pub score: f64,
    pub players: Vec<PlayerSnapshot>,
    pub played_at: String, // ISO 8601 string
}
