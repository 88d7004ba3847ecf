use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::player::PlayerSnapshot;

/// One ranked appearance in a week's top-10. Entries are written once and only
/// ever removed by a trim; they are never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub user_id: String,
    pub score: f64,
    pub players: Vec<PlayerSnapshot>,
    pub timestamp: String, // ISO 8601 string
}
