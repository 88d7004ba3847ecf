use chrono::{DateTime, Utc};
use draft_types::PlayerSnapshot;
use serde::{Deserialize, Serialize};

/// Normalized payload emitted when a finished game lands in a user's history.
/// Today it travels over an in-process channel; anything that can hand the
/// same payload to the consumer (a queue, a webhook, a polling loop) can be
/// swapped in without touching aggregation logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecorded {
    pub user_id: String,
    pub score: f64,
    pub players: Vec<PlayerSnapshot>,
    pub played_at: DateTime<Utc>,
}
