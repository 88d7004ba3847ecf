use async_trait::async_trait;
use chrono::{DateTime, Utc};
use draft_types::{LeaderboardEntry, PlayerSnapshot};
use thiserror::Error;
use uuid::Uuid;

use crate::week::WeekId;

/// Errors surfaced by ranking store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation.
    #[error("ranking store unavailable: {0}")]
    Unavailable(String),
    /// A stored entry could not be decoded.
    #[error("corrupt leaderboard entry: {0}")]
    Corrupt(String),
}

/// A leaderboard entry that has not been persisted yet. The store assigns the
/// id at append time.
#[derive(Debug, Clone)]
pub struct NewLeaderboardEntry {
    pub user_id: String,
    pub score: f64,
    pub players: Vec<PlayerSnapshot>,
    pub timestamp: DateTime<Utc>,
}

/// What the aggregator needs from a ranking store: append, ranked scan, batch
/// delete. Implementations must return scans ordered by score descending with
/// earlier timestamps first on equal scores, must delete the whole id batch
/// atomically, and must treat deleting an already-gone id as a no-op — the
/// trim's convergence under concurrent writers depends on all three.
#[async_trait]
pub trait RankingStore: Send + Sync {
    /// Insert one entry into a week's bucket and return it with its assigned
    /// id. Never conditioned on the bucket being under capacity.
    async fn append_entry(
        &self,
        week: WeekId,
        entry: NewLeaderboardEntry,
    ) -> Result<LeaderboardEntry, StoreError>;

    /// Ordered scan of a week's bucket, optionally truncated to `limit`.
    async fn ranked_entries(
        &self,
        week: WeekId,
        limit: Option<u64>,
    ) -> Result<Vec<LeaderboardEntry>, StoreError>;

    /// Delete the given entries from a week's bucket in one atomic batch.
    /// Ids that no longer exist are skipped silently.
    async fn delete_entries(&self, week: WeekId, ids: &[Uuid]) -> Result<(), StoreError>;
}
