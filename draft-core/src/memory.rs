use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use draft_types::{LeaderboardEntry, PlayerSnapshot};
use uuid::Uuid;

use crate::ranking;
use crate::store::{NewLeaderboardEntry, RankingStore, StoreError};
use crate::week::WeekId;

type Buckets = HashMap<WeekId, Vec<StoredEntry>>;

/// In-memory ranking store. Stands in for the database in tests and anywhere
/// a process-local leaderboard is enough; same append/scan/delete contract.
#[derive(Default)]
pub struct MemoryRankingStore {
    buckets: Mutex<Buckets>,
}

#[derive(Clone)]
struct StoredEntry {
    id: Uuid,
    user_id: String,
    score: f64,
    players: Vec<PlayerSnapshot>,
    timestamp: DateTime<Utc>,
}

impl StoredEntry {
    fn to_entry(&self) -> LeaderboardEntry {
        LeaderboardEntry {
            id: self.id,
            user_id: self.user_id.clone(),
            score: self.score,
            players: self.players.clone(),
            timestamp: self.timestamp.to_rfc3339(),
        }
    }
}

impl MemoryRankingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Buckets>, StoreError> {
        self.buckets
            .lock()
            .map_err(|_| StoreError::Unavailable("bucket lock poisoned".to_string()))
    }
}

#[async_trait]
impl RankingStore for MemoryRankingStore {
    async fn append_entry(
        &self,
        week: WeekId,
        entry: NewLeaderboardEntry,
    ) -> Result<LeaderboardEntry, StoreError> {
        let mut buckets = self.lock()?;
        let stored = StoredEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            score: entry.score,
            players: entry.players,
            timestamp: entry.timestamp,
        };
        let created = stored.to_entry();
        buckets.entry(week).or_default().push(stored);
        Ok(created)
    }

    async fn ranked_entries(
        &self,
        week: WeekId,
        limit: Option<u64>,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let buckets = self.lock()?;
        let mut entries = buckets.get(&week).cloned().unwrap_or_default();
        entries.sort_by(|a, b| {
            ranking::rank_ordering((a.score, a.timestamp), (b.score, b.timestamp))
        });
        if let Some(limit) = limit {
            entries.truncate(limit as usize);
        }
        Ok(entries.iter().map(StoredEntry::to_entry).collect())
    }

    async fn delete_entries(&self, week: WeekId, ids: &[Uuid]) -> Result<(), StoreError> {
        let mut buckets = self.lock()?;
        if let Some(bucket) = buckets.get_mut(&week) {
            bucket.retain(|entry| !ids.contains(&entry.id));
        }
        Ok(())
    }
}
