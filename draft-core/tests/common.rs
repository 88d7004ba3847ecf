use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use draft_core::{MemoryRankingStore, NewLeaderboardEntry, RankingStore, StoreError, WeekId};
use draft_types::{GameDate, GameResult, LeaderboardEntry, PlayerSnapshot, ROSTER_POSITIONS};
use uuid::Uuid;

/// Creates a full 7-slot roster worth `points_each` per player
pub fn create_test_roster(points_each: f64) -> Vec<PlayerSnapshot> {
    ROSTER_POSITIONS
        .iter()
        .enumerate()
        .map(|(i, position)| PlayerSnapshot {
            name: format!("Player {}", i + 1),
            team: "FA".to_string(),
            position: position.to_string(),
            points: points_each,
            year: 2024,
        })
        .collect()
}

/// Shorthand UTC instant constructor
pub fn instant(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .unwrap()
}

/// Creates a finished game dated at the given instant
pub fn create_game_at(score: f64, played_at: DateTime<Utc>) -> GameResult {
    GameResult {
        score,
        players: create_test_roster(score / 7.0),
        date: Some(GameDate::Iso(played_at.to_rfc3339())),
    }
}

/// Creates a finished game the client never dated
pub fn create_undated_game(score: f64) -> GameResult {
    GameResult {
        score,
        players: create_test_roster(score / 7.0),
        date: None,
    }
}

/// Ranking store whose deletes can be switched to fail, for exercising trim
/// failure handling
pub struct FlakyDeleteStore {
    inner: MemoryRankingStore,
    fail_deletes: AtomicBool,
}

impl FlakyDeleteStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryRankingStore::new(),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RankingStore for FlakyDeleteStore {
    async fn append_entry(
        &self,
        week: WeekId,
        entry: NewLeaderboardEntry,
    ) -> Result<LeaderboardEntry, StoreError> {
        self.inner.append_entry(week, entry).await
    }

    async fn ranked_entries(
        &self,
        week: WeekId,
        limit: Option<u64>,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.inner.ranked_entries(week, limit).await
    }

    async fn delete_entries(&self, week: WeekId, ids: &[Uuid]) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "injected delete failure".to_string(),
            ));
        }
        self.inner.delete_entries(week, ids).await
    }
}
