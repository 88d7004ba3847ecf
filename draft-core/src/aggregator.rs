use std::sync::Arc;

use chrono::Utc;
use draft_types::{GameResult, LeaderboardEntry};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::events::GameRecorded;
use crate::ranking;
use crate::store::{NewLeaderboardEntry, RankingStore, StoreError};
use crate::submission::{GameSubmission, SubmitError};
use crate::week::WeekId;

/// Maintains the bounded per-week rankings over the stream of finished games.
///
/// Every write path is append-then-trim: the append is the unit of success,
/// the trim is best-effort cleanup that any later invocation can redo. The
/// aggregator keeps no state of its own beyond the shared store handle, so
/// invocations are free to run concurrently.
pub struct LeaderboardAggregator {
    store: Arc<dyn RankingStore>,
}

impl LeaderboardAggregator {
    pub fn new(store: Arc<dyn RankingStore>) -> Self {
        Self { store }
    }

    /// Direct submission surface. Returns the stored entry on success; the
    /// caller learns whether the append landed, never how the trim went.
    pub async fn submit_game(
        &self,
        user_id: &str,
        game: &GameResult,
    ) -> Result<LeaderboardEntry, SubmitError> {
        let submission = GameSubmission::new(user_id, game, Utc::now())?;
        self.record(submission).await
    }

    /// Append a validated submission to the week its timestamp resolves to,
    /// then run a best-effort trim of that week.
    pub async fn record(
        &self,
        submission: GameSubmission,
    ) -> Result<LeaderboardEntry, SubmitError> {
        let week = WeekId::from_datetime(submission.timestamp);
        let entry = self
            .store
            .append_entry(
                week,
                NewLeaderboardEntry {
                    user_id: submission.user_id,
                    score: submission.score,
                    players: submission.players,
                    timestamp: submission.timestamp,
                },
            )
            .await?;
        info!(
            "Appended entry {} (user {}, score {}) to week {}",
            entry.id, entry.user_id, entry.score, week
        );

        if let Err(err) = self.trim_week(week).await {
            // The append already counts; the next submission for this week
            // re-attempts the cleanup.
            warn!("Trim for week {} failed: {}", week, err);
        }

        Ok(entry)
    }

    /// Delete everything past the retained top-10 of a week. Safe to run
    /// concurrently with other trims: each observer only deletes ids beyond
    /// rank 10 in its own scan, and deleting an already-gone id is a no-op.
    /// Returns how many entries were removed.
    pub async fn trim_week(&self, week: WeekId) -> Result<usize, StoreError> {
        let ranked = self.store.ranked_entries(week, None).await?;
        let overflow = ranking::beyond_capacity(&ranked);
        if overflow.is_empty() {
            return Ok(0);
        }

        let ids: Vec<Uuid> = overflow.iter().map(|entry| entry.id).collect();
        self.store.delete_entries(week, &ids).await?;
        info!("Trimmed {} entries from week {}", ids.len(), week);
        Ok(ids.len())
    }

    /// Ordered top-10 for a week, the current one when unspecified. Fewer
    /// than 10 rows come back as-is; padding is the caller's concern.
    pub async fn top_entries(
        &self,
        week: Option<WeekId>,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let week = week.unwrap_or_else(WeekId::current);
        self.store
            .ranked_entries(week, Some(ranking::LEADERBOARD_CAPACITY as u64))
            .await
    }

    /// History-trigger surface: fire-and-forget, outcome is only logged.
    pub async fn handle_game_recorded(&self, event: GameRecorded) {
        let user_id = event.user_id.clone();
        let submission = match GameSubmission::try_from(event) {
            Ok(submission) => submission,
            Err(err) => {
                warn!("Dropping recorded game for user {}: {}", user_id, err);
                return;
            }
        };
        if let Err(err) = self.record(submission).await {
            error!("Failed to rank recorded game for user {}: {}", user_id, err);
        }
    }
}
