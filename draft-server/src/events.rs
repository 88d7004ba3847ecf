use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use draft_core::{GameRecorded, LeaderboardAggregator};

/// Channel carrying recorded games from the history surface to the ranking
/// pipeline. Unbounded: recording a game must never block on the consumer.
pub fn game_event_channel() -> (
    mpsc::UnboundedSender<GameRecorded>,
    mpsc::UnboundedReceiver<GameRecorded>,
) {
    mpsc::unbounded_channel()
}

/// Drains recorded-game events into the aggregator, one at a time. Runs until
/// every sender is dropped; outcomes are logged inside the aggregator rather
/// than reported back.
pub fn spawn_game_recorded_consumer(
    aggregator: Arc<LeaderboardAggregator>,
    mut events: mpsc::UnboundedReceiver<GameRecorded>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            aggregator.handle_game_recorded(event).await;
        }
        info!("Game event channel closed, consumer stopping");
    })
}
