use chrono::{DateTime, TimeZone, Utc};
use draft_types::{GameDate, GameResult, PlayerSnapshot};
use thiserror::Error;

use crate::events::GameRecorded;
use crate::store::StoreError;

/// Why a submission was rejected or failed.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Rejected before any store interaction; nothing was written.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A validated submission with its timestamp pinned down, ready to append.
#[derive(Debug, Clone)]
pub struct GameSubmission {
    pub user_id: String,
    pub score: f64,
    pub players: Vec<PlayerSnapshot>,
    pub timestamp: DateTime<Utc>,
}

impl GameSubmission {
    /// Validate a raw submission. `received_at` stamps games the client did
    /// not date itself; a date the client *did* send must parse, malformed
    /// dates are rejected rather than silently replaced.
    pub fn new(
        user_id: &str,
        game: &GameResult,
        received_at: DateTime<Utc>,
    ) -> Result<Self, SubmitError> {
        validate_fields(user_id, game.score, &game.players)?;
        let timestamp = match &game.date {
            Some(date) => normalize_date(date)?,
            None => received_at,
        };
        Ok(Self {
            user_id: user_id.to_string(),
            score: game.score,
            players: game.players.clone(),
            timestamp,
        })
    }
}

impl TryFrom<GameRecorded> for GameSubmission {
    type Error = SubmitError;

    /// The history-trigger path. The record already carries a typed instant,
    /// so only the content checks apply.
    fn try_from(event: GameRecorded) -> Result<Self, Self::Error> {
        validate_fields(&event.user_id, event.score, &event.players)?;
        Ok(Self {
            user_id: event.user_id,
            score: event.score,
            players: event.players,
            timestamp: event.played_at,
        })
    }
}

fn validate_fields(
    user_id: &str,
    score: f64,
    players: &[PlayerSnapshot],
) -> Result<(), SubmitError> {
    if user_id.trim().is_empty() {
        return Err(SubmitError::InvalidInput(
            "userId must not be empty".to_string(),
        ));
    }
    if players.is_empty() {
        return Err(SubmitError::InvalidInput(
            "players must not be empty".to_string(),
        ));
    }
    if !score.is_finite() || score < 0.0 {
        return Err(SubmitError::InvalidInput(format!(
            "score must be a non-negative number, got {}",
            score
        )));
    }
    Ok(())
}

fn normalize_date(date: &GameDate) -> Result<DateTime<Utc>, SubmitError> {
    match date {
        GameDate::Iso(text) => DateTime::parse_from_rfc3339(text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|err| {
                SubmitError::InvalidInput(format!("unparseable date {:?}: {}", text, err))
            }),
        GameDate::UnixSeconds(seconds) => Utc
            .timestamp_opt(*seconds, 0)
            .single()
            .ok_or_else(|| {
                SubmitError::InvalidInput(format!("unrepresentable unix timestamp {}", seconds))
            }),
    }
}
