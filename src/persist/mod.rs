//! Journaling of a scouted game so it can be resumed after a restart.
//!
//! Two things are kept: every [`StoredOp`] the event log produces, and the
//! latest [`SavedGame`] (teams and clock). Replaying the ops into an empty
//! [`crate::core::event_log::EventLog`] and restoring the saved clock gives
//! back the session.

/// SQLite journal.
pub mod sqlite;

use serde::{Deserialize, Serialize};

use crate::{
    core::{clock::GameClock, session::ScoutSession},
    error::ScoutError,
    op::StoredOp,
    types::{OpSeq, Side, TeamInfo},
};

/// Failures raised by journal sinks.
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("payload encoding error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Replayed ops did not fit the log.
    #[error("replay error: {0}")]
    Replay(#[from] ScoutError),
    /// A journal row was written by an incompatible version.
    #[error("unsupported journal format version: {0}")]
    UnsupportedFormat(u16),
    /// The blocking journal task panicked or was cancelled.
    #[error("journal task failed: {0}")]
    Worker(String),
}

pub type PersistResult<T> = Result<T, PersistError>;

/// Everything besides the event log needed to resume a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub home: TeamInfo,
    pub away: TeamInfo,
    pub clock: GameClock,
}

impl SavedGame {
    pub fn capture(session: &ScoutSession) -> Self {
        Self {
            home: session.team_info(Side::Home).clone(),
            away: session.team_info(Side::Away).clone(),
            clock: session.clock().clone(),
        }
    }
}

/// Destination for journaled log ops and game state.
pub trait OpSink: Send {
    /// Appends ops in sequence order and returns the highest sequence stored.
    fn append_ops(&mut self, ops: &[StoredOp]) -> PersistResult<OpSeq>;

    /// Replaces the saved teams and clock.
    fn save_game(&mut self, game: &SavedGame) -> PersistResult<()>;
}
