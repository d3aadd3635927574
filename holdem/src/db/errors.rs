//! Persistence error types.

use std::time::Duration;
use thiserror::Error;

use crate::game::{CodecError, GameError, GameId};

/// Errors raised by a [`GameRepository`](super::GameRepository)
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No game stored under this id
    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    /// Game already exists (insert of a duplicate id)
    #[error("Game already exists: {0}")]
    DuplicateGame(GameId),

    /// Stored version moved on since the game was loaded
    #[error("Version conflict on game {game_id}: expected version {expected}")]
    VersionConflict { game_id: GameId, expected: i64 },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query did not finish in time
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// A stored field could not be decoded
    #[error("Corrupt game record: {0}")]
    Codec(#[from] CodecError),

    /// Decoded fields do not form a consistent game
    #[error("Corrupt game record: {0}")]
    CorruptGame(#[from] GameError),

    /// Bet history could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepositoryError {
    /// Whether the operation may succeed if replayed against fresh state
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::VersionConflict { .. } | Self::Timeout(_))
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
