//! Service error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::game::{GameError, GameId};

/// Errors surfaced by [`GameService`](super::GameService)
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected or failed engine operation
    #[error(transparent)]
    Game(#[from] GameError),

    /// Storage failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Another request holds the game's lock
    #[error("Game {game_id} is busy")]
    LockContention { game_id: GameId },
}

impl ServiceError {
    /// Whether the caller may retry the same request unchanged
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::LockContention { .. } => true,
            ServiceError::Repository(e) => e.is_transient(),
            ServiceError::Game(_) => false,
        }
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Storage errors and engine integrity failures are collapsed into a
    /// generic message, game ids are redacted.
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::Game(e) if e.is_user_error() => e.to_string(),
            ServiceError::Game(_) => "Internal game error".to_string(),
            ServiceError::Repository(RepositoryError::GameNotFound(_)) => {
                "Game not found".to_string()
            }
            ServiceError::Repository(RepositoryError::DuplicateGame(_)) => {
                "Game already exists".to_string()
            }
            ServiceError::LockContention { .. } => "Game is busy, please retry".to_string(),
            ServiceError::Repository(e) if e.is_transient() => {
                "Game is busy, please retry".to_string()
            }
            ServiceError::Repository(_) => "Internal server error".to_string(),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
