//! Request and response types of the game service.

use serde::{Deserialize, Serialize};

use super::errors::ServiceError;
use crate::db::RepositoryError;
use crate::game::{Card, Game, GameError, GameId, PlayerId, Stage};

/// Response to [`GameService::submit_action`](super::GameService::submit_action)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum GameResponse {
    /// Action recorded
    Success,

    /// Another player is to act
    NotYourTurn,

    /// Requesting player is not seated in this game
    UnknownPlayer,

    /// No such game
    GameNotFound,

    /// Action name or request not valid for this game
    InvalidAction(String),

    /// Game was busy, the same request may be retried
    Busy,

    /// Operation failed
    Error(String),
}

impl GameResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, GameResponse::Success)
    }

    /// Human-readable reason for a rejection
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        let repr = match self {
            GameResponse::Success => return None,
            GameResponse::NotYourTurn => "Not your turn".to_string(),
            GameResponse::UnknownPlayer => "Player is not part of this game".to_string(),
            GameResponse::GameNotFound => "Game not found".to_string(),
            GameResponse::InvalidAction(reason) => format!("Invalid action: {reason}"),
            GameResponse::Busy => "Game is busy, please retry".to_string(),
            GameResponse::Error(message) => message.clone(),
        };
        Some(repr)
    }
}

impl From<ServiceError> for GameResponse {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Game(GameError::NotPlayersTurn) => GameResponse::NotYourTurn,
            ServiceError::Game(GameError::UnknownPlayer(_)) => GameResponse::UnknownPlayer,
            ServiceError::Game(GameError::InvalidAction(action)) => {
                GameResponse::InvalidAction(action)
            }
            ServiceError::Game(ref e) if e.is_user_error() => {
                GameResponse::InvalidAction(e.to_string())
            }
            ServiceError::Repository(RepositoryError::GameNotFound(_)) => {
                GameResponse::GameNotFound
            }
            ref e if e.is_retryable() => GameResponse::Busy,
            e => GameResponse::Error(e.client_message()),
        }
    }
}

/// What one user may see of a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatus {
    pub game_id: GameId,
    pub version: i64,
    pub stage: Stage,
    pub community_cards: Vec<Card>,
    pub player_to_action: Option<PlayerId>,
    /// The requesting user's own pocket cards, if dealt
    pub pocket_cards: Option<[Card; 2]>,
}

impl GameStatus {
    /// Snapshot of `game` as seen by `viewer`.
    ///
    /// Pocket cards are only ever looked up for the viewer, so a status can
    /// never carry anyone else's cards.
    #[must_use]
    pub fn from_game(game: &Game, viewer: Option<PlayerId>) -> Self {
        Self {
            game_id: game.guid(),
            version: game.version(),
            stage: game.stage(),
            community_cards: game.community_cards().to_vec(),
            player_to_action: game.player_to_action(),
            pocket_cards: viewer.and_then(|player_id| game.pocket_cards(&player_id).cards()),
        }
    }
}
