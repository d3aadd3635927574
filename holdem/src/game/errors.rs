//! Game engine error types.

use thiserror::Error;

use super::cards::Card;
use super::entities::{PlayerId, Stage};

/// Errors raised by the game engine.
///
/// The first group are rejections of a request that the caller can report
/// back to the user. The second group are integrity failures: they mean the
/// engine or its stored state is broken and must never be silently retried.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GameError {
    #[error("not your turn")]
    NotPlayersTurn,
    #[error("player {0} is not part of this game")]
    UnknownPlayer(PlayerId),
    #[error("unknown action {0:?}")]
    InvalidAction(String),
    #[error("player {0} is already seated")]
    PlayerAlreadySeated(PlayerId),
    #[error("all {0} seats are taken")]
    TableFull(usize),
    #[error("seating closed once cards are dealt")]
    SeatingClosed,
    #[error("a game needs between {min} and {max} players, got {requested}")]
    InvalidPlayerCount {
        requested: usize,
        min: usize,
        max: usize,
    },

    #[error("deck exhausted: requested {requested} cards, {available} available")]
    ExhaustedDeck { requested: usize, available: usize },
    #[error("invalid stage transition from {from} to {to}")]
    InvalidStageTransition { from: Stage, to: Stage },
    #[error("card {0} is already in play")]
    DuplicateCard(Card),
    #[error("stage {stage} requires {expected} community cards, found {actual}")]
    CommunityCardMismatch {
        stage: Stage,
        expected: usize,
        actual: usize,
    },
    #[error("pocket cards of player {0} do not match stage {1}")]
    PocketCardMismatch(PlayerId, Stage),
    #[error("invalid game state: {0}")]
    InternalStateError(String),
}

impl GameError {
    /// Whether this is a rejection of the caller's request rather than a
    /// broken invariant.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NotPlayersTurn
                | Self::UnknownPlayer(_)
                | Self::InvalidAction(_)
                | Self::PlayerAlreadySeated(_)
                | Self::TableFull(_)
                | Self::SeatingClosed
                | Self::InvalidPlayerCount { .. }
        )
    }
}

/// Result type for game engine operations
pub type GameResult<T> = Result<T, GameError>;
