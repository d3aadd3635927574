//! Poker game engine: cards, betting rules and the game aggregate.
//!
//! This module provides the single-hand Texas Hold'em engine:
//! - Stateless 52-card deck with exclusion-based draws
//! - Card ledger guarding against dealing a card twice
//! - Pure stage and betting-round rules
//! - The [`Game`] aggregate with its stage transition engine
//! - String codec for the persisted game record

pub mod cards;
pub mod codec;
pub mod entities;
pub mod errors;
pub mod ledger;
pub mod rules;
pub mod state_machine;

pub use cards::{Card, Deck, Rank, Suit};
pub use codec::CodecError;
pub use entities::{
    ActionType, BetRecord, BettingStatus, GameId, MAX_PLAYERS, MIN_PLAYERS, Player, PlayerId,
    PocketCards, Stage,
};
pub use errors::{GameError, GameResult};
pub use ledger::CardLedger;
pub use state_machine::{Game, GameEvent, GameEventKind, GameParts};
