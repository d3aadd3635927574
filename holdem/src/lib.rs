//! # Holdem
//!
//! Server-side engine for single hands of Texas Hold'em: dealing, betting
//! round tracking and stage progression for many concurrent games.
//!
//! ## Architecture
//!
//! A hand moves through six stages, one at a time:
//!
//! - **Initial**: Seats are filled, no cards dealt
//! - **PocketDealt**: Two private cards per player, first betting round
//! - **FlopDealt**: Three community cards
//! - **TurnDealt**: Fourth community card
//! - **RiverDealt**: Fifth community card, last betting round
//! - **GameOver**: Terminal
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, betting rules and the [`Game`] aggregate
//! - [`db`]: Game persistence with optimistic versioning
//! - [`service`]: Locked request handling and event notification
//! - [`config`]: Environment-driven settings
//!
//! ## Example
//!
//! ```
//! use holdem::{ActionType, Game, Stage};
//! use uuid::Uuid;
//!
//! let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
//! let mut game = Game::with_players([alice, bob]).unwrap();
//!
//! game.advance_if_ready().unwrap();
//! assert_eq!(game.stage(), Stage::PocketDealt);
//!
//! game.record_action(alice, ActionType::Call).unwrap();
//! game.record_action(bob, ActionType::Check).unwrap();
//! game.advance_if_ready().unwrap();
//! assert_eq!(game.community_cards().len(), 3);
//! ```

/// Engine and database configuration loaded from the environment.
pub mod config;
pub use config::{ConfigError, EngineConfig};

/// Game persistence.
pub mod db;

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    ActionType, BettingStatus, Card, Game, GameError, GameEvent, GameId, GameResult, PlayerId,
    PocketCards, Stage,
};

/// Request handling on top of the engine.
pub mod service;
pub use service::{GameResponse, GameService, GameStatus, ServiceError};
