use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::cards::Card;
use super::codec::CodecError;
use super::errors::GameError;

/// Unique identifier of a game.
pub type GameId = Uuid;

/// Unique identifier of a player.
pub type PlayerId = Uuid;

/// Fewest players a game can be created with.
pub const MIN_PLAYERS: usize = 2;

/// Most players a game can be created with. Ten players use at most
/// 10 * 2 + 5 = 25 cards.
pub const MAX_PLAYERS: usize = 10;

/// Dealing stage of a hand. Stages only move forward, one at a time.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initial,
    PocketDealt,
    FlopDealt,
    TurnDealt,
    RiverDealt,
    GameOver,
}

impl Stage {
    pub const ALL: [Self; 6] = [
        Self::Initial,
        Self::PocketDealt,
        Self::FlopDealt,
        Self::TurnDealt,
        Self::RiverDealt,
        Self::GameOver,
    ];

    /// The stage that follows this one, `None` for [`Stage::GameOver`].
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Initial => Some(Self::PocketDealt),
            Self::PocketDealt => Some(Self::FlopDealt),
            Self::FlopDealt => Some(Self::TurnDealt),
            Self::TurnDealt => Some(Self::RiverDealt),
            Self::RiverDealt => Some(Self::GameOver),
            Self::GameOver => None,
        }
    }

    /// Number of community cards on the board during this stage.
    #[must_use]
    pub const fn community_len(self) -> usize {
        match self {
            Self::Initial | Self::PocketDealt => 0,
            Self::FlopDealt => 3,
            Self::TurnDealt => 4,
            Self::RiverDealt | Self::GameOver => 5,
        }
    }

    /// Whether players take betting actions during this stage.
    #[must_use]
    pub const fn is_betting(self) -> bool {
        !matches!(self, Self::Initial | Self::GameOver)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::PocketDealt => "pocket_dealt",
            Self::FlopDealt => "flop_dealt",
            Self::TurnDealt => "turn_dealt",
            Self::RiverDealt => "river_dealt",
            Self::GameOver => "game_over",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| CodecError::InvalidStage(s.to_string()))
    }
}

/// A player's standing in the current betting round.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BettingStatus {
    Fold,
    Bet,
    CallOrCheck,
    ReRaise,
    #[default]
    NotYetActed,
}

impl BettingStatus {
    /// Single character used in the persisted status string.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Fold => 'F',
            Self::Bet => 'B',
            Self::CallOrCheck => 'C',
            Self::ReRaise => 'R',
            Self::NotYetActed => 'N',
        }
    }

    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'F' => Some(Self::Fold),
            'B' => Some(Self::Bet),
            'C' => Some(Self::CallOrCheck),
            'R' => Some(Self::ReRaise),
            'N' => Some(Self::NotYetActed),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_folded(self) -> bool {
        matches!(self, Self::Fold)
    }
}

impl fmt::Display for BettingStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "folded",
            Self::Bet => "bet",
            Self::CallOrCheck => "call/check",
            Self::ReRaise => "re-raise",
            Self::NotYetActed => "waiting",
        };
        write!(f, "{repr}")
    }
}

/// Action a player submits on their turn. Amounts are not tracked.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Check,
    Call,
    Bet,
    Fold,
    ReRaise,
}

impl ActionType {
    /// Betting status the action leaves the player in.
    #[must_use]
    pub const fn status(self) -> BettingStatus {
        match self {
            Self::Check | Self::Call => BettingStatus::CallOrCheck,
            Self::Bet => BettingStatus::Bet,
            Self::Fold => BettingStatus::Fold,
            Self::ReRaise => BettingStatus::ReRaise,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Check => "checks",
            Self::Call => "calls",
            Self::Bet => "bets",
            Self::Fold => "folds",
            Self::ReRaise => "re-raises",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for ActionType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "check" => Ok(Self::Check),
            "call" => Ok(Self::Call),
            "bet" => Ok(Self::Bet),
            "fold" => Ok(Self::Fold),
            "re-raise" | "reraise" | "re_raise" | "raise" => Ok(Self::ReRaise),
            _ => Err(GameError::InvalidAction(s.to_string())),
        }
    }
}

/// A seated player.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    /// Dealt once, when the game leaves [`Stage::Initial`].
    pub pocket: Option<[Card; 2]>,
    pub status: BettingStatus,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            pocket: None,
            status: BettingStatus::NotYetActed,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.status.is_folded()
    }
}

/// Entry of the append-only action ledger.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BetRecord {
    pub player: PlayerId,
    pub action: ActionType,
    pub stage: Stage,
    pub at: DateTime<Utc>,
}

impl BetRecord {
    #[must_use]
    pub fn new(player: PlayerId, action: ActionType, stage: Stage) -> Self {
        Self {
            player,
            action,
            stage,
            at: Utc::now(),
        }
    }
}

/// Outcome of a pocket-card lookup for one player.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "status", content = "cards", rename_all = "snake_case")]
pub enum PocketCards {
    Dealt([Card; 2]),
    NotYetDealt,
    UnknownPlayer,
}

impl PocketCards {
    #[must_use]
    pub const fn cards(&self) -> Option<[Card; 2]> {
        match self {
            Self::Dealt(cards) => Some(*cards),
            _ => None,
        }
    }
}
