//! Card universe and the stateless deck.
//!
//! Cards are written with the two-character code used by the persisted
//! game record: a suit letter (`d`, `c`, `h`, `s`) followed by a rank
//! character (`2`-`9`, `t`, `j`, `q`, `k`, `a`). For example `h2` is the two
//! of hearts, `dt` the ten of diamonds and `ca` the ace of clubs.

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

use super::codec::CodecError;
use super::errors::{GameError, GameResult};

/// Number of cards in the universe.
pub const DECK_SIZE: usize = 52;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Diamond,
    Club,
    Heart,
    Spade,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Diamond, Self::Club, Self::Heart, Self::Spade];

    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Diamond => 'd',
            Self::Club => 'c',
            Self::Heart => 'h',
            Self::Spade => 's',
        }
    }

    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|suit| suit.code() == code.to_ascii_lowercase())
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Diamond => "♦",
            Self::Club => "♣",
            Self::Heart => "♥",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Self; 13] = [
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
        Self::Ace,
    ];

    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Two => '2',
            Self::Three => '3',
            Self::Four => '4',
            Self::Five => '5',
            Self::Six => '6',
            Self::Seven => '7',
            Self::Eight => '8',
            Self::Nine => '9',
            Self::Ten => 't',
            Self::Jack => 'j',
            Self::Queen => 'q',
            Self::King => 'k',
            Self::Ace => 'a',
        }
    }

    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rank| rank.code() == code.to_ascii_lowercase())
    }
}

/// A playing card. Serializes as its two-character code.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(into = "String", try_from = "String")]
pub struct Card(pub Rank, pub Suit);

impl Card {
    #[must_use]
    pub const fn rank(&self) -> Rank {
        self.0
    }

    #[must_use]
    pub const fn suit(&self) -> Suit {
        self.1
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.1.code(), self.0.code())
    }
}

impl FromStr for Card {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(suit), Some(rank), None) => {
                match (Suit::from_code(suit), Rank::from_code(rank)) {
                    (Some(suit), Some(rank)) => Ok(Self(rank, suit)),
                    _ => Err(CodecError::InvalidCard(s.to_string())),
                }
            }
            _ => Err(CodecError::InvalidCard(s.to_string())),
        }
    }
}

impl From<Card> for String {
    fn from(value: Card) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Card {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The 52-card universe.
///
/// The deck holds no state. Cards already in play are passed to
/// [`Deck::draw`] as an exclusion set, so the same value can be shared by
/// any number of concurrent games.
#[derive(Clone, Copy, Debug, Default)]
pub struct Deck;

impl Deck {
    /// Every card in the universe, suit-major.
    pub fn cards() -> impl Iterator<Item = Card> {
        Suit::ALL
            .into_iter()
            .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| Card(rank, suit)))
    }

    /// Draw `count` distinct cards, none of them in `exclude`, uniformly at
    /// random without replacement.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ExhaustedDeck`] if fewer than `count` cards remain
    /// outside `exclude`.
    pub fn draw<R>(count: usize, exclude: &BTreeSet<Card>, rng: &mut R) -> GameResult<Vec<Card>>
    where
        R: Rng + ?Sized,
    {
        let mut available: Vec<Card> = Self::cards()
            .filter(|card| !exclude.contains(card))
            .collect();
        if count > available.len() {
            return Err(GameError::ExhaustedDeck {
                requested: count,
                available: available.len(),
            });
        }

        available.shuffle(rng);
        available.truncate(count);
        Ok(available)
    }
}
