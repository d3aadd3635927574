//! Card ledger: the set of cards already committed to a game.

use std::collections::BTreeSet;

use super::cards::Card;
use super::entities::Player;
use super::errors::{GameError, GameResult};

/// Cards in play for one game, pocket and community together.
///
/// A ledger is derived from the game's current state each time cards are
/// drawn and is never stored alongside it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CardLedger {
    cards: BTreeSet<Card>,
}

impl CardLedger {
    /// Collect every card on the board and in any player's pocket.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateCard`] if a card already appears twice.
    pub fn build(community_cards: &[Card], players: &[Player]) -> GameResult<Self> {
        let mut ledger = Self::default();
        let pockets = players.iter().filter_map(|player| player.pocket).flatten();
        for card in community_cards.iter().copied().chain(pockets) {
            ledger.commit(card)?;
        }
        Ok(ledger)
    }

    /// Check that `drawn` can be added to the ledger without repeating a card.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateCard`] for the first offending card.
    pub fn ensure_disjoint(&self, drawn: &[Card]) -> GameResult<()> {
        let mut seen = BTreeSet::new();
        for &card in drawn {
            if self.cards.contains(&card) || !seen.insert(card) {
                log::error!("Refusing to deal {card}: already in play");
                return Err(GameError::DuplicateCard(card));
            }
        }
        Ok(())
    }

    fn commit(&mut self, card: Card) -> GameResult<()> {
        if self.cards.insert(card) {
            Ok(())
        } else {
            log::error!("Card {card} appears more than once in game state");
            Err(GameError::DuplicateCard(card))
        }
    }

    #[must_use]
    pub fn cards(&self) -> &BTreeSet<Card> {
        &self.cards
    }

    #[must_use]
    pub fn contains(&self, card: &Card) -> bool {
        self.cards.contains(card)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
