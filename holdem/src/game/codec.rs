//! Compact string encoding of game fields for storage and the wire.
//!
//! Formats:
//! - players: `guid|guid|...` in table order
//! - pocket cards: `guid$card1card2|guid$card1card2|...` for dealt players
//! - community cards: `card1|card2|...`
//! - betting status: one [`BettingStatus::code`] character per player, in
//!   table order
//!
//! Empty collections encode to the empty string.

use thiserror::Error;
use uuid::Uuid;

use super::cards::Card;
use super::entities::{BettingStatus, Player, PlayerId};

const ENTRY_SEPARATOR: char = '|';
const POCKET_SEPARATOR: char = '$';

/// Errors decoding a persisted game field.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum CodecError {
    #[error("invalid card code {0:?}")]
    InvalidCard(String),
    #[error("invalid stage {0:?}")]
    InvalidStage(String),
    #[error("invalid betting status code {0:?}")]
    InvalidStatus(char),
    #[error("invalid player id {0:?}")]
    InvalidPlayerId(String),
    #[error("malformed pocket entry {0:?}")]
    MalformedPocketEntry(String),
    #[error("{statuses} betting statuses for {players} players")]
    StatusCountMismatch { statuses: usize, players: usize },
}

fn split_entries(encoded: &str) -> impl Iterator<Item = &str> {
    encoded
        .split(ENTRY_SEPARATOR)
        .filter(|entry| !entry.is_empty())
}

fn parse_player_id(s: &str) -> Result<PlayerId, CodecError> {
    Uuid::parse_str(s).map_err(|_| CodecError::InvalidPlayerId(s.to_string()))
}

#[must_use]
pub fn encode_player_ids(players: &[Player]) -> String {
    players
        .iter()
        .map(|player| player.id.to_string())
        .collect::<Vec<_>>()
        .join("|")
}

pub fn decode_player_ids(encoded: &str) -> Result<Vec<PlayerId>, CodecError> {
    split_entries(encoded).map(parse_player_id).collect()
}

/// Encode the pocket cards of every dealt player.
#[must_use]
pub fn encode_pocket_cards(players: &[Player]) -> String {
    players
        .iter()
        .filter_map(|player| {
            player
                .pocket
                .map(|[first, second]| format!("{}{POCKET_SEPARATOR}{first}{second}", player.id))
        })
        .collect::<Vec<_>>()
        .join("|")
}

pub fn decode_pocket_cards(encoded: &str) -> Result<Vec<(PlayerId, [Card; 2])>, CodecError> {
    split_entries(encoded)
        .map(|entry| {
            let (id, cards) = entry
                .split_once(POCKET_SEPARATOR)
                .ok_or_else(|| CodecError::MalformedPocketEntry(entry.to_string()))?;
            if cards.len() != 4 || !cards.is_ascii() {
                return Err(CodecError::MalformedPocketEntry(entry.to_string()));
            }
            let (first, second) = cards.split_at(2);
            Ok((parse_player_id(id)?, [first.parse()?, second.parse()?]))
        })
        .collect()
}

#[must_use]
pub fn encode_community_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

pub fn decode_community_cards(encoded: &str) -> Result<Vec<Card>, CodecError> {
    split_entries(encoded).map(str::parse).collect()
}

#[must_use]
pub fn encode_betting_status(players: &[Player]) -> String {
    players.iter().map(|player| player.status.code()).collect()
}

pub fn decode_betting_status(encoded: &str) -> Result<Vec<BettingStatus>, CodecError> {
    encoded
        .chars()
        .map(|code| BettingStatus::from_code(code).ok_or(CodecError::InvalidStatus(code)))
        .collect()
}

/// Rebuild the ordered player list from the three encoded player fields.
///
/// Every pocket entry must belong to a listed player and the status string
/// must have exactly one character per player.
pub fn decode_players(
    player_ids: &str,
    pocket_cards: &str,
    betting_status: &str,
) -> Result<Vec<Player>, CodecError> {
    let ids = decode_player_ids(player_ids)?;
    let statuses = decode_betting_status(betting_status)?;
    if statuses.len() != ids.len() {
        return Err(CodecError::StatusCountMismatch {
            statuses: statuses.len(),
            players: ids.len(),
        });
    }

    let mut players: Vec<Player> = ids
        .into_iter()
        .zip(statuses)
        .map(|(id, status)| Player {
            status,
            ..Player::new(id)
        })
        .collect();

    for (id, cards) in decode_pocket_cards(pocket_cards)? {
        let player = players
            .iter_mut()
            .find(|player| player.id == id)
            .ok_or_else(|| CodecError::InvalidPlayerId(id.to_string()))?;
        if player.pocket.replace(cards).is_some() {
            return Err(CodecError::MalformedPocketEntry(id.to_string()));
        }
    }

    Ok(players)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cards::{Rank, Suit};

    fn player(id: &str, pocket: Option<&str>, status: BettingStatus) -> Player {
        Player {
            id: Uuid::parse_str(id).unwrap(),
            pocket: pocket.map(|cards| [cards[..2].parse().unwrap(), cards[2..].parse().unwrap()]),
            status,
        }
    }

    const ALICE: &str = "6f1c1d4e-6a43-4b55-9a8e-2f4e5a1b7c01";
    const BOB: &str = "0b3e8f2a-1d5c-4e9b-8a7f-3c2d1e0f9a02";

    #[test]
    fn test_encode_pocket_cards_layout() {
        let players = vec![
            player(ALICE, Some("h3h4"), BettingStatus::CallOrCheck),
            player(BOB, Some("d3d4"), BettingStatus::Fold),
        ];

        assert_eq!(
            encode_pocket_cards(&players),
            format!("{ALICE}$h3h4|{BOB}$d3d4")
        );
        assert_eq!(encode_betting_status(&players), "CF");
        assert_eq!(encode_player_ids(&players), format!("{ALICE}|{BOB}"));
    }

    #[test]
    fn test_undealt_players_have_no_pocket_entry() {
        let players = vec![
            player(ALICE, None, BettingStatus::NotYetActed),
            player(BOB, None, BettingStatus::NotYetActed),
        ];
        assert_eq!(encode_pocket_cards(&players), "");
    }

    #[test]
    fn test_community_cards_layout() {
        let cards: Vec<Card> = vec![
            Card(Rank::Two, Suit::Heart),
            Card(Rank::Ten, Suit::Diamond),
            Card(Rank::Ace, Suit::Club),
        ];
        assert_eq!(encode_community_cards(&cards), "h2|dt|ca");
        assert_eq!(decode_community_cards("h2|dt|ca").unwrap(), cards);
        assert!(decode_community_cards("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_players_restores_order_and_pockets() {
        let encoded_ids = format!("{BOB}|{ALICE}");
        let pockets = format!("{ALICE}$sksq|{BOB}$c2c3");

        let players = decode_players(&encoded_ids, &pockets, "RN").unwrap();

        assert_eq!(players[0], player(BOB, Some("c2c3"), BettingStatus::ReRaise));
        assert_eq!(
            players[1],
            player(ALICE, Some("sksq"), BettingStatus::NotYetActed)
        );
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert_eq!(
            decode_betting_status("CX"),
            Err(CodecError::InvalidStatus('X'))
        );
        assert!(matches!(
            decode_pocket_cards(&format!("{ALICE}h3h4")),
            Err(CodecError::MalformedPocketEntry(_))
        ));
        assert!(matches!(
            decode_pocket_cards(&format!("{ALICE}$h3h")),
            Err(CodecError::MalformedPocketEntry(_))
        ));
        assert!(matches!(
            decode_pocket_cards("not-a-guid$h3h4"),
            Err(CodecError::InvalidPlayerId(_))
        ));
        assert!(matches!(
            decode_community_cards("h2|zz"),
            Err(CodecError::InvalidCard(_))
        ));
    }

    #[test]
    fn test_decode_players_rejects_strangers_and_length_mismatch() {
        assert!(decode_players(ALICE, &format!("{BOB}$h3h4"), "N").is_err());
        assert_eq!(
            decode_players(ALICE, "", "NN"),
            Err(CodecError::StatusCountMismatch {
                statuses: 2,
                players: 1
            })
        );
    }
}
