//! Stage and betting-round rules.
//!
//! Everything here is a pure function of its arguments so it can be
//! checked in isolation from the [`Game`](super::Game) aggregate.

use super::entities::{BettingStatus, Player, Stage};

/// Cards that must be drawn to leave `stage`.
///
/// | current stage | cards needed          |
/// |---------------|-----------------------|
/// | Initial       | 2 per player (pocket) |
/// | PocketDealt   | 3 (flop)              |
/// | FlopDealt     | 1 (turn)              |
/// | TurnDealt     | 1 (river)             |
/// | RiverDealt    | 0 (showdown)          |
/// | GameOver      | 0                     |
#[must_use]
pub const fn cards_needed_for_next_stage(stage: Stage, total_players: usize) -> usize {
    match stage {
        Stage::Initial => total_players * 2,
        Stage::PocketDealt => 3,
        Stage::FlopDealt | Stage::TurnDealt => 1,
        Stage::RiverDealt | Stage::GameOver => 0,
    }
}

/// Whether the betting round described by `statuses` is over.
///
/// Folded players are ignored. The round is over once no remaining player
/// is still waiting to act, or as soon as at most one player remains.
#[must_use]
pub fn is_betting_round_complete<I>(statuses: I) -> bool
where
    I: IntoIterator<Item = BettingStatus>,
{
    let mut num_active = 0;
    let mut waiting = false;
    for status in statuses {
        match status {
            BettingStatus::Fold => {}
            BettingStatus::NotYetActed => {
                num_active += 1;
                waiting = true;
            }
            BettingStatus::Bet | BettingStatus::CallOrCheck | BettingStatus::ReRaise => {
                num_active += 1;
            }
        }
    }
    num_active <= 1 || !waiting
}

/// Number of players that have not folded.
#[must_use]
pub fn num_active(players: &[Player]) -> usize {
    players.iter().filter(|player| player.is_active()).count()
}

/// Re-open the round after the player at `raiser_idx` re-raised: every
/// other player that has not folded must act again.
pub fn reopen_round(players: &mut [Player], raiser_idx: usize) {
    for (idx, player) in players.iter_mut().enumerate() {
        if idx != raiser_idx && player.is_active() {
            player.status = BettingStatus::NotYetActed;
        }
    }
}

/// Start a fresh betting round: every player that has not folded is
/// waiting to act again.
pub fn reset_round(players: &mut [Player]) {
    for player in players.iter_mut().filter(|player| player.is_active()) {
        player.status = BettingStatus::NotYetActed;
    }
}

/// First player in table order that still has to act in a fresh round.
///
/// `None` when no decision is possible because at most one player is left.
#[must_use]
pub fn first_to_act(players: &[Player]) -> Option<usize> {
    if num_active(players) <= 1 {
        return None;
    }
    players.iter().position(Player::is_active)
}

/// Next player after `current_idx`, wrapping around the table, that has
/// not folded and has not acted in this round.
#[must_use]
pub fn next_to_act(players: &[Player], current_idx: usize) -> Option<usize> {
    if num_active(players) <= 1 {
        return None;
    }
    let num_players = players.len();
    (1..=num_players)
        .map(|offset| (current_idx + offset) % num_players)
        .find(|&idx| players[idx].status == BettingStatus::NotYetActed)
}
