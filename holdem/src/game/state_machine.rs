//! The game aggregate and its stage transition engine.
//!
//! A [`Game`] only changes through [`Game::seat_player`],
//! [`Game::record_action`] and [`Game::advance_if_ready`]. Each successful
//! mutation queues a [`GameEvent`] that the owner drains with
//! [`Game::drain_events`] once the new state has been persisted.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use super::cards::{Card, Deck};
use super::entities::{
    ActionType, BetRecord, BettingStatus, GameId, MAX_PLAYERS, MIN_PLAYERS, Player, PlayerId,
    PocketCards, Stage,
};
use super::errors::{GameError, GameResult};
use super::ledger::CardLedger;
use super::rules;

/// What kind of mutation produced a [`GameEvent`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEventKind {
    PlayerSeated,
    ActionRecorded,
    StageAdvanced,
}

/// Public notification emitted after every state change.
///
/// Carries only table-wide information; pocket cards never leave the game
/// through an event.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameEvent {
    pub game_id: GameId,
    pub kind: GameEventKind,
    pub stage: Stage,
    pub community_cards: Vec<Card>,
    pub player_to_action: Option<PlayerId>,
}

/// Raw fields of a game, used by storage backends to rebuild one.
#[derive(Clone, Debug)]
pub struct GameParts {
    pub guid: GameId,
    pub version: i64,
    pub total_num_of_players: usize,
    pub stage: Stage,
    pub players: Vec<Player>,
    pub community_cards: Vec<Card>,
    pub player_to_action: Option<PlayerId>,
    pub bets: Vec<BetRecord>,
}

/// One hand of Texas Hold'em.
#[derive(Clone, Debug)]
pub struct Game {
    guid: GameId,
    /// Revision of the stored copy this game was loaded from.
    version: i64,
    total_num_of_players: usize,
    stage: Stage,
    /// Seated players in table order.
    players: Vec<Player>,
    community_cards: Vec<Card>,
    player_to_action: Option<PlayerId>,
    bets: Vec<BetRecord>,
    events: VecDeque<GameEvent>,
}

impl Game {
    /// Create an empty game waiting for `total_num_of_players` players.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayerCount`] unless the count is between
    /// [`MIN_PLAYERS`] and [`MAX_PLAYERS`].
    pub fn new(total_num_of_players: usize) -> GameResult<Self> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&total_num_of_players) {
            return Err(GameError::InvalidPlayerCount {
                requested: total_num_of_players,
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }

        Ok(Self {
            guid: Uuid::new_v4(),
            version: 0,
            total_num_of_players,
            stage: Stage::Initial,
            players: Vec::with_capacity(total_num_of_players),
            community_cards: Vec::with_capacity(5),
            player_to_action: None,
            bets: Vec::new(),
            events: VecDeque::new(),
        })
    }

    /// Create a game with every seat already filled, in the given order.
    ///
    /// # Errors
    ///
    /// Same as [`Game::new`] and [`Game::seat_player`].
    pub fn with_players<I>(players: I) -> GameResult<Self>
    where
        I: IntoIterator<Item = PlayerId>,
    {
        let players: Vec<PlayerId> = players.into_iter().collect();
        let mut game = Self::new(players.len())?;
        for player in players {
            game.seat_player(player)?;
        }
        game.events.clear();
        Ok(game)
    }

    /// Rebuild a game from stored fields.
    ///
    /// # Errors
    ///
    /// Fails with the first broken invariant if the fields do not describe a
    /// consistent game.
    pub fn from_parts(parts: GameParts) -> GameResult<Self> {
        let game = Self {
            guid: parts.guid,
            version: parts.version,
            total_num_of_players: parts.total_num_of_players,
            stage: parts.stage,
            players: parts.players,
            community_cards: parts.community_cards,
            player_to_action: parts.player_to_action,
            bets: parts.bets,
            events: VecDeque::new(),
        };
        game.check_invariants()?;
        Ok(game)
    }

    #[must_use]
    pub fn guid(&self) -> GameId {
        self.guid
    }

    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Record the revision assigned by the store after a successful save.
    pub fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    #[must_use]
    pub fn total_num_of_players(&self) -> usize {
        self.total_num_of_players
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|player| player.id).collect()
    }

    #[must_use]
    pub fn contains_player(&self, player_id: &PlayerId) -> bool {
        self.seat_of(player_id).is_some()
    }

    #[must_use]
    pub fn community_cards(&self) -> &[Card] {
        &self.community_cards
    }

    #[must_use]
    pub fn player_to_action(&self) -> Option<PlayerId> {
        self.player_to_action
    }

    /// Current-round status of every player, in table order.
    #[must_use]
    pub fn betting_status(&self) -> Vec<(PlayerId, BettingStatus)> {
        self.players
            .iter()
            .map(|player| (player.id, player.status))
            .collect()
    }

    #[must_use]
    pub fn bets(&self) -> &[BetRecord] {
        &self.bets
    }

    /// Take the events queued by mutations since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    fn seat_of(&self, player_id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|player| &player.id == player_id)
    }

    /// Pocket cards of `player_id` and nobody else.
    #[must_use]
    pub fn pocket_cards(&self, player_id: &PlayerId) -> PocketCards {
        match self.seat_of(player_id) {
            None => PocketCards::UnknownPlayer,
            Some(idx) => match self.players[idx].pocket {
                Some(cards) if self.stage != Stage::Initial => PocketCards::Dealt(cards),
                _ => PocketCards::NotYetDealt,
            },
        }
    }

    /// Take a seat while the game is still in [`Stage::Initial`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::SeatingClosed`] once cards have been dealt,
    /// [`GameError::PlayerAlreadySeated`] for a repeat, and
    /// [`GameError::TableFull`] when every seat is taken.
    pub fn seat_player(&mut self, player_id: PlayerId) -> GameResult<()> {
        if self.stage != Stage::Initial {
            return Err(GameError::SeatingClosed);
        }
        if self.contains_player(&player_id) {
            return Err(GameError::PlayerAlreadySeated(player_id));
        }
        if self.players.len() >= self.total_num_of_players {
            return Err(GameError::TableFull(self.total_num_of_players));
        }

        self.players.push(Player::new(player_id));
        log::debug!(
            "Game {}: player {} seated ({}/{})",
            self.guid,
            player_id,
            self.players.len(),
            self.total_num_of_players
        );
        self.push_event(GameEventKind::PlayerSeated);
        Ok(())
    }

    /// Whether [`Game::advance_if_ready`] would move to the next stage.
    ///
    /// Leaving [`Stage::Initial`] needs every seat filled. Any other stage
    /// needs its betting round complete. Nothing follows [`Stage::GameOver`].
    #[must_use]
    pub fn is_ready_to_advance(&self) -> bool {
        match self.stage {
            Stage::GameOver => false,
            Stage::Initial => self.players.len() == self.total_num_of_players,
            _ => rules::is_betting_round_complete(self.players.iter().map(|player| player.status)),
        }
    }

    /// Record `action` for `player_id`, who must be the player to act.
    ///
    /// A re-raise sends every other player that has not folded back to
    /// waiting. The turn then passes to the next waiting player in table
    /// order, or to nobody when the round is complete.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] for a player not in the game and
    /// [`GameError::NotPlayersTurn`] for anyone else out of turn.
    pub fn record_action(&mut self, player_id: PlayerId, action: ActionType) -> GameResult<()> {
        let idx = self
            .seat_of(&player_id)
            .ok_or(GameError::UnknownPlayer(player_id))?;
        if self.player_to_action != Some(player_id) {
            return Err(GameError::NotPlayersTurn);
        }

        self.players[idx].status = action.status();
        if action == ActionType::ReRaise {
            rules::reopen_round(&mut self.players, idx);
        }
        self.player_to_action =
            rules::next_to_act(&self.players, idx).map(|next| self.players[next].id);
        self.bets.push(BetRecord::new(player_id, action, self.stage));

        log::debug!(
            "Game {}: player {} {} during {}",
            self.guid,
            player_id,
            action,
            self.stage
        );
        self.push_event(GameEventKind::ActionRecorded);
        Ok(())
    }

    /// Move to the next stage if the current one is finished, dealing the
    /// cards the next stage needs.
    ///
    /// Returns `Ok(false)` and leaves the game untouched when it is not ready
    /// or already over.
    ///
    /// # Errors
    ///
    /// Any error means the game is corrupt or the deck could not satisfy the
    /// draw. The game is left exactly as it was.
    pub fn advance_if_ready(&mut self) -> GameResult<bool> {
        self.advance_if_ready_with(&mut rand::rng())
    }

    /// [`Game::advance_if_ready`] with an explicit random source.
    ///
    /// # Errors
    ///
    /// See [`Game::advance_if_ready`].
    pub fn advance_if_ready_with<R>(&mut self, rng: &mut R) -> GameResult<bool>
    where
        R: Rng + ?Sized,
    {
        let Some(target) = self.stage.next() else {
            return Ok(false);
        };
        if !self.is_ready_to_advance() {
            return Ok(false);
        }

        // Work on a copy so a failure never leaves a half-dealt game behind.
        let mut next = self.clone();
        next.deal_and_transition(target, rng)?;
        *self = next;

        log::info!(
            "Game {} advanced to {} (board: {})",
            self.guid,
            self.stage,
            self.board_repr()
        );
        Ok(true)
    }

    fn deal_and_transition<R>(&mut self, target: Stage, rng: &mut R) -> GameResult<()>
    where
        R: Rng + ?Sized,
    {
        let needed = rules::cards_needed_for_next_stage(self.stage, self.total_num_of_players);
        let ledger = CardLedger::build(&self.community_cards, &self.players)?;
        let drawn = Deck::draw(needed, ledger.cards(), rng).inspect_err(|e| {
            log::error!("Game {}: cannot deal for {}: {}", self.guid, target, e);
        })?;
        ledger.ensure_disjoint(&drawn)?;

        if self.stage == Stage::Initial {
            self.deal_pockets(&drawn)?;
        } else {
            self.community_cards.extend_from_slice(&drawn);
        }

        self.transition_to(target)?;
        rules::reset_round(&mut self.players);
        self.player_to_action = if self.stage.is_betting() {
            rules::first_to_act(&self.players).map(|idx| self.players[idx].id)
        } else {
            None
        };

        self.check_invariants()?;
        self.push_event(GameEventKind::StageAdvanced);
        Ok(())
    }

    /// Hand out two cards per player in table order. Folded or not, every
    /// player is dealt in.
    fn deal_pockets(&mut self, drawn: &[Card]) -> GameResult<()> {
        if drawn.len() != self.players.len() * 2 {
            return Err(GameError::InternalStateError(format!(
                "drew {} cards for {} players",
                drawn.len(),
                self.players.len()
            )));
        }

        for (player, cards) in self.players.iter_mut().zip(drawn.chunks_exact(2)) {
            if player.pocket.is_some() {
                return Err(GameError::PocketCardMismatch(player.id, self.stage));
            }
            player.pocket = Some([cards[0], cards[1]]);
        }
        Ok(())
    }

    fn transition_to(&mut self, target: Stage) -> GameResult<()> {
        if self.stage.next() != Some(target) {
            log::error!(
                "Game {}: rejected transition from {} to {}",
                self.guid,
                self.stage,
                target
            );
            return Err(GameError::InvalidStageTransition {
                from: self.stage,
                to: target,
            });
        }
        self.stage = target;
        Ok(())
    }

    /// Verify every structural invariant of the game.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn check_invariants(&self) -> GameResult<()> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.total_num_of_players) {
            return Err(GameError::InternalStateError(format!(
                "table of {} seats outside {}..={}",
                self.total_num_of_players, MIN_PLAYERS, MAX_PLAYERS
            )));
        }

        CardLedger::build(&self.community_cards, &self.players)?;

        let expected = self.stage.community_len();
        if self.community_cards.len() != expected {
            return Err(GameError::CommunityCardMismatch {
                stage: self.stage,
                expected,
                actual: self.community_cards.len(),
            });
        }

        if self.players.len() > self.total_num_of_players
            || (self.stage != Stage::Initial && self.players.len() != self.total_num_of_players)
        {
            return Err(GameError::InternalStateError(format!(
                "{} players seated for {} seats during {}",
                self.players.len(),
                self.total_num_of_players,
                self.stage
            )));
        }

        for player in &self.players {
            let dealt = player.pocket.is_some();
            if dealt == (self.stage == Stage::Initial) {
                return Err(GameError::PocketCardMismatch(player.id, self.stage));
            }
        }

        if let Some(player_id) = self.player_to_action {
            let acting = self
                .seat_of(&player_id)
                .map(|idx| &self.players[idx])
                .ok_or(GameError::UnknownPlayer(player_id))?;
            if !self.stage.is_betting() || !acting.is_active() {
                return Err(GameError::InternalStateError(format!(
                    "player {} cannot act during {}",
                    player_id, self.stage
                )));
            }
        }

        Ok(())
    }

    fn push_event(&mut self, kind: GameEventKind) {
        self.events.push_back(GameEvent {
            game_id: self.guid,
            kind,
            stage: self.stage,
            community_cards: self.community_cards.clone(),
            player_to_action: self.player_to_action,
        });
    }

    fn board_repr(&self) -> String {
        self.community_cards
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
