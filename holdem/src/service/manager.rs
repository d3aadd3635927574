//! Request handling on top of the game engine.
//!
//! Every mutation follows the same cycle under the game's exclusive lock:
//! load the latest copy, apply the engine operation, save with an optimistic
//! version check, then publish the queued events. A version conflict means
//! another process wrote the game in between; the operation is replayed on a
//! fresh copy a bounded number of times.

use tokio::sync::mpsc;

use super::errors::{ServiceError, ServiceResult};
use super::locks::GameLocks;
use super::messages::{GameResponse, GameStatus};
use super::notifier::{GameNotifier, NotificationHub};
use crate::config::EngineConfig;
use crate::db::{GameRepository, RepositoryError};
use crate::game::{
    ActionType, Game, GameError, GameEvent, GameId, GameResult, MIN_PLAYERS, PlayerId, Stage,
};

/// Serves many concurrent games from one repository.
pub struct GameService<R, N = NotificationHub> {
    repository: R,
    notifier: N,
    locks: GameLocks,
    config: EngineConfig,
}

impl<R: GameRepository> GameService<R, NotificationHub> {
    /// Service publishing events through a [`NotificationHub`] sized from `config`
    pub fn with_hub(repository: R, config: EngineConfig) -> Self {
        let hub = NotificationHub::new(config.notification_capacity);
        Self::new(repository, hub, config)
    }

    /// Receive the events of `game_id`.
    ///
    /// # Errors
    ///
    /// Fails for unknown games and for users who are not seated in the game.
    /// A finished game yields a receiver that is already closed.
    pub async fn subscribe(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> ServiceResult<mpsc::Receiver<GameEvent>> {
        // Held so a game-over event cannot slip in between the check and the registration.
        let guard = self
            .locks
            .acquire(game_id, self.config.lock_timeout())
            .await?;
        let game = match self.repository.load(game_id).await {
            Ok(game) => game,
            Err(e) => {
                drop(guard);
                if matches!(e, RepositoryError::GameNotFound(_)) {
                    self.locks.release(game_id);
                }
                return Err(e.into());
            }
        };

        let finished = game.stage() == Stage::GameOver;
        if finished {
            drop(guard);
            self.locks.release(game_id);
        }

        if !game.contains_player(&player_id) {
            log::debug!("Rejected subscription of {player_id} to game {game_id}: not seated");
            return Err(GameError::UnknownPlayer(player_id).into());
        }
        if finished {
            // No event will follow, so hand back a receiver that is already closed.
            let (_, rx) = mpsc::channel(1);
            return Ok(rx);
        }
        Ok(self.notifier.subscribe(game_id, player_id))
    }

    pub fn unsubscribe(&self, game_id: GameId, player_id: PlayerId) -> bool {
        self.notifier.unsubscribe(game_id, player_id)
    }
}

impl<R, N> GameService<R, N>
where
    R: GameRepository,
    N: GameNotifier,
{
    pub fn new(repository: R, notifier: N, config: EngineConfig) -> Self {
        Self {
            repository,
            notifier,
            locks: GameLocks::new(),
            config,
        }
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create and store an empty game for `total_num_of_players` players.
    ///
    /// # Errors
    ///
    /// Rejects sizes outside `MIN_PLAYERS..=config.max_players`.
    pub async fn create_game(&self, total_num_of_players: usize) -> ServiceResult<GameId> {
        if total_num_of_players > self.config.max_players {
            return Err(GameError::InvalidPlayerCount {
                requested: total_num_of_players,
                min: MIN_PLAYERS,
                max: self.config.max_players,
            }
            .into());
        }

        let game = Game::new(total_num_of_players)?;
        self.repository.insert(&game).await?;
        log::info!(
            "Created game {} for {} players",
            game.guid(),
            total_num_of_players
        );
        Ok(game.guid())
    }

    /// Seat `player_id` in a game that has not been dealt yet.
    ///
    /// # Errors
    ///
    /// Fails when the game is missing, full, already dealt, or the player is
    /// already seated.
    pub async fn join_game(&self, game_id: GameId, player_id: PlayerId) -> ServiceResult<GameStatus> {
        let (game, ()) = self
            .mutate(game_id, |game| game.seat_player(player_id))
            .await?;
        Ok(GameStatus::from_game(&game, Some(player_id)))
    }

    /// Current state of a game as seen by `viewer`.
    ///
    /// A game that is ready for its next stage is advanced first, so polling
    /// players drive the game forward.
    ///
    /// # Errors
    ///
    /// Fails when the game is missing or advancing it fails.
    pub async fn query_status(
        &self,
        game_id: GameId,
        viewer: Option<PlayerId>,
    ) -> ServiceResult<GameStatus> {
        let mut game = self.repository.load(game_id).await?;
        if game.is_ready_to_advance() {
            (game, _) = self.mutate(game_id, Game::advance_if_ready).await?;
        }
        Ok(GameStatus::from_game(&game, viewer))
    }

    /// Record an action for `player_id`.
    ///
    /// Rejections are reported in the response, never as an error.
    pub async fn submit_action(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        action: ActionType,
    ) -> GameResponse {
        match self
            .mutate(game_id, |game| game.record_action(player_id, action))
            .await
        {
            Ok(_) => GameResponse::Success,
            Err(e) => {
                if e.is_retryable() || matches!(e, ServiceError::Game(ref g) if g.is_user_error()) {
                    log::debug!("Game {game_id}: rejected {action} from {player_id}: {e}");
                } else {
                    log::error!("Game {game_id}: {action} from {player_id} failed: {e}");
                }
                e.into()
            }
        }
    }

    /// [`GameService::submit_action`] with the action given by name
    /// (`"check"`, `"call"`, `"bet"`, `"fold"`, `"re-raise"`).
    pub async fn submit_action_str(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        action: &str,
    ) -> GameResponse {
        match action.parse::<ActionType>() {
            Ok(action) => self.submit_action(game_id, player_id, action).await,
            Err(e) => ServiceError::from(e).into(),
        }
    }

    /// Advance a game by one stage if it is ready.
    ///
    /// # Errors
    ///
    /// Fails when the game is missing or dealing fails.
    pub async fn advance_if_ready(&self, game_id: GameId) -> ServiceResult<bool> {
        let (_, advanced) = self.mutate(game_id, Game::advance_if_ready).await?;
        Ok(advanced)
    }

    /// Run `op` on the latest copy of a game and persist the result.
    ///
    /// Nothing is saved or published when `op` fails or queues no events.
    /// The game's lock entry is dropped once the game is over or missing,
    /// whether or not `op` succeeded.
    async fn mutate<T, F>(&self, game_id: GameId, mut op: F) -> ServiceResult<(Game, T)>
    where
        F: FnMut(&mut Game) -> GameResult<T> + Send,
        T: Send,
    {
        let guard = self
            .locks
            .acquire(game_id, self.config.lock_timeout())
            .await?;

        let mut retired = false;
        let result = self.apply_locked(game_id, &mut op, &mut retired).await;
        drop(guard);

        if retired {
            self.locks.release(game_id);
        }
        result
    }

    /// Load, apply and save loop of [`GameService::mutate`]. Must only run
    /// while the game's lock is held.
    ///
    /// `retired` is set when no further mutation of the game can succeed.
    async fn apply_locked<T, F>(
        &self,
        game_id: GameId,
        op: &mut F,
        retired: &mut bool,
    ) -> ServiceResult<(Game, T)>
    where
        F: FnMut(&mut Game) -> GameResult<T> + Send,
        T: Send,
    {
        let mut conflicts = 0;
        loop {
            let mut game = match self.repository.load(game_id).await {
                Ok(game) => game,
                Err(e) => {
                    *retired = matches!(e, RepositoryError::GameNotFound(_));
                    return Err(e.into());
                }
            };
            let was_over = game.stage() == Stage::GameOver;
            *retired = was_over;

            let output = op(&mut game)?;
            let events = game.drain_events();
            if events.is_empty() {
                return Ok((game, output));
            }

            match self.repository.save(&game).await {
                Ok(version) => {
                    game.set_version(version);
                    for event in &events {
                        self.notifier.notify(event);
                    }
                    if !was_over && game.stage() == Stage::GameOver {
                        log::info!("Game {game_id} is over");
                        *retired = true;
                    }
                    return Ok((game, output));
                }
                Err(RepositoryError::VersionConflict { expected, .. })
                    if conflicts < self.config.max_save_retries =>
                {
                    conflicts += 1;
                    log::warn!(
                        "Game {game_id}: version {expected} is stale, retrying ({conflicts}/{})",
                        self.config.max_save_retries
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
