//! Game persistence behind a repository trait.
//!
//! Games are stored as a [`GameRecord`]: the structured game flattened into
//! the compact string fields of [`crate::game::codec`], plus a version column
//! used for optimistic concurrency control.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use super::errors::{RepositoryError, RepositoryResult};
use super::timeouts::{DEFAULT_QUERY_TIMEOUT, with_timeout};
use crate::game::{
    BetRecord, Game, GameError, GameId, GameParts, PlayerId, Stage,
    codec::{
        decode_community_cards, decode_players, encode_betting_status, encode_community_cards,
        encode_player_ids, encode_pocket_cards,
    },
};

/// Storage for games keyed by guid
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Store a new game at its current version
    async fn insert(&self, game: &Game) -> RepositoryResult<()>;

    /// Load the latest stored copy of a game
    async fn load(&self, game_id: GameId) -> RepositoryResult<Game>;

    /// Overwrite the stored game if its version still matches `game.version()`
    ///
    /// Returns the new version on success. A stale game fails with
    /// [`RepositoryError::VersionConflict`] and leaves the store untouched.
    async fn save(&self, game: &Game) -> RepositoryResult<i64>;

    /// Remove a game
    async fn delete(&self, game_id: GameId) -> RepositoryResult<()>;
}

/// One stored game row
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameRecord {
    pub guid: GameId,
    pub version: i64,
    pub total_num_of_players: i32,
    pub stage: String,
    pub player_ids: String,
    pub pocket_cards: String,
    pub community_cards: String,
    pub betting_status: String,
    pub player_to_action: Option<PlayerId>,
    pub bets: String,
}

impl GameRecord {
    /// Flatten a game for storage
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Serialization`] if the bet history cannot be
    /// encoded and [`RepositoryError::CorruptGame`] if the player count does not
    /// fit the column
    pub fn from_game(game: &Game) -> RepositoryResult<Self> {
        let total_num_of_players = i32::try_from(game.total_num_of_players()).map_err(|_| {
            GameError::InternalStateError(format!(
                "player count {} out of range",
                game.total_num_of_players()
            ))
        })?;

        Ok(Self {
            guid: game.guid(),
            version: game.version(),
            total_num_of_players,
            stage: game.stage().as_str().to_string(),
            player_ids: encode_player_ids(game.players()),
            pocket_cards: encode_pocket_cards(game.players()),
            community_cards: encode_community_cards(game.community_cards()),
            betting_status: encode_betting_status(game.players()),
            player_to_action: game.player_to_action(),
            bets: serde_json::to_string(game.bets())?,
        })
    }

    /// Rebuild the game, checking every field and every game invariant
    ///
    /// # Errors
    ///
    /// Returns a codec, serialization, or game error describing the corruption
    pub fn into_game(self) -> RepositoryResult<Game> {
        let total_num_of_players = usize::try_from(self.total_num_of_players).map_err(|_| {
            GameError::InternalStateError(format!(
                "negative player count {}",
                self.total_num_of_players
            ))
        })?;
        let stage: Stage = self.stage.parse()?;
        let players = decode_players(&self.player_ids, &self.pocket_cards, &self.betting_status)?;
        let community_cards = decode_community_cards(&self.community_cards)?;
        let bets: Vec<BetRecord> = serde_json::from_str(&self.bets)?;

        let game = Game::from_parts(GameParts {
            guid: self.guid,
            version: self.version,
            total_num_of_players,
            stage,
            players,
            community_cards,
            player_to_action: self.player_to_action,
            bets,
        })
        .inspect_err(|e| log::error!("Stored game {} is inconsistent: {}", self.guid, e))?;
        Ok(game)
    }

    fn from_row(row: &PgRow) -> Self {
        Self {
            guid: row.get("guid"),
            version: row.get("version"),
            total_num_of_players: row.get("total_num_of_players"),
            stage: row.get("stage"),
            player_ids: row.get("player_ids"),
            pocket_cards: row.get("pocket_cards"),
            community_cards: row.get("community_cards"),
            betting_status: row.get("betting_status"),
            player_to_action: row.get("player_to_action"),
            bets: row.get("bets"),
        }
    }
}

/// In-process implementation storing encoded records in a map
///
/// Goes through the same [`GameRecord`] encoding as the PostgreSQL backend so
/// both reject the same corrupt states.
#[derive(Default)]
pub struct InMemoryGameRepository {
    games: RwLock<HashMap<GameId, GameRecord>>,
}

impl InMemoryGameRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored games
    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.games.read().await.is_empty()
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn insert(&self, game: &Game) -> RepositoryResult<()> {
        let record = GameRecord::from_game(game)?;
        let mut games = self.games.write().await;
        if games.contains_key(&record.guid) {
            return Err(RepositoryError::DuplicateGame(record.guid));
        }
        games.insert(record.guid, record);
        Ok(())
    }

    async fn load(&self, game_id: GameId) -> RepositoryResult<Game> {
        let record = self
            .games
            .read()
            .await
            .get(&game_id)
            .cloned()
            .ok_or(RepositoryError::GameNotFound(game_id))?;
        record.into_game()
    }

    async fn save(&self, game: &Game) -> RepositoryResult<i64> {
        let mut record = GameRecord::from_game(game)?;
        let mut games = self.games.write().await;
        let stored = games
            .get_mut(&record.guid)
            .ok_or(RepositoryError::GameNotFound(record.guid))?;
        if stored.version != record.version {
            return Err(RepositoryError::VersionConflict {
                game_id: record.guid,
                expected: record.version,
            });
        }

        record.version += 1;
        let version = record.version;
        *stored = record;
        Ok(version)
    }

    async fn delete(&self, game_id: GameId) -> RepositoryResult<()> {
        self.games
            .write()
            .await
            .remove(&game_id)
            .map(|_| ())
            .ok_or(RepositoryError::GameNotFound(game_id))
    }
}

/// PostgreSQL implementation of [`GameRepository`]
pub struct PgGameRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    async fn exists(&self, game_id: GameId) -> RepositoryResult<bool> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT 1 FROM poker_games WHERE guid = $1")
                .bind(game_id)
                .fetch_optional(&self.pool),
        )
        .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl GameRepository for PgGameRepository {
    async fn insert(&self, game: &Game) -> RepositoryResult<()> {
        let record = GameRecord::from_game(game)?;
        let result = with_timeout(
            self.query_timeout,
            sqlx::query(
                "INSERT INTO poker_games (guid, version, total_num_of_players, stage, player_ids,
                                          pocket_cards, community_cards, betting_status,
                                          player_to_action, bets)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                 ON CONFLICT (guid) DO NOTHING",
            )
            .bind(record.guid)
            .bind(record.version)
            .bind(record.total_num_of_players)
            .bind(&record.stage)
            .bind(&record.player_ids)
            .bind(&record.pocket_cards)
            .bind(&record.community_cards)
            .bind(&record.betting_status)
            .bind(record.player_to_action)
            .bind(&record.bets)
            .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::DuplicateGame(record.guid));
        }
        Ok(())
    }

    async fn load(&self, game_id: GameId) -> RepositoryResult<Game> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                "SELECT guid, version, total_num_of_players, stage, player_ids, pocket_cards,
                        community_cards, betting_status, player_to_action, bets
                 FROM poker_games WHERE guid = $1",
            )
            .bind(game_id)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(RepositoryError::GameNotFound(game_id))?;

        GameRecord::from_row(&row).into_game()
    }

    async fn save(&self, game: &Game) -> RepositoryResult<i64> {
        let record = GameRecord::from_game(game)?;
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                "UPDATE poker_games
                 SET version = version + 1, stage = $3, player_ids = $4, pocket_cards = $5,
                     community_cards = $6, betting_status = $7, player_to_action = $8,
                     bets = $9, updated_at = NOW()
                 WHERE guid = $1 AND version = $2
                 RETURNING version",
            )
            .bind(record.guid)
            .bind(record.version)
            .bind(&record.stage)
            .bind(&record.player_ids)
            .bind(&record.pocket_cards)
            .bind(&record.community_cards)
            .bind(&record.betting_status)
            .bind(record.player_to_action)
            .bind(&record.bets)
            .fetch_optional(&self.pool),
        )
        .await?;

        match row {
            Some(row) => Ok(row.get("version")),
            None if self.exists(record.guid).await? => Err(RepositoryError::VersionConflict {
                game_id: record.guid,
                expected: record.version,
            }),
            None => Err(RepositoryError::GameNotFound(record.guid)),
        }
    }

    async fn delete(&self, game_id: GameId) -> RepositoryResult<()> {
        let result = with_timeout(
            self.query_timeout,
            sqlx::query("DELETE FROM poker_games WHERE guid = $1")
                .bind(game_id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::GameNotFound(game_id));
        }
        Ok(())
    }
}
