//! Per-game exclusive locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::errors::{ServiceError, ServiceResult};
use crate::game::GameId;

/// Held for the whole load-mutate-save cycle of one game
pub type GameGuard = OwnedMutexGuard<()>;

/// One async mutex per game id, created on first use.
#[derive(Default)]
pub struct GameLocks {
    locks: Mutex<HashMap<GameId, Arc<AsyncMutex<()>>>>,
}

impl GameLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait up to `timeout` for exclusive access to `game_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::LockContention`] when the wait times out.
    pub async fn acquire(&self, game_id: GameId, timeout: Duration) -> ServiceResult<GameGuard> {
        let lock = self.lock_for(game_id);
        match tokio::time::timeout(timeout, lock.lock_owned()).await {
            Ok(guard) => {
                log::debug!("Acquired lock for game {game_id}");
                Ok(guard)
            }
            Err(_) => {
                log::warn!("Lock contention on game {game_id} after {timeout:?}");
                Err(ServiceError::LockContention { game_id })
            }
        }
    }

    fn lock_for(&self, game_id: GameId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(game_id).or_default())
    }

    /// Forget the lock of a finished game unless someone is still using it.
    ///
    /// Returns whether the entry was removed.
    pub fn release(&self, game_id: GameId) -> bool {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        match locks.get(&game_id) {
            Some(lock) if Arc::strong_count(lock) == 1 => locks.remove(&game_id).is_some(),
            _ => false,
        }
    }

    /// Number of games with a live lock entry
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
