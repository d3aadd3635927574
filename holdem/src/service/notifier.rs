//! Best-effort delivery of game events to subscribers.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

use crate::game::{GameEvent, GameId, PlayerId, Stage};

/// Receives every event after the state change it describes was saved.
///
/// Implementations must return promptly and never block the caller.
pub trait GameNotifier: Send + Sync {
    fn notify(&self, event: &GameEvent);
}

impl<F> GameNotifier for F
where
    F: Fn(&GameEvent) + Send + Sync,
{
    fn notify(&self, event: &GameEvent) {
        self(event);
    }
}

/// Bounded channel per subscriber, grouped by game.
///
/// A subscriber whose channel is full misses the event but stays
/// subscribed. A subscriber whose receiver was dropped is removed. All
/// channels of a game are closed after its game-over event.
pub struct NotificationHub {
    capacity: usize,
    subscribers: Mutex<HashMap<GameId, HashMap<PlayerId, mpsc::Sender<GameEvent>>>>,
}

impl NotificationHub {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Register `player_id` for events of `game_id`, replacing any previous
    /// subscription of the same player.
    pub fn subscribe(&self, game_id: GameId, player_id: PlayerId) -> mpsc::Receiver<GameEvent> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(game_id)
            .or_default()
            .insert(player_id, tx);
        log::debug!("Player {player_id} subscribed to game {game_id}");
        rx
    }

    /// Returns whether a subscription existed.
    pub fn unsubscribe(&self, game_id: GameId, player_id: PlayerId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(game) = subscribers.get_mut(&game_id) else {
            return false;
        };
        let removed = game.remove(&player_id).is_some();
        if game.is_empty() {
            subscribers.remove(&game_id);
        }
        if removed {
            log::debug!("Player {player_id} unsubscribed from game {game_id}");
        }
        removed
    }

    #[must_use]
    pub fn subscriber_count(&self, game_id: GameId) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&game_id)
            .map_or(0, HashMap::len)
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(crate::config::EngineConfig::default().notification_capacity)
    }
}

impl GameNotifier for NotificationHub {
    fn notify(&self, event: &GameEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(game) = subscribers.get_mut(&event.game_id) else {
            return;
        };

        game.retain(|player_id, sender| match sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!(
                    "Subscriber {} of game {} is full, dropping {:?} event",
                    player_id,
                    event.game_id,
                    event.kind
                );
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("Subscriber {player_id} disconnected, removing");
                false
            }
        });

        if event.stage == Stage::GameOver || game.is_empty() {
            subscribers.remove(&event.game_id);
        }
    }
}
