//! Game service: request handling, per-game locking and event delivery.

pub mod errors;
pub mod locks;
pub mod manager;
pub mod messages;
pub mod notifier;

pub use errors::{ServiceError, ServiceResult};
pub use locks::GameLocks;
pub use manager::GameService;
pub use messages::{GameResponse, GameStatus};
pub use notifier::{GameNotifier, NotificationHub};
