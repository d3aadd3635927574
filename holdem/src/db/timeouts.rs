//! Database query timeout helpers
//!
//! Every repository query goes through [`with_timeout`] so a stuck connection
//! surfaces as [`RepositoryError::Timeout`] instead of holding a game lock forever.

use std::time::Duration;
use tokio::time::timeout;

use super::errors::{RepositoryError, RepositoryResult};

/// Default timeout for database queries (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Execute a query with timeout
///
/// # Example
///
/// ```no_run
/// use holdem::db::timeouts::{with_timeout, DEFAULT_QUERY_TIMEOUT};
/// # use sqlx::PgPool;
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
///
/// let result = with_timeout(
///     DEFAULT_QUERY_TIMEOUT,
///     sqlx::query("SELECT version FROM poker_games WHERE guid = $1")
///         .bind(uuid::Uuid::new_v4())
///         .fetch_optional(pool)
/// ).await?;
///
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> RepositoryResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(duration, future).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(RepositoryError::Database(e)),
        Err(_) => {
            log::warn!("Database operation timed out after {duration:?}");
            Err(RepositoryError::Timeout(duration))
        }
    }
}
