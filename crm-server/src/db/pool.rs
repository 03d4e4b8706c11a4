//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits. Startup connects with
//! linear backoff; the health probe and the startup ping are bounded by
//! [`PING_TIMEOUT`].

use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, PgConnection, PgPool};

use super::repos::DbError;

/// Maximum open connections.
pub const MAX_CONNECTIONS: u32 = 25;

/// Idle connections beyond this age are closed.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Connections are recycled after this lifetime.
pub const MAX_LIFETIME: Duration = Duration::from_secs(5 * 60);

/// Upper bound for ping and health probes.
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Startup connection error
#[derive(Debug, thiserror::Error)]
#[error("failed to connect to database after {attempts} attempts: {source}")]
pub struct ConnectError {
    pub attempts: u32,
    #[source]
    pub source: DbError,
}

/// Linear backoff: attempt `n` waits `n * step` before attempt `n + 1`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub step: Duration,
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.step * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            step: Duration::from_secs(1),
        }
    }
}

/// Pool size and idle counts at probe time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: usize,
}

/// Pool options shared by the server and the CLI.
pub fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(0)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
}

/// Connect with the default retry policy (10 attempts, 1s linear step).
pub async fn connect(options: &PgConnectOptions) -> Result<PgPool, ConnectError> {
    connect_with_retry(options, RetryPolicy::default()).await
}

/// Connect, pinging each fresh pool and discarding it on failure.
pub async fn connect_with_retry(
    options: &PgConnectOptions,
    policy: RetryPolicy,
) -> Result<PgPool, ConnectError> {
    let mut attempt = 1;
    loop {
        tracing::info!(attempt, max = policy.max_attempts, "connecting to database");

        let result = match pool_options().connect_with(options.clone()).await {
            Ok(pool) => match ping(&pool).await {
                Ok(()) => Ok(pool),
                Err(e) => {
                    pool.close().await;
                    Err(e)
                }
            },
            Err(e) => Err(DbError::from(e)),
        };

        match result {
            Ok(pool) => {
                tracing::info!(attempt, "connected to database");
                return Ok(pool);
            }
            Err(source) if attempt >= policy.max_attempts => {
                tracing::error!(attempt, error = %source, "giving up on database connection");
                return Err(ConnectError {
                    attempts: attempt,
                    source,
                });
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(attempt, error = %e, ?delay, "database connection failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// `SELECT 1` bounded by [`PING_TIMEOUT`].
async fn ping(pool: &PgPool) -> Result<(), DbError> {
    let query = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool);
    match tokio::time::timeout(PING_TIMEOUT, query).await {
        Ok(result) => result.map(|_| ()).map_err(DbError::from),
        Err(_) => Err(DbError::Timeout {
            seconds: PING_TIMEOUT.as_secs(),
        }),
    }
}

/// Ping a pooled connection and run a trivial query.
pub async fn health_check(pool: &PgPool) -> Result<PoolStatus, DbError> {
    let probe = async {
        let mut conn = pool.acquire().await?;
        conn.ping().await?;
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&mut *conn).await?;
        Ok::<_, DbError>(one)
    };

    match tokio::time::timeout(PING_TIMEOUT, probe).await {
        Ok(Ok(_)) => {
            let status = PoolStatus {
                size: pool.size(),
                idle: pool.num_idle(),
            };
            tracing::debug!(size = status.size, idle = status.idle, "database health check passed");
            Ok(status)
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "database health check failed");
            Err(e)
        }
        Err(_) => {
            tracing::error!("database health check timed out");
            Err(DbError::Timeout {
                seconds: PING_TIMEOUT.as_secs(),
            })
        }
    }
}

/// Run `f` inside a transaction.
///
/// Commits when `f` returns `Ok`; rolls back and returns the error otherwise.
pub async fn with_transaction<T, F>(pool: &PgPool, f: F) -> Result<T, DbError>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, DbError>> + Send,
{
    let mut tx = pool.begin().await?;

    match f(&mut *tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, "transaction rollback failed");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(4), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        // Nothing listens on port 1
        let options = PgConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("nobody")
            .database("nothing");
        let policy = RetryPolicy {
            max_attempts: 2,
            step: Duration::from_millis(10),
        };

        let err = connect_with_retry(&options, policy).await.unwrap_err();
        assert_eq!(err.attempts, 2);
    }

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p crm-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn health_check_reports_pool() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let options: PgConnectOptions = url.parse().expect("invalid DATABASE_URL");
        let pool = connect(&options).await.expect("connect failed");

        let status = health_check(&pool).await.expect("health check failed");
        assert!(status.size >= 1);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn transaction_rolls_back_on_error() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let options: PgConnectOptions = url.parse().expect("invalid DATABASE_URL");
        let pool = connect(&options).await.expect("connect failed");

        sqlx::query("CREATE TABLE IF NOT EXISTS tx_probe (n INT)")
            .execute(&pool)
            .await
            .unwrap();

        let result: Result<(), DbError> = with_transaction(&pool, |conn| {
            Box::pin(async move {
                sqlx::query("INSERT INTO tx_probe (n) VALUES (1)")
                    .execute(&mut *conn)
                    .await?;
                Err::<(), _>(DbError::Internal("abort".into()))
            })
        })
        .await;
        assert!(result.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tx_probe")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);

        sqlx::query("DROP TABLE tx_probe").execute(&pool).await.unwrap();
    }
}
