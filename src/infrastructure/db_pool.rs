//! MySQL Pool Acquisition
//!
//! Lazily establishes the shared connection pool, retrying with a fixed
//! delay while the database is not yet reachable at boot. The pool is
//! created at most once per process; every caller observes the same handle.

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Concurrency cap for the shared pool. Checkout requests beyond the cap
/// queue and wait for a free connection.
pub const MAX_DB_CONNECTIONS: u32 = 10;

/// Connection parameters for the MySQL store. All fields are required; no
/// defaults are substituted.
#[derive(Clone)]
pub struct DbSettings {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
}

impl DbSettings {
    fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .port(self.port)
    }
}

// Credentials stay out of logs.
impl fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSettings")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}

/// Bounded retry policy for pool creation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum connection attempts before giving up.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(5),
        }
    }
}

/// Pool acquisition errors.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The retry budget was consumed without a successful connection.
    /// Fatal to the operation that requested the pool, not to the process.
    #[error("could not connect to the MySQL database after {0} attempts")]
    ConnectionExhausted(u32),
}

/// Run `connect` under the retry policy.
///
/// Each failure is logged with its attempt number and followed by the fixed
/// delay, until an attempt succeeds or the budget is exhausted. There is no
/// delay after the final attempt.
pub async fn connect_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut connect: F,
) -> Result<T, AcquireError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    for attempt in 1..=policy.max_attempts {
        match connect(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "MySQL connection attempt failed"
                );
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    Err(AcquireError::ConnectionExhausted(policy.max_attempts))
}

/// Holder for the process-wide MySQL pool.
///
/// Constructed once in the composition root and injected into the storage
/// adapter. The first `acquire` creates the pool under the retry policy;
/// concurrent first calls still create a single pool, and later calls
/// return the memoized handle without revalidation.
pub struct PoolAcquirer {
    settings: DbSettings,
    policy: RetryPolicy,
    pool: OnceCell<MySqlPool>,
}

impl PoolAcquirer {
    pub fn new(settings: DbSettings) -> Self {
        Self::with_policy(settings, RetryPolicy::default())
    }

    pub fn with_policy(settings: DbSettings, policy: RetryPolicy) -> Self {
        Self {
            settings,
            policy,
            pool: OnceCell::new(),
        }
    }

    /// Get the shared pool, creating it on first demand.
    ///
    /// `connect_with` establishes and pings one connection eagerly, so an
    /// unreachable server fails here rather than on the first query. A
    /// failed creation leaves the holder empty; the next caller starts a
    /// fresh retry cycle.
    pub async fn acquire(&self) -> Result<&MySqlPool, AcquireError> {
        self.pool
            .get_or_try_init(|| async {
                let pool = connect_with_retry(&self.policy, |_attempt| {
                    let options = self.settings.connect_options();
                    async move {
                        MySqlPoolOptions::new()
                            .max_connections(MAX_DB_CONNECTIONS)
                            .connect_with(options)
                            .await
                    }
                })
                .await?;

                tracing::info!("MySQL connection pool established");
                Ok(pool)
            })
            .await
    }
}
