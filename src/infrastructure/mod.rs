//! Infrastructure Layer
//!
//! Cross-cutting concerns: database pool acquisition and the metrics
//! registry.

pub mod db_pool;
pub mod metrics;

pub use db_pool::{AcquireError, DbSettings, PoolAcquirer, RetryPolicy, MAX_DB_CONNECTIONS};
pub use metrics::AppMetrics;
