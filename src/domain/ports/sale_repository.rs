//! Sale Repository Port
//!
//! Defines the interface for persisting and querying sales.
//! Implementations may use MySQL or in-memory storage.

use crate::domain::entities::{NewSale, Sale};
use async_trait::async_trait;
use thiserror::Error;

/// Error surfaced by storage adapters.
///
/// The display form is intentionally generic; the underlying detail is
/// logged server-side and never reaches API clients.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database connection could not be established.
    #[error("database unavailable")]
    Unavailable(#[source] anyhow::Error),
    /// A query failed against an established connection.
    #[error("query failed")]
    Query(#[source] anyhow::Error),
}

/// Repository for recording and listing sales.
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Insert a sale and return the generated identifier.
    async fn insert(&self, sale: &NewSale) -> Result<u64, StorageError>;

    /// The most recent sales, newest first, at most `limit` rows.
    async fn recent(&self, limit: i64) -> Result<Vec<Sale>, StorageError>;
}
