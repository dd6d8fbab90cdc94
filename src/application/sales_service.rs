//! Sales Service - application use case
//!
//! Validates incoming sale data, persists it through the repository port
//! and keeps the sales counter in step with successful inserts.

use crate::domain::entities::{NewSale, Sale};
use crate::domain::ports::{SaleRepository, StorageError};
use crate::infrastructure::metrics::AppMetrics;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

/// Upper bound on rows returned by the listing endpoint.
pub const RECENT_SALES_LIMIT: i64 = 100;

/// Unvalidated sale data as supplied by a client.
#[derive(Debug, Default, Clone)]
pub struct SaleDraft {
    pub produto: Option<String>,
    pub categoria: Option<String>,
    pub valor: Option<Decimal>,
}

#[derive(Debug, Error)]
pub enum SalesError {
    /// A required field is missing, null or empty.
    #[error("incomplete sale data")]
    InvalidInput,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Sales use cases: record a sale, list recent sales.
pub struct SalesService {
    repo: Arc<dyn SaleRepository>,
    metrics: Arc<AppMetrics>,
}

impl SalesService {
    pub fn new(repo: Arc<dyn SaleRepository>, metrics: Arc<AppMetrics>) -> Self {
        Self { repo, metrics }
    }

    /// Record a sale.
    ///
    /// On success the category counter is incremented and the generated id
    /// returned. Invalid input performs no insert and no count.
    pub async fn create_sale(&self, draft: SaleDraft) -> Result<u64, SalesError> {
        let sale = validate(draft)?;
        let id = self.repo.insert(&sale).await?;
        self.metrics.record_sale(&sale.categoria);
        tracing::debug!(id, categoria = %sale.categoria, "sale recorded");
        Ok(id)
    }

    /// The most recent sales, newest first, capped at [`RECENT_SALES_LIMIT`].
    pub async fn list_sales(&self) -> Result<Vec<Sale>, SalesError> {
        Ok(self.repo.recent(RECENT_SALES_LIMIT).await?)
    }
}

fn validate(draft: SaleDraft) -> Result<NewSale, SalesError> {
    match (draft.produto, draft.categoria, draft.valor) {
        (Some(produto), Some(categoria), Some(valor))
            if !produto.is_empty() && !categoria.is_empty() =>
        {
            Ok(NewSale {
                produto,
                categoria,
                valor,
            })
        }
        _ => Err(SalesError::InvalidInput),
    }
}
