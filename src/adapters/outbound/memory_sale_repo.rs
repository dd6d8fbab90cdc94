//! In-Memory Sale Repository
//!
//! Keeps sales in process memory. Backs the test suite and is handy for
//! exercising the HTTP surface without a database.

use crate::domain::entities::{NewSale, Sale};
use crate::domain::ports::{SaleRepository, StorageError};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemorySaleRepository {
    sales: RwLock<Vec<Sale>>,
    next_id: AtomicU64,
}

impl InMemorySaleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sales.read().await.len()
    }
}

#[async_trait]
impl SaleRepository for InMemorySaleRepository {
    async fn insert(&self, sale: &NewSale) -> Result<u64, StorageError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.sales.write().await.push(Sale {
            id,
            produto: sale.produto.clone(),
            categoria: sale.categoria.clone(),
            valor: sale.valor,
            data_venda: Utc::now(),
        });
        Ok(id)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Sale>, StorageError> {
        let mut sales = self.sales.read().await.clone();
        // newest first; id breaks ties between same-instant inserts
        sales.sort_by(|a, b| b.data_venda.cmp(&a.data_venda).then(b.id.cmp(&a.id)));
        sales.truncate(limit.max(0) as usize);
        Ok(sales)
    }
}
