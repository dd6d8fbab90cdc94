//! MySQL Sale Repository
//!
//! Implements SaleRepository on top of the shared sqlx pool. Also owns the
//! startup bootstrap: the `vendas` table is created when absent and seeded
//! with sample rows while it holds fewer than twenty.

use crate::domain::entities::{NewSale, Sale};
use crate::domain::ports::{SaleRepository, StorageError};
use crate::infrastructure::db_pool::PoolAcquirer;
use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::sync::Arc;

const CREATE_TABLE_SQL: &str = "\
    CREATE TABLE IF NOT EXISTS vendas (
        id INT PRIMARY KEY AUTO_INCREMENT,
        produto VARCHAR(100) NOT NULL,
        categoria VARCHAR(50) NOT NULL,
        valor DECIMAL(10, 2) NOT NULL,
        data_venda TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )";

/// Seeding applies while the table holds fewer rows than this.
const SEED_THRESHOLD: i64 = 20;

const SEED_SQL: &str = "\
    INSERT INTO vendas (produto, categoria, valor) VALUES
    ('Bolo de Chocolate', 'Bolos', 45.00),
    ('Coxinha', 'Salgados', 8.00),
    ('Brigadeiro', 'Doces', 3.50),
    ('Pão Francês', 'Pães', 1.50),
    ('Bolo de Fubá', 'Bolos', 38.00),
    ('Empada', 'Salgados', 7.50),
    ('Quindim', 'Doces', 6.00),
    ('Croissant', 'Pães', 7.00),
    ('Bolo de Chocolate', 'Bolos', 45.00),
    ('Coxinha', 'Salgados', 8.00),
    ('Brigadeiro', 'Doces', 3.50),
    ('Pão Francês', 'Pães', 1.50),
    ('Bolo de Fubá', 'Bolos', 38.00),
    ('Empada', 'Salgados', 7.50),
    ('Quindim', 'Doces', 6.00),
    ('Croissant', 'Pães', 7.00),
    ('Bolo de Chocolate', 'Bolos', 45.00),
    ('Coxinha', 'Salgados', 8.00),
    ('Brigadeiro', 'Doces', 3.50),
    ('Pão Francês', 'Pães', 1.50)";

/// MySQL-backed sale repository.
///
/// Holds the pool acquirer rather than the pool itself; the pool is
/// established lazily on the first operation that needs it.
pub struct MySqlSaleRepository {
    acquirer: Arc<PoolAcquirer>,
}

impl MySqlSaleRepository {
    pub fn new(acquirer: Arc<PoolAcquirer>) -> Self {
        Self { acquirer }
    }

    async fn pool(&self) -> Result<&MySqlPool, StorageError> {
        self.acquirer
            .acquire()
            .await
            .map_err(|e| StorageError::Unavailable(e.into()))
    }

    /// Create the `vendas` table when missing and seed it with sample data.
    /// Idempotent; meant to run once at startup.
    pub async fn initialize(&self) -> Result<(), StorageError> {
        let pool = self.pool().await?;

        sqlx::query(CREATE_TABLE_SQL)
            .execute(pool)
            .await
            .map_err(|e| StorageError::Query(e.into()))?;
        tracing::info!("vendas table verified");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vendas")
            .fetch_one(pool)
            .await
            .map_err(|e| StorageError::Query(e.into()))?;

        if count < SEED_THRESHOLD {
            tracing::info!(count, "seeding vendas table with sample rows");
            sqlx::query(SEED_SQL)
                .execute(pool)
                .await
                .map_err(|e| StorageError::Query(e.into()))?;
        }

        Ok(())
    }

    fn row_to_sale(row: &MySqlRow) -> Result<Sale, sqlx::Error> {
        Ok(Sale {
            id: row.try_get::<i32, _>("id")? as u64,
            produto: row.try_get("produto")?,
            categoria: row.try_get("categoria")?,
            valor: row.try_get("valor")?,
            data_venda: row.try_get("data_venda")?,
        })
    }
}

#[async_trait]
impl SaleRepository for MySqlSaleRepository {
    async fn insert(&self, sale: &NewSale) -> Result<u64, StorageError> {
        let pool = self.pool().await?;

        let result =
            sqlx::query("INSERT INTO vendas (produto, categoria, valor) VALUES (?, ?, ?)")
                .bind(&sale.produto)
                .bind(&sale.categoria)
                .bind(sale.valor)
                .execute(pool)
                .await
                .map_err(|e| StorageError::Query(e.into()))?;

        Ok(result.last_insert_id())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Sale>, StorageError> {
        let pool = self.pool().await?;

        let rows = sqlx::query(
            "SELECT id, produto, categoria, valor, data_venda \
             FROM vendas ORDER BY data_venda DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| StorageError::Query(e.into()))?;

        rows.iter()
            .map(Self::row_to_sale)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Query(e.into()))
    }
}
