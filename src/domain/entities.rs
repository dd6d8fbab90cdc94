//! Domain Entities - Core business objects
//!
//! Sales as the service records and reports them. Field names follow the
//! `vendas` table schema.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A recorded sale, as persisted in the `vendas` table.
#[derive(Debug, Clone, Serialize)]
pub struct Sale {
    /// Auto-incrementing identifier
    pub id: u64,
    /// Product name
    pub produto: String,
    /// Product category (Bolos, Salgados, Doces, Pães, ...)
    pub categoria: String,
    /// Sale amount, fixed-point with two decimal places
    pub valor: Decimal,
    /// When the sale was recorded
    pub data_venda: DateTime<Utc>,
}

/// A validated sale, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub produto: String,
    pub categoria: String,
    pub valor: Decimal,
}
