//! Sweet Control
//!
//! HTTP service that records and reports sales ("vendas"), backed by MySQL,
//! with built-in Prometheus-style operational metrics.
//!
//! This module exposes the components for use in integration tests and as a
//! library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::inbound::{build_router, AppState};
pub use adapters::outbound::{InMemorySaleRepository, MySqlSaleRepository};
pub use application::{SaleDraft, SalesError, SalesService, RECENT_SALES_LIMIT};
pub use config::{load_config, Config};
pub use domain::entities::{NewSale, Sale};
pub use domain::ports::{SaleRepository, StorageError};
pub use infrastructure::db_pool::{AcquireError, DbSettings, PoolAcquirer, RetryPolicy};
pub use infrastructure::metrics::AppMetrics;
