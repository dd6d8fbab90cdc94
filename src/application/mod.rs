mod sales_service;

pub use sales_service::{SaleDraft, SalesError, SalesService, RECENT_SALES_LIMIT};
