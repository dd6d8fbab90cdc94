//! HTTP Server
//!
//! The axum router for the sales API, the error-to-status mapping and the
//! request instrumentation middleware that feeds the metrics registry.

use crate::application::{SaleDraft, SalesError, SalesService};
use crate::domain::entities::Sale;
use crate::infrastructure::metrics::AppMetrics;
use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tower_http::trace::TraceLayer;

const BANNER: &str = "API \"Sweet Control\" no ar! Acesse /metrics para ver as métricas.";

/// Shared application state available to handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub sales: Arc<SalesService>,
    pub metrics: Arc<AppMetrics>,
}

/// Build the application router.
///
/// The instrumentation middleware is layered over every route and the
/// fallback, so unmatched requests are observed too.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/venda", post(create_sale_handler))
        .route("/vendas", get(list_sales_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .with_state(state)
}

/// Measure every request and fold the outcome into the metrics registry
/// once the response is ready, keyed by the final status code. The route
/// label is the matched template when the request hit a route, the raw path
/// otherwise.
async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned());

    let response = next.run(req).await;

    state.metrics.observe_request(
        method.as_str(),
        route.as_deref().unwrap_or(&path),
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

/// Errors surfaced at the HTTP boundary.
///
/// Storage and metrics detail is logged here and replaced by a generic
/// message before it reaches the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("incomplete sale data")]
    InvalidInput,
    #[error(transparent)]
    Sales(#[from] SalesError),
    #[error("metrics serialization failed")]
    Metrics(#[from] prometheus::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput | AppError::Sales(SalesError::InvalidInput) => {
                (StatusCode::BAD_REQUEST, "Dados da venda incompletos.")
            }
            AppError::Sales(SalesError::Storage(err)) => {
                tracing::error!(error = ?err, "storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro no servidor")
            }
            AppError::Metrics(err) => {
                tracing::error!(error = ?err, "metrics serialization error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro no servidor")
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CreateSaleRequest {
    #[serde(default)]
    produto: Option<String>,
    #[serde(default)]
    categoria: Option<String>,
    #[serde(default)]
    valor: Option<Decimal>,
}

#[derive(Debug, Serialize)]
struct CreateSaleResponse {
    #[serde(rename = "insertedId")]
    inserted_id: u64,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn banner_handler() -> &'static str {
    BANNER
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn metrics_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let (body, content_type) = state.metrics.snapshot()?;
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

/// Body deserialization failures (missing body, malformed JSON, wrong field
/// types) surface as the same 400 as missing fields.
async fn create_sale_handler(
    State(state): State<AppState>,
    body: Option<Json<CreateSaleRequest>>,
) -> Result<(StatusCode, Json<CreateSaleResponse>), AppError> {
    let Json(req) = body.ok_or(AppError::InvalidInput)?;

    let draft = SaleDraft {
        produto: req.produto,
        categoria: req.categoria,
        valor: req.valor,
    };
    let inserted_id = state.sales.create_sale(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSaleResponse { inserted_id }),
    ))
}

async fn list_sales_handler(State(state): State<AppState>) -> Result<Json<Vec<Sale>>, AppError> {
    Ok(Json(state.sales.list_sales().await?))
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "not found" })),
    )
}
