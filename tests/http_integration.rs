//! Integration tests for the HTTP surface.
//!
//! The router runs over the in-memory repository, so every assertion about
//! handlers, middleware and metrics goes through the real axum stack.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use sweetcontrol::{
    build_router, AppMetrics, AppState, InMemorySaleRepository, NewSale, Sale, SaleRepository,
    SalesService, StorageError,
};

fn test_app() -> (Router, Arc<InMemorySaleRepository>, Arc<AppMetrics>) {
    let repo = Arc::new(InMemorySaleRepository::new());
    let metrics = Arc::new(AppMetrics::new().unwrap());
    let sales = Arc::new(SalesService::new(repo.clone(), metrics.clone()));
    let app = build_router(AppState {
        sales,
        metrics: metrics.clone(),
    });
    (app, repo, metrics)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

fn post_venda(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/venda")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn requests_total(metrics: &AppMetrics, method: &str, route: &str, status: &str) -> u64 {
    metrics
        .http_requests_total
        .get_metric_with_label_values(&[method, route, status])
        .unwrap()
        .get()
}

fn duration_samples(metrics: &AppMetrics, method: &str, route: &str, status: &str) -> u64 {
    metrics
        .http_request_duration_seconds
        .get_metric_with_label_values(&[method, route, status])
        .unwrap()
        .get_sample_count()
}

fn vendas_total(metrics: &AppMetrics, categoria: &str) -> u64 {
    metrics
        .vendas_total
        .get_metric_with_label_values(&[categoria])
        .unwrap()
        .get()
}

#[tokio::test]
async fn banner_is_served_at_root() {
    let (app, _, _) = test_app();

    let (status, body) = send(&app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Sweet Control"));
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _, _) = test_app();

    let (status, body) = send(&app, get("/health")).await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_sale_returns_increasing_ids_and_shows_up_in_listing() {
    let (app, _, _) = test_app();

    let (status, body) = send(
        &app,
        post_venda(&json!({ "produto": "Coxinha", "categoria": "Salgados", "valor": 8.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let first: Value = serde_json::from_slice(&body).unwrap();

    let (_, body) = send(
        &app,
        post_venda(&json!({ "produto": "Quindim", "categoria": "Doces", "valor": 6.0 })),
    )
    .await;
    let second: Value = serde_json::from_slice(&body).unwrap();

    assert!(second["insertedId"].as_u64().unwrap() > first["insertedId"].as_u64().unwrap());

    let (status, body) = send(&app, get("/vendas")).await;
    assert_eq!(status, StatusCode::OK);
    let rows: Value = serde_json::from_slice(&body).unwrap();
    let rows = rows.as_array().unwrap();

    assert!(rows.iter().any(|r| {
        r["produto"] == "Coxinha"
            && r["categoria"] == "Salgados"
            && r["valor"].as_str().unwrap().parse::<Decimal>().unwrap() == dec!(8)
    }));
}

#[tokio::test]
async fn create_sale_rejects_missing_empty_and_null_fields() {
    let (app, repo, metrics) = test_app();

    let cases = [
        json!({ "categoria": "Doces", "valor": 3.5 }),
        json!({ "produto": "", "categoria": "Doces", "valor": 3.5 }),
        json!({ "produto": null, "categoria": "Doces", "valor": 3.5 }),
        json!({ "produto": "Brigadeiro", "valor": 3.5 }),
        json!({ "produto": "Brigadeiro", "categoria": "", "valor": 3.5 }),
        json!({ "produto": "Brigadeiro", "categoria": "Doces" }),
        json!({ "produto": "Brigadeiro", "categoria": "Doces", "valor": null }),
        json!({}),
    ];

    for case in &cases {
        let (status, _) = send(&app, post_venda(case)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {case}");
    }

    // malformed body is a 400 as well
    let malformed = Request::builder()
        .method("POST")
        .uri("/venda")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let (status, _) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(repo.len().await, 0);
    assert_eq!(vendas_total(&metrics, "Doces"), 0);
}

#[tokio::test]
async fn listing_caps_at_one_hundred_newest_first() {
    let (app, repo, _) = test_app();

    for i in 0..150 {
        repo.insert(&NewSale {
            produto: format!("Produto {i}"),
            categoria: "Bolos".to_string(),
            valor: dec!(10.00),
        })
        .await
        .unwrap();
    }

    let (status, body) = send(&app, get("/vendas")).await;
    assert_eq!(status, StatusCode::OK);
    let rows: Value = serde_json::from_slice(&body).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 100);

    let parse = |r: &Value| {
        chrono::DateTime::parse_from_rfc3339(r["data_venda"].as_str().unwrap()).unwrap()
    };
    for pair in rows.windows(2) {
        assert!(parse(&pair[0]) >= parse(&pair[1]));
    }
}

#[tokio::test]
async fn vendas_counter_tracks_categories_exactly() {
    let (app, _, metrics) = test_app();

    for _ in 0..3 {
        send(
            &app,
            post_venda(&json!({ "produto": "Bolo de Fubá", "categoria": "Bolos", "valor": 38.0 })),
        )
        .await;
    }
    for _ in 0..2 {
        send(
            &app,
            post_venda(&json!({ "produto": "Empada", "categoria": "Salgados", "valor": 7.5 })),
        )
        .await;
    }

    assert_eq!(vendas_total(&metrics, "Bolos"), 3);
    assert_eq!(vendas_total(&metrics, "Salgados"), 2);
    assert_eq!(vendas_total(&metrics, "Doces"), 0);
}

#[tokio::test]
async fn every_request_is_observed_once_with_final_status() {
    let (app, _, metrics) = test_app();

    send(&app, get("/")).await;
    send(&app, get("/vendas")).await;
    send(&app, post_venda(&json!({}))).await; // 400
    send(&app, get("/nope")).await; // 404 through the fallback

    for (method, route, status) in [
        ("GET", "/", "200"),
        ("GET", "/vendas", "200"),
        ("POST", "/venda", "400"),
        ("GET", "/nope", "404"),
    ] {
        assert_eq!(
            requests_total(&metrics, method, route, status),
            1,
            "counter for {method} {route} {status}"
        );
        assert_eq!(
            duration_samples(&metrics, method, route, status),
            1,
            "histogram for {method} {route} {status}"
        );
    }
}

#[tokio::test]
async fn failing_storage_maps_to_500_and_is_still_observed() {
    struct FailingRepository;

    #[async_trait::async_trait]
    impl SaleRepository for FailingRepository {
        async fn insert(&self, _: &NewSale) -> Result<u64, StorageError> {
            Err(StorageError::Query(anyhow::anyhow!("connection reset")))
        }

        async fn recent(&self, _: i64) -> Result<Vec<Sale>, StorageError> {
            Err(StorageError::Query(anyhow::anyhow!("connection reset")))
        }
    }

    let metrics = Arc::new(AppMetrics::new().unwrap());
    let sales = Arc::new(SalesService::new(Arc::new(FailingRepository), metrics.clone()));
    let app = build_router(AppState {
        sales,
        metrics: metrics.clone(),
    });

    let (status, body) = send(&app, get("/vendas")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Erro no servidor");

    let (status, _) = send(
        &app,
        post_venda(&json!({ "produto": "Coxinha", "categoria": "Salgados", "valor": 8.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(vendas_total(&metrics, "Salgados"), 0);

    assert_eq!(requests_total(&metrics, "GET", "/vendas", "500"), 1);
    assert_eq!(duration_samples(&metrics, "GET", "/vendas", "500"), 1);
    assert_eq!(requests_total(&metrics, "POST", "/venda", "500"), 1);
}

#[tokio::test]
async fn concurrent_posts_produce_exact_counts() {
    let (app, repo, metrics) = test_app();

    let posts = (0..20).map(|i| {
        let app = app.clone();
        async move {
            let body = json!({
                "produto": format!("Produto {i}"),
                "categoria": "Doces",
                "valor": 3.5,
            });
            app.oneshot(post_venda(&body)).await.unwrap().status()
        }
    });

    for status in futures::future::join_all(posts).await {
        assert_eq!(status, StatusCode::CREATED);
    }

    assert_eq!(repo.len().await, 20);
    assert_eq!(vendas_total(&metrics, "Doces"), 20);
    assert_eq!(requests_total(&metrics, "POST", "/venda", "201"), 20);
}

#[tokio::test]
async fn metrics_endpoint_serves_exposition_text() {
    let (app, _, _) = test_app();

    send(&app, get("/")).await; // at least one observation

    let response = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
    assert!(text.contains("http_request_duration_seconds_bucket"));
    assert!(text.contains("le=\"0.1\""));
}
