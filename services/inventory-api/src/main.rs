use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    serve, Router,
};
use inventory_utils::{init_logging, AppConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

mod handlers;
mod metrics;
mod middleware;
mod routes;
mod service;

use handlers::{health_check, metrics_handler};
use metrics::Metrics;
use middleware::request_id_middleware;
use service::InventoryService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });

    init_logging(&config.logging)?;
    info!(
        duplicate_policy = ?config.validation.duplicate_policy,
        percent_tolerance = ?config.validation.percent_tolerance,
        "Starting inventory API"
    );

    let app = create_app(&config)?;

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid server host '{}'", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));
    let listener = TcpListener::bind(&addr).await?;
    info!("Inventory API listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

fn create_app(config: &AppConfig) -> Result<Router> {
    let metrics = Metrics::new("inventory").context("Failed to register metrics")?;
    let state = AppState {
        service: Arc::new(InventoryService::new(config, metrics)),
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", routes::create_api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(DefaultBodyLimit::max(config.server.max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware)),
        )
        .with_state(state);

    Ok(app)
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InventoryService>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn multipart_request(uri: &str, filename: &str, content: &str) -> Request<Body> {
        let boundary = "inventory-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = boundary,
            f = filename,
            c = content
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_app(&AppConfig::default()).unwrap();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_submit_materials() {
        let app = create_app(&AppConfig::default()).unwrap();
        let payload = json!({
            "report_type": "SARA 313",
            "materials": [
                {
                    "sds_number": "S1",
                    "name": "Acetone",
                    "order_quantity": 200,
                    "cas_entries": [
                        {"cas_number": "67-64-1", "percent": 60},
                        {"cas_number": "7732-18-5", "percent": "40"}
                    ]
                },
                {
                    "sds_number": "S1",
                    "name": "Mix",
                    "order_quantity": "50",
                    "cas_entries": [
                        {"cas_number": "64-17-5", "percent": 50},
                        {"cas_number": "7732-18-5", "percent": 50}
                    ]
                }
            ]
        });
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/inventory/materials")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["report_type"], "SARA 313");
        assert_eq!(body["report"]["summary"]["duplicate_sds_numbers"], 1);
        assert_eq!(body["display"][0]["usages"][0]["usage_lbs"], "120.00");
        assert_eq!(body["display"][1]["usages"][0]["usage_lbs"], "25.00");
    }

    #[tokio::test]
    async fn test_empty_submission_is_bad_request() {
        let app = create_app(&AppConfig::default()).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/inventory/materials")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"materials": []}"#))
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_null_quantity_rejects_only_that_material() {
        let app = create_app(&AppConfig::default()).unwrap();
        let payload = json!({
            "materials": [
                {
                    "sds_number": "S1",
                    "name": "Acetone",
                    "order_quantity": 200,
                    "cas_entries": [
                        {"cas_number": "67-64-1", "percent": 60},
                        {"cas_number": "7732-18-5", "percent": 40}
                    ]
                },
                {
                    "sds_number": "S2",
                    "name": "Thinner",
                    "order_quantity": null,
                    "cas_entries": [
                        {"cas_number": "64-17-5", "percent": 50},
                        {"cas_number": "7732-18-5"}
                    ]
                }
            ]
        });
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/inventory/materials")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["summary"]["rejected"], 1);
        assert_eq!(body["display"][0]["usages"][0]["usage_lbs"], "120.00");
        assert_eq!(body["rejections"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_error_response() {
        let app = create_app(&AppConfig::default()).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/inventory/materials")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"materials": [{"sds_number": "S1""#))
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_upload_csv() {
        let app = create_app(&AppConfig::default()).unwrap();
        let csv = "SDS #,Material Name,Order Quantity (lbs),CAS #1,% CAS #1,CAS #2,% CAS #2\n\
S1,Bad,100,111-11-1,50,111-11-1,30\n\
S2,Thinner,100,NaN,30,64-17-5,70\n\
S3,Broken,abc,64-17-5,100,,";
        let request = multipart_request("/api/v1/inventory/upload?report_type=VOC/HAP", "orders.csv", csv);

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["source"], "csv");
        assert_eq!(body["report"]["summary"]["duplicate_cas_numbers"], 1);
        assert_eq!(body["report"]["summary"]["rejected"], 1);
        assert_eq!(body["report"]["materials"][0]["total_percent"], 50.0);
        assert_eq!(body["display"][1]["usages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_schema_error() {
        let app = create_app(&AppConfig::default()).unwrap();
        let request = multipart_request("/api/v1/inventory/upload", "orders.csv", "Name,SDS\nA,S1\n");

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "CSV_SCHEMA_ERROR");
    }

    #[tokio::test]
    async fn test_upload_unknown_report_type() {
        let app = create_app(&AppConfig::default()).unwrap();
        let request = multipart_request("/api/v1/inventory/upload?report_type=FormR", "orders.csv", "x");

        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
