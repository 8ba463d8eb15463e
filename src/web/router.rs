//! Web application router and middleware setup.

use crate::web::handlers::{self, AppState};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the axum application serving `/metrics` and `/api/health`.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/metrics", get(handlers::metrics))
        .route("/api/health", get(handlers::health_check))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExporterError, Result};
    use crate::metrics::collector::{MinerCollector, NoSupportedMiner};
    use crate::metrics::descriptor::MetricKind;
    use crate::metrics::family::{MetricFamily, Sample};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct FixedCollector;

    #[async_trait]
    impl MinerCollector for FixedCollector {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn collect(&self) -> Result<Vec<MetricFamily>> {
            Ok(vec![MetricFamily {
                name: "mining_gpu_count".to_string(),
                kind: MetricKind::Gauge,
                help: "number of GPUs".to_string(),
                label_names: vec!["miner".to_string()],
                samples: vec![Sample {
                    label_values: vec!["fixed".to_string()],
                    value: 3.0,
                    timestamp_ms: 1,
                }],
            }])
        }
    }

    struct BrokenTables;

    #[async_trait]
    impl MinerCollector for BrokenTables {
        fn name(&self) -> &str {
            "broken"
        }

        async fn collect(&self) -> Result<Vec<MetricFamily>> {
            Err(ExporterError::descriptor_error("path `a[i]` outside a device"))
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = create_app(Arc::new(AppState::new(Box::new(FixedCollector))));
        let (status, body) = get(app, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("mining_gpu_count{miner=\"fixed\"} 3 1"));
    }

    #[tokio::test]
    async fn test_metrics_without_miner_is_empty() {
        let app = create_app(Arc::new(AppState::new(Box::new(NoSupportedMiner))));
        let (status, body) = get(app, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_descriptor_fault_is_a_server_error() {
        let app = create_app(Arc::new(AppState::new(Box::new(BrokenTables))));
        let (status, _) = get(app, "/metrics").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health_reports_backend() {
        let app = create_app(Arc::new(AppState::new(Box::new(FixedCollector))));
        let (status, body) = get(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["backend"], "fixed");
        assert_eq!(json["status"], "ok");
    }
}
