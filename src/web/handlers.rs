//! HTTP handlers for the scrape and health endpoints.

use crate::metrics::collector::MinerCollector;
use crate::web::exposition;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

/// Shared server state. The collector sits behind a mutex so that concurrent
/// scrapes queue up instead of polling the miner in parallel.
pub struct AppState {
    collector: Mutex<Box<dyn MinerCollector>>,
    backend: String,
}

impl AppState {
    pub fn new(collector: Box<dyn MinerCollector>) -> Self {
        let backend = collector.name().to_string();
        Self {
            collector: Mutex::new(collector),
            backend,
        }
    }
}

/// Poll the miner and render the result for Prometheus.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, StatusCode> {
    let collector = state.collector.lock().await;

    match collector.collect().await {
        Ok(families) => Ok((
            [(header::CONTENT_TYPE, exposition::CONTENT_TYPE)],
            exposition::render(&families),
        )),
        Err(e) => {
            error!("Metric assembly failed for {}: {}", state.backend, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "mining-exporter",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.backend,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
