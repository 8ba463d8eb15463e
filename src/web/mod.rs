//! HTTP exposition of the collected metrics.
//!
//! Every scrape of `/metrics` runs exactly one poll against the miner and
//! renders its result in the Prometheus text format.

pub mod config;
pub mod exposition;
pub mod handlers;
pub mod router;

// Re-export commonly used items
pub use config::WebConfig;
pub use handlers::AppState;
pub use router::create_app;

use crate::error::{ExporterError, Result};
use crate::metrics::collector::MinerCollector;
use std::sync::Arc;
use tracing::info;

/// Start the web server with the provided configuration and collector.
pub async fn start_web_server(config: WebConfig, collector: Box<dyn MinerCollector>) -> Result<()> {
    let backend = collector.name().to_string();
    let app = create_app(Arc::new(AppState::new(collector)));

    let addr = config.socket_addr()?;

    info!("Starting mining exporter on http://{}", addr);
    info!("Metrics endpoint: http://{}/metrics ({})", addr, backend);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ExporterError::web_server_error(format!("Failed to bind to address: {}", e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ExporterError::web_server_error(format!("Server error: {}", e)))?;

    Ok(())
}
