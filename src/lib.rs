//! # Mining Exporter
//!
//! Polls a local cryptocurrency miner's JSON API and republishes selected
//! fields as Prometheus counters and gauges.
//!
//! ## Features
//!
//! - **Table driven**: each supported miner is a set of label and metric
//!   descriptors, evaluated by one generic engine
//! - **Per-device metrics**: one sample per GPU, whether the miner reports
//!   devices as objects or as parallel arrays
//! - **Fault isolation**: a missing field drops one value, a dead miner
//!   drops one scrape
//! - **Library + Binary**: use the engine as a crate or run the exporter
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mining_exporter::{
//!     backends::detect, start_web_server, DebugOverrides, ExporterConfig, WebConfig,
//! };
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let overrides = DebugOverrides::from_env();
//!     let backend = detect::detect_backend(&overrides);
//!     let collector = detect::build_collector(
//!         backend,
//!         &overrides,
//!         ExporterConfig::default(),
//!         Duration::from_secs(5),
//!     )?;
//!
//!     start_web_server(WebConfig::default(), collector).await?;
//!     Ok(())
//! }
//! ```

pub mod backends;
pub mod config;
pub mod error;
pub mod metrics;
pub mod web;

// Re-export public API
pub use backends::{Backend, BackendSpec, DeviceAddressing};
pub use config::{DebugOverrides, ExporterConfig};
pub use error::{ExporterError, Result};
pub use metrics::{
    collector::{JsonCollector, MinerCollector, NoSupportedMiner},
    family::{MetricFamily, Sample},
};

pub use web::{start_web_server, WebConfig};

/// The default web server port
pub const DEFAULT_WEB_PORT: u16 = 32727;

/// The default miner API timeout in milliseconds
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5000;
