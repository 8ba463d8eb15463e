//! Backend selection from the running processes.

use super::Backend;
use crate::config::{DebugOverrides, ExporterConfig};
use crate::error::Result;
use crate::metrics::collector::{JsonCollector, MinerCollector, NoSupportedMiner};
use crate::metrics::descriptor::HostInfo;
use crate::metrics::fetch::SnapshotSource;
use std::ffi::OsStr;
use std::time::Duration;
use sysinfo::System;
use tracing::{debug, info, warn};

/// Map a process name to the backend it belongs to.
pub fn backend_for_process(name: &str) -> Option<Backend> {
    let name = name.to_lowercase();
    if name.contains("t-rex") {
        Some(Backend::Trex)
    } else if name.contains("lolminer") {
        Some(Backend::Lolminer)
    } else {
        None
    }
}

/// Pick the backend to poll, honouring the debug overrides first.
pub fn detect_backend(overrides: &DebugOverrides) -> Option<Backend> {
    if let Some(backend) = overrides.backend {
        debug!("Backend forced by environment: {}", backend);
        return Some(backend);
    }

    let system = System::new_all();
    let found = system.processes().values().find_map(|process| {
        let name: &OsStr = process.name().as_ref();
        backend_for_process(&name.to_string_lossy())
    });

    match found {
        Some(backend) => info!("Detected running miner: {}", backend),
        None => warn!("No supported miner found"),
    }
    found
}

/// Build the collector the process will own for its lifetime.
pub fn build_collector(
    backend: Option<Backend>,
    overrides: &DebugOverrides,
    config: ExporterConfig,
    fetch_timeout: Duration,
) -> Result<Box<dyn MinerCollector>> {
    let Some(backend) = backend else {
        return Ok(Box::new(NoSupportedMiner));
    };

    let spec = backend.spec();
    let source = match &overrides.request_fixture {
        Some(path) => {
            info!("Serving {} metrics from fixture {}", backend, path.display());
            SnapshotSource::fixture(path)
        }
        None => SnapshotSource::http(spec.endpoint.clone(), fetch_timeout)?,
    };
    let host = HostInfo::detect(overrides.hostname.clone());

    Ok(Box::new(JsonCollector::new(spec, source, host, config)?))
}
