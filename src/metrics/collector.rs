//! Poll orchestration: fetch one snapshot and turn it into metric families.

use crate::backends::{BackendSpec, DeviceAddressing};
use crate::config::ExporterConfig;
use crate::error::{ExporterError, Result};
use crate::metrics::descriptor::{HostInfo, LabelSet, ResolveContext};
use crate::metrics::family::{FamilyAccumulator, MetricFamily};
use crate::metrics::fetch::SnapshotSource;
use crate::metrics::path;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

/// Something that produces the complete metric list for one scrape.
#[async_trait]
pub trait MinerCollector: Send + Sync {
    /// Name used in logs and the health endpoint.
    fn name(&self) -> &str;

    /// Run one poll.
    ///
    /// Miner-side failures yield an empty list. Only faults in the descriptor
    /// tables are returned as errors.
    async fn collect(&self) -> Result<Vec<MetricFamily>>;
}

/// Collector used when no supported miner is running.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSupportedMiner;

#[async_trait]
impl MinerCollector for NoSupportedMiner {
    fn name(&self) -> &str {
        "none"
    }

    async fn collect(&self) -> Result<Vec<MetricFamily>> {
        Ok(Vec::new())
    }
}

/// Table driven collector for any backend that serves a JSON status document.
#[derive(Debug)]
pub struct JsonCollector {
    spec: &'static BackendSpec,
    source: SnapshotSource,
    host: HostInfo,
    config: ExporterConfig,
    auxiliary_names: Vec<String>,
}

impl JsonCollector {
    /// Fails when an auxiliary label from `config` would repeat one of the
    /// backend's own label names.
    pub fn new(
        spec: &'static BackendSpec,
        source: SnapshotSource,
        host: HostInfo,
        config: ExporterConfig,
    ) -> Result<Self> {
        let auxiliary_names = config.auxiliary_label_names();
        if let Some(name) = auxiliary_names.iter().find(|name| {
            spec.labels
                .iter()
                .chain(&spec.device_labels)
                .any(|label| &label.name == *name)
        }) {
            return Err(ExporterError::config_error(format!(
                "auxiliary label `{}` collides with a {} label",
                name,
                spec.backend.miner_name()
            )));
        }

        Ok(Self {
            spec,
            source,
            host,
            config,
            auxiliary_names,
        })
    }

    pub fn spec(&self) -> &'static BackendSpec {
        self.spec
    }

    pub fn source(&self) -> &SnapshotSource {
        &self.source
    }

    fn top_label_names(&self) -> Vec<String> {
        self.spec.labels.iter().map(|l| l.name.clone()).collect()
    }

    fn device_label_names(&self) -> Vec<String> {
        let mut names = self.top_label_names();
        names.extend(self.spec.device_labels.iter().map(|l| l.name.clone()));
        names.extend(self.auxiliary_names.iter().cloned());
        names
    }

    /// Resolve every family against an already fetched snapshot.
    ///
    /// Pure and deterministic: the same snapshot and timestamp always give the
    /// same families.
    pub fn assemble(&self, snapshot: &Value, timestamp_ms: i64) -> Result<Vec<MetricFamily>> {
        let top_ctx = ResolveContext::top_level(&self.host);
        let labels = LabelSet::resolve(&self.spec.labels, snapshot, &top_ctx)?;

        let top_names = self.top_label_names();
        let mut families = Vec::with_capacity(self.spec.metrics.len() + self.spec.device_metrics.len());
        for descriptor in &self.spec.metrics {
            let mut family = FamilyAccumulator::new(descriptor, top_names.clone());
            family.add_value(snapshot, &labels, timestamp_ms, &top_ctx)?;
            families.push(family.into_family());
        }

        let device_names = self.device_label_names();
        let mut device_families: Vec<_> = self
            .spec
            .device_metrics
            .iter()
            .map(|descriptor| FamilyAccumulator::new(descriptor, device_names.clone()))
            .collect();

        for (index, base) in devices(snapshot, &self.spec.addressing)?.into_iter().enumerate() {
            let ctx = ResolveContext::device(&self.host, index);
            let own = LabelSet::resolve(&self.spec.device_labels, base, &ctx)?;
            let address = own.get(self.spec.bus_address_label).unwrap_or_default();
            let auxiliary = LabelSet::resolve(
                &self.config.auxiliary_labels(address, &self.auxiliary_names),
                base,
                &ctx,
            )?;
            let device_labels = labels.clone().merged(own).merged(auxiliary);

            for family in &mut device_families {
                family.add_value(base, &device_labels, timestamp_ms, &ctx)?;
            }
        }

        families.extend(device_families.into_iter().map(FamilyAccumulator::into_family));
        Ok(families)
    }
}

/// The per-device resolution bases, in device order.
fn devices<'v>(snapshot: &'v Value, addressing: &DeviceAddressing) -> Result<Vec<&'v Value>> {
    let list = path::resolve(snapshot, addressing.devices_path(), None)?
        .and_then(Value::as_array);
    let Some(list) = list else {
        return Ok(Vec::new());
    };

    Ok(match addressing {
        DeviceAddressing::PerObject { .. } => list.iter().collect(),
        DeviceAddressing::Positional { .. } => vec![snapshot; list.len()],
    })
}

#[async_trait]
impl MinerCollector for JsonCollector {
    fn name(&self) -> &str {
        self.spec.backend.miner_name()
    }

    async fn collect(&self) -> Result<Vec<MetricFamily>> {
        let timestamp_ms = Utc::now().timestamp_millis();
        let snapshot = match self.source.fetch().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("Failed to poll {} at {}: {}", self.name(), self.source.describe(), err);
                return Ok(Vec::new());
            }
        };

        let families = self.assemble(&snapshot, timestamp_ms)?;
        debug!(
            "Polled {}: {} families, {} samples",
            self.name(),
            families.len(),
            families.iter().map(|f| f.samples.len()).sum::<usize>()
        );
        Ok(families)
    }
}
