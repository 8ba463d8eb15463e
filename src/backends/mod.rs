//! Supported miner backends.
//!
//! A backend is pure data: where to fetch the status document, which labels
//! and metrics to read from it, and how its accelerator devices are laid out.
//! The same [`JsonCollector`](crate::metrics::collector::JsonCollector) runs
//! every backend.

pub mod detect;
pub mod lolminer;
pub mod trex;

use crate::metrics::descriptor::{LabelDescriptor, MetricDescriptor};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref TREX: BackendSpec = trex::spec();
    static ref LOLMINER: BackendSpec = lolminer::spec();
}

/// How per-device records are laid out in the status document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAddressing {
    /// The array at `devices` holds one self-contained object per device.
    /// Device descriptors resolve against that object.
    PerObject { devices: String },
    /// The array at `devices` only fixes the device count. Device descriptors
    /// resolve against the whole document and select their slot with `[i]`.
    Positional { devices: String },
}

impl DeviceAddressing {
    pub fn devices_path(&self) -> &str {
        match self {
            Self::PerObject { devices } | Self::Positional { devices } => devices,
        }
    }
}

/// Complete, immutable description of one backend.
#[derive(Debug, Clone)]
pub struct BackendSpec {
    pub backend: Backend,
    /// Status document URL
    pub endpoint: String,
    /// Labels resolved once per poll against the document root
    pub labels: Vec<LabelDescriptor>,
    /// Families sampled once per poll with the top-level labels
    pub metrics: Vec<MetricDescriptor>,
    /// Labels resolved once per device and appended to the top-level labels
    pub device_labels: Vec<LabelDescriptor>,
    /// Families sampled once per device
    pub device_metrics: Vec<MetricDescriptor>,
    pub addressing: DeviceAddressing,
    /// Device label holding the PCIe bus address used to look up auxiliary labels
    pub bus_address_label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Trex,
    Lolminer,
}

impl Backend {
    pub fn spec(&self) -> &'static BackendSpec {
        match self {
            Self::Trex => &TREX,
            Self::Lolminer => &LOLMINER,
        }
    }

    /// Name the backend reports in its `miner` label.
    pub fn miner_name(&self) -> &'static str {
        match self {
            Self::Trex => "t-rex",
            Self::Lolminer => "lolMiner",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.miner_name())
    }
}
