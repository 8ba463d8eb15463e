//! Exporter configuration: the optional TOML file and the debug overrides
//! read from the environment.
//!
//! ```toml
//! [devices."01:00"]
//! labels = { rig_slot = "1", riser = "a" }
//!
//! [devices."2b:00"]
//! labels = { rig_slot = "2" }
//! ```

use crate::backends::Backend;
use crate::metrics::descriptor::LabelDescriptor;
use anyhow::{bail, Context};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

lazy_static! {
    static ref LABEL_NAME: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("label pattern compiles");
}

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "mining_exporter.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Auxiliary labels keyed by PCIe bus address (`"bb:ss"`)
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate_label_names()?;
        Ok(config)
    }

    /// Every auxiliary key must be a usable Prometheus label name. Names
    /// starting with `__` are reserved.
    pub fn validate_label_names(&self) -> anyhow::Result<()> {
        for (address, device) in &self.devices {
            for name in device.labels.keys() {
                if !LABEL_NAME.is_match(name) || name.starts_with("__") {
                    bail!("invalid label name `{}` for device {}", name, address);
                }
            }
        }
        Ok(())
    }

    /// Load an explicitly requested file, or the default file when present.
    /// No file at all yields an empty configuration.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Names of every auxiliary label, sorted. Every device family carries
    /// all of them so the label schema stays identical across devices.
    pub fn auxiliary_label_names(&self) -> Vec<String> {
        self.devices
            .values()
            .flat_map(|device| device.labels.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Direct label descriptors for the device at `bus_address`, one per name
    /// in `names`. Unknown devices and missing keys get empty values.
    pub fn auxiliary_labels(&self, bus_address: &str, names: &[String]) -> Vec<LabelDescriptor> {
        let device = self
            .devices
            .iter()
            .find(|(address, _)| address.eq_ignore_ascii_case(bus_address))
            .map(|(_, device)| device);

        names
            .iter()
            .map(|name| {
                let value = device
                    .and_then(|d| d.labels.get(name))
                    .cloned()
                    .unwrap_or_default();
                LabelDescriptor::direct(name.clone(), value)
            })
            .collect()
    }
}

/// Test and debugging hooks taken from `DEBUG_MOCK_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugOverrides {
    /// `DEBUG_MOCK_HOSTNAME`: reported hostname
    pub hostname: Option<String>,
    /// `DEBUG_MOCK_REQUEST`: JSON file served instead of the miner API
    pub request_fixture: Option<PathBuf>,
    /// `DEBUG_MOCK_TREX` / `DEBUG_MOCK_LOLMINER`: skip process detection
    pub backend: Option<Backend>,
}

impl DebugOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend = if lookup("DEBUG_MOCK_TREX").is_some() {
            Some(Backend::Trex)
        } else if lookup("DEBUG_MOCK_LOLMINER").is_some() {
            Some(Backend::Lolminer)
        } else {
            None
        };

        Self {
            hostname: lookup("DEBUG_MOCK_HOSTNAME"),
            request_fixture: lookup("DEBUG_MOCK_REQUEST")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            backend,
        }
    }
}
