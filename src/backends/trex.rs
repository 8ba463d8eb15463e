//! T-Rex miner tables.
//!
//! T-Rex serves `/summary`, with one self-contained object per GPU under
//! `gpus`.

use super::{Backend, BackendSpec, DeviceAddressing};
use crate::metrics::descriptor::{LabelDescriptor as L, MetricDescriptor as M};
use crate::metrics::transform::Transform;

/// T-Rex listens on 3333 on Linux builds and 4068 elsewhere.
pub fn endpoint() -> String {
    let port = if cfg!(target_os = "linux") { 3333 } else { 4068 };
    format!("http://127.0.0.1:{port}/summary")
}

pub fn spec() -> BackendSpec {
    BackendSpec {
        backend: Backend::Trex,
        endpoint: endpoint(),
        labels: vec![
            L::host("host", Transform::Hostname),
            L::host("platform", Transform::Platform),
            L::direct("miner", Backend::Trex.miner_name()),
            L::path("algorithm", "algorithm"),
            L::path("worker", "active_pool.worker"),
            // empty string when mining without a coin hint
            L::path("coin", "coin"),
            L::path("pool_url", "active_pool.url"),
            L::path("pool_user", "active_pool.user"),
            L::path("paused", "paused"),
            L::path("miner_api_version", "api"),
            L::path("miner_version", "version"),
            L::path("miner_version_build", "revision"),
            L::path("driver_version", "driver"),
        ],
        metrics: vec![
            M::counter("uptime", "amount of time miner has been running", "uptime"),
            M::counter("shares_accepted", "number of accepted shares", "accepted_count"),
            M::counter("shares_invalid", "number of invalid shares", "invalid_count"),
            M::counter("shares_rejected", "number of rejected shares", "rejected_count"),
            M::counter("solved_blocks", "count of solved blocks", "solved_count"),
            M::gauge("gpu_count", "number of GPUs", "gpu_total"),
            M::gauge("hashrate_instant", "total hashrate", "hashrate"),
            M::gauge("hashrate_24h", "1-day hashrate", "hashrate_day"),
            M::gauge("hashrate_1h", "1-hour hashrate", "hashrate_hour"),
            M::gauge("hashrate_1m", "1-minute hashrate", "hashrate_minute"),
            M::gauge("pool_difficulty", "pool work difficulty", "active_pool.difficulty")
                .with_transform(Transform::SiSuffixed),
            M::gauge("share_rate", "miner instant share rate", "sharerate"),
            M::gauge("share_rate_avg", "miner average share rate", "sharerate_average"),
        ],
        device_labels: vec![
            L::path("device_vendor", "vendor"),
            L::path("device_name", "name"),
            L::join("device_description", ["vendor", "name"]),
            L::path("device_uid", "uuid"),
            L::path("device_pci_bus", "pci_bus"),
            L::path("device_pci_domain", "pci_domain"),
            L::path("device_pci_id", "pci_id"),
            L::path("device_pci_address", ".")
                .with_transform(Transform::pcie_bus_slot_paths("pci_bus", "pci_id")),
            L::path("device_paused", "paused"),
            L::path("trex_potentially_unstable", "potentially_unstable"),
            L::path("trex_device_id", "device_id"),
            L::path("trex_gpu_id", "gpu_id"),
            L::path("trex_gpu_user_id", "gpu_user_id"),
            L::path("trex_low_load", "low_load"),
            L::path("trex_lhr_tune", "lhr_tune"),
        ],
        device_metrics: vec![
            M::counter("gpu_shares_accepted", "Per-GPU accepted shares", "shares.accepted_count"),
            M::counter("gpu_shares_invalid", "Per-GPU invalid shares", "shares.invalid_count"),
            M::counter("gpu_shares_rejected", "Per-GPU rejected shares", "shares.rejected_count"),
            M::counter(
                "gpu_solved_blocks",
                "Number of blocks this GPU has solved",
                "shares.solved_count",
            ),
            M::counter(
                "gpu_trex_lhr_lock_count",
                "Number of times the LHR lock has activated on the GPU",
                "lhr_lock_count",
            ),
            M::gauge("gpu_hashrate_instant", "GPU instantaneous total hashrate", "hashrate_instant"),
            M::gauge("gpu_hashrate_24h", "GPU 1-day hashrate", "hashrate_day"),
            M::gauge("gpu_hashrate_1h", "GPU 1-hour hashrate", "hashrate_hour"),
            M::gauge("gpu_hashrate_1m", "GPU 1-minute hashrate", "hashrate_minute"),
            M::gauge("gpu_hashrate_moment", "GPU hashrate", "hashrate"),
            M::gauge("gpu_clock_core", "GPU core clock speed", "cclock"),
            M::gauge("gpu_clock_memory", "GPU memory clock speed", "mclock"),
            M::gauge("gpu_mtweak", "GPU mtweak", "mtweak"),
            M::gauge("gpu_temperature_core", "GPU core temperature", "temperature"),
            M::gauge("gpu_fan_speed", "GPU fan speed", "fan_speed"),
            M::gauge("gpu_power_instant", "GPU power in watts", "power"),
            M::gauge("gpu_power_avg", "Average GPU power in watts", "power_avr"),
            M::gauge("gpu_intensity", "GPU mining intensity", "intensity"),
        ],
        addressing: DeviceAddressing::PerObject {
            devices: "gpus".to_string(),
        },
        bus_address_label: "device_pci_address",
    }
}
