//! lolMiner tables.
//!
//! lolMiner reports devices twice: descriptive fields per device under
//! `Workers`, and share and performance counters as parallel arrays under
//! `Algorithms[0]`. Both are addressed with the device position.

use super::{Backend, BackendSpec, DeviceAddressing};
use crate::metrics::descriptor::{LabelDescriptor as L, MetricDescriptor as M};
use crate::metrics::transform::Transform;

pub const ENDPOINT: &str = "http://127.0.0.1:3333/";

pub fn spec() -> BackendSpec {
    BackendSpec {
        backend: Backend::Lolminer,
        endpoint: ENDPOINT.to_string(),
        labels: vec![
            L::host("host", Transform::Hostname),
            L::host("platform", Transform::Platform),
            L::direct("miner", Backend::Lolminer.miner_name()),
            L::path("algorithm", "Algorithms[0].Algorithm"),
            L::coalesce(
                "worker",
                vec![
                    L::path("worker", "Algorithms[0].Worker"),
                    L::path("worker", "Algorithms[0].User").with_transform(Transform::WorkerFromUser),
                ],
            ),
            L::path("wallet", "Algorithms[0].User").with_transform(Transform::WalletFromUser),
            L::path("pool_url", "Algorithms[0].Pool"),
            L::path("pool_user", "Algorithms[0].User"),
            L::path("miner_version", "Software").with_transform(Transform::AfterFirstWord),
            L::path("miner_title", "Software"),
        ],
        metrics: vec![
            M::counter("uptime_sec", "amount of time miner has been running in seconds", "Session.Uptime"),
            M::counter("shares_accepted", "number of accepted shares", "Algorithms[0].Total_Accepted"),
            M::counter("shares_rejected", "number of rejected shares", "Algorithms[0].Total_Rejected"),
            M::counter("shares_stale", "number of stale shares", "Algorithms[0].Total_Stales"),
            M::counter("shares_error", "number of error shares", "Algorithms[0].Total_Errors"),
            M::gauge("gpu_count", "number of GPUs", "Num_Workers"),
            M::gauge("hashrate", "total hashrate", "Algorithms[0]")
                .with_transform(Transform::pow10("Total_Performance", "Performance_Factor")),
        ],
        device_labels: vec![
            L::path("device_vendor", "Workers[i].Name").with_transform(Transform::FirstWord),
            L::path("device_name", "Workers[i].Name"),
            L::path("device_pci_id", "Workers[i].PCIE_Address").with_transform(Transform::PcieBusSlot),
        ],
        device_metrics: vec![
            M::counter("gpu_shares_accepted", "Per-GPU accepted shares", "Algorithms[0].Worker_Accepted[i]"),
            M::counter("gpu_shares_rejected", "Per-GPU rejected shares", "Algorithms[0].Worker_Rejected[i]"),
            M::counter("gpu_shares_stale", "Per-GPU stale shares", "Algorithms[0].Worker_Stales[i]"),
            M::counter("gpu_shares_error", "Per-GPU error shares", "Algorithms[0].Worker_Errors[i]"),
            M::gauge("gpu_hashrate", "GPU hashrate", "Algorithms[0]")
                .with_transform(Transform::pow10("Worker_Performance[i]", "Performance_Factor")),
            M::gauge("gpu_clock_core", "GPU core clock speed", "Workers[i].CCLK"),
            M::gauge("gpu_clock_memory", "GPU memory clock speed", "Workers[i].MCLK"),
            M::gauge("gpu_temperature_core", "GPU core temperature", "Workers[i].Core_Temp")
                .with_transform(Transform::OnlyPositive),
            M::gauge("gpu_temperature_junction", "GPU junction temperature", "Workers[i].Juc_Temp")
                .with_transform(Transform::OnlyPositive),
            M::gauge("gpu_temperature_memory", "GPU memory temperature", "Workers[i].Mem_Temp")
                .with_transform(Transform::OnlyPositive),
            M::gauge("gpu_fan_speed", "GPU fan speed", "Workers[i].Fan_Speed"),
            M::gauge("gpu_power", "GPU power in watts", "Workers[i].Power"),
        ],
        addressing: DeviceAddressing::Positional {
            devices: "Workers".to_string(),
        },
        bus_address_label: "device_pci_id",
    }
}
