//! Post-processing applied to resolved values.
//!
//! Transforms are plain data stored in the descriptor tables. Parameters that
//! name fields (such as the two halves of a scaled hashrate) are kept as path
//! expressions and resolved relative to the raw value, with `[i]` bound to the
//! current device.

use crate::error::Result;
use crate::metrics::descriptor::{metric_number, ResolveContext};
use crate::metrics::path;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref SI_SUFFIXED: Regex =
        Regex::new(r"^\s*(\d+\.?\d*)\s*([kKmMgGtT])?\s*$").expect("SI pattern compiles");
    static ref USER_FIELD: Regex = Regex::new(r"^([^.]+)\.(.+)$").expect("user pattern compiles");
}

/// A named, pure post-processing step.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Reported hostname; ignores its input.
    Hostname,
    /// Operating system family; ignores its input.
    Platform,
    /// Text before the first space (`"NVIDIA RTX 3070"` -> `"NVIDIA"`).
    FirstWord,
    /// Text after the first space, or the whole text when there is none.
    AfterFirstWord,
    /// Worker part of a `wallet.worker` pool login.
    WorkerFromUser,
    /// Wallet part of a `wallet.worker` pool login.
    WalletFromUser,
    /// Normalise `"1:0"` to `"01:00"`.
    PcieBusSlot,
    /// Build `"bb:ss"` from two numeric fields of the raw object.
    PcieBusSlotPaths { bus: String, slot: String },
    /// Parse `"4.29 G"` style quantities.
    SiSuffixed,
    /// `value * 10^round(log10(exponent))` from two fields of the raw object.
    Pow10 { value: String, exponent: String },
    /// Drop readings that are not strictly positive.
    OnlyPositive,
}

impl Transform {
    pub fn pcie_bus_slot_paths(bus: impl Into<String>, slot: impl Into<String>) -> Self {
        Self::PcieBusSlotPaths {
            bus: bus.into(),
            slot: slot.into(),
        }
    }

    pub fn pow10(value: impl Into<String>, exponent: impl Into<String>) -> Self {
        Self::Pow10 {
            value: value.into(),
            exponent: exponent.into(),
        }
    }

    /// Apply the transform to a present raw value.
    ///
    /// `Ok(None)` suppresses the value. Errors only come from malformed
    /// parameter paths.
    pub fn apply(&self, raw: &Value, ctx: &ResolveContext<'_>) -> Result<Option<Value>> {
        let out = match self {
            Self::Hostname => Some(Value::String(ctx.host.hostname.clone())),
            Self::Platform => Some(Value::String(ctx.host.platform.clone())),
            Self::FirstWord => raw
                .as_str()
                .map(|s| s.split(' ').next().unwrap_or(s).to_string().into()),
            Self::AfterFirstWord => raw
                .as_str()
                .map(|s| s.split_once(' ').map_or(s, |(_, rest)| rest).to_string().into()),
            Self::WorkerFromUser => raw.as_str().map(|s| user_part(s, 2).into()),
            Self::WalletFromUser => raw.as_str().map(|s| user_part(s, 1).into()),
            Self::PcieBusSlot => raw.as_str().and_then(bus_slot).map(Value::String),
            Self::PcieBusSlotPaths { bus, slot } => {
                let bus = path::resolve(raw, bus, ctx.index)?.and_then(Value::as_u64);
                let slot = path::resolve(raw, slot, ctx.index)?.and_then(Value::as_u64);
                match (bus, slot) {
                    (Some(bus), Some(slot)) => Some(format!("{bus:02x}:{slot:02x}").into()),
                    _ => None,
                }
            }
            Self::SiSuffixed => match raw {
                Value::Number(_) => Some(raw.clone()),
                Value::String(s) => si_suffixed(s).map(Value::from),
                _ => None,
            },
            Self::Pow10 { value, exponent } => {
                let value = path::resolve(raw, value, ctx.index)?.and_then(metric_number);
                let exponent = path::resolve(raw, exponent, ctx.index)?.and_then(metric_number);
                match (value, exponent) {
                    (Some(value), Some(exponent)) if exponent > 0.0 => {
                        let power = exponent.log10().round() as i32;
                        Some(Value::from(value * 10f64.powi(power)))
                    }
                    _ => None,
                }
            }
            Self::OnlyPositive => metric_number(raw)
                .filter(|n| *n > 0.0)
                .map(|_| raw.clone()),
        };
        Ok(out)
    }
}

fn user_part(user: &str, group: usize) -> String {
    USER_FIELD
        .captures(user)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn bus_slot(value: &str) -> Option<String> {
    let (bus, slot) = value.split_once(':')?;
    if slot.contains(':') {
        return None;
    }
    Some(format!("{bus:0>2}:{slot:0>2}"))
}

fn si_suffixed(value: &str) -> Option<f64> {
    let caps = SI_SUFFIXED.captures(value)?;
    let number: f64 = caps.get(1)?.as_str().parse().ok()?;
    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(suffix) => match suffix.as_str() {
            "k" => 1e3,
            "m" => 1e6,
            "g" => 1e9,
            "t" => 1e12,
            _ => return None,
        },
        None => 1.0,
    };
    Some(number * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::descriptor::HostInfo;
    use serde_json::json;

    fn host() -> HostInfo {
        HostInfo::new("rig-01", "Linux")
    }

    fn apply(transform: &Transform, raw: Value) -> Option<Value> {
        let host = host();
        transform.apply(&raw, &ResolveContext::top_level(&host)).unwrap()
    }

    #[test]
    fn test_host_transforms_ignore_input() {
        assert_eq!(apply(&Transform::Hostname, json!({"a": 1})), Some(json!("rig-01")));
        assert_eq!(apply(&Transform::Platform, json!(null)), Some(json!("Linux")));
    }

    #[test]
    fn test_word_splitting() {
        assert_eq!(apply(&Transform::FirstWord, json!("NVIDIA RTX 3070")), Some(json!("NVIDIA")));
        assert_eq!(apply(&Transform::AfterFirstWord, json!("lolMiner 1.42")), Some(json!("1.42")));
        assert_eq!(apply(&Transform::AfterFirstWord, json!("1.42")), Some(json!("1.42")));
        assert_eq!(apply(&Transform::FirstWord, json!(3)), None);
    }

    #[test]
    fn test_user_field_parts() {
        assert_eq!(apply(&Transform::WorkerFromUser, json!("0xabc.rig7")), Some(json!("rig7")));
        assert_eq!(apply(&Transform::WalletFromUser, json!("0xabc.rig7")), Some(json!("0xabc")));
        assert_eq!(apply(&Transform::WorkerFromUser, json!("0xabc")), Some(json!("")));
        assert_eq!(apply(&Transform::WalletFromUser, json!("0xabc")), Some(json!("")));
    }

    #[test]
    fn test_pcie_bus_slot() {
        assert_eq!(apply(&Transform::PcieBusSlot, json!("1:0")), Some(json!("01:00")));
        assert_eq!(apply(&Transform::PcieBusSlot, json!("2b:00")), Some(json!("2b:00")));
        assert_eq!(apply(&Transform::PcieBusSlot, json!("garbage")), None);
    }

    #[test]
    fn test_pcie_bus_slot_paths_per_device() {
        let raw = json!({"bus": [1, 43], "slot": [0, 0]});
        let transform = Transform::pcie_bus_slot_paths("bus[i]", "slot[i]");
        let host = host();
        let out = transform
            .apply(&raw, &ResolveContext::device(&host, 1))
            .unwrap();
        assert_eq!(out, Some(json!("2b:00")));
    }

    #[test]
    fn test_si_suffixed_uses_powers_of_thousand() {
        assert_eq!(apply(&Transform::SiSuffixed, json!("2 k")), Some(json!(2000.0)));
        assert_eq!(apply(&Transform::SiSuffixed, json!("4.5M")), Some(json!(4.5e6)));
        assert_eq!(apply(&Transform::SiSuffixed, json!(" 3 G ")), Some(json!(3e9)));
        assert_eq!(apply(&Transform::SiSuffixed, json!("1t")), Some(json!(1e12)));
        assert_eq!(apply(&Transform::SiSuffixed, json!("17")), Some(json!(17.0)));
        assert_eq!(apply(&Transform::SiSuffixed, json!(12)), Some(json!(12)));
        assert_eq!(apply(&Transform::SiSuffixed, json!("4 P")), None);
    }

    #[test]
    fn test_pow10_scales_by_rounded_exponent() {
        let raw = json!({"Total_Performance": 61.5, "Performance_Factor": 1_000_000});
        let out = apply(&Transform::pow10("Total_Performance", "Performance_Factor"), raw);
        assert_eq!(out, Some(json!(61.5e6)));

        let raw = json!({"Total_Performance": 2.0, "Performance_Factor": 0});
        assert_eq!(apply(&Transform::pow10("Total_Performance", "Performance_Factor"), raw), None);

        let raw = json!({"Performance_Factor": 1000});
        assert_eq!(apply(&Transform::pow10("Total_Performance", "Performance_Factor"), raw), None);
    }

    #[test]
    fn test_only_positive() {
        assert_eq!(apply(&Transform::OnlyPositive, json!(-5)), None);
        assert_eq!(apply(&Transform::OnlyPositive, json!(0)), None);
        assert_eq!(apply(&Transform::OnlyPositive, json!(42)), Some(json!(42)));
    }
}
