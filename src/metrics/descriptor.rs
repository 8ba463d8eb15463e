//! Declarative label and metric descriptors and the value pipeline that
//! evaluates them.

use crate::error::Result;
use crate::metrics::path;
use crate::metrics::transform::Transform;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sysinfo::System;

/// Identity of the machine the exporter runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub hostname: String,
    pub platform: String,
}

impl HostInfo {
    pub fn new(hostname: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            platform: platform.into(),
        }
    }

    /// Detect the local host, optionally replacing the reported hostname.
    pub fn detect(hostname_override: Option<String>) -> Self {
        let hostname = hostname_override
            .or_else(System::host_name)
            .unwrap_or_else(|| "unknown".to_string());
        Self::new(hostname, platform_name(std::env::consts::OS))
    }
}

/// Operating system family as miners and dashboards usually spell it.
fn platform_name(os: &str) -> String {
    match os {
        "linux" => "Linux".to_string(),
        "windows" => "Windows".to_string(),
        "macos" => "Darwin".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        other => other.to_string(),
    }
}

/// Everything a descriptor needs besides the document itself.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub host: &'a HostInfo,
    /// Position of the device being resolved, if any.
    pub index: Option<usize>,
}

impl<'a> ResolveContext<'a> {
    pub fn top_level(host: &'a HostInfo) -> Self {
        Self { host, index: None }
    }

    pub fn device(host: &'a HostInfo, index: usize) -> Self {
        Self {
            host,
            index: Some(index),
        }
    }
}

/// How a label value is obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelSource {
    /// A fixed literal.
    Direct(String),
    /// A single path expression.
    Path(String),
    /// Several paths joined by a single space; absent parts become empty tokens.
    Join(Vec<String>),
    /// The first alternative that is neither absent nor an empty string.
    Coalesce(Vec<LabelDescriptor>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelDescriptor {
    pub name: String,
    pub source: LabelSource,
    pub transform: Option<Transform>,
}

impl LabelDescriptor {
    fn new(name: impl Into<String>, source: LabelSource) -> Self {
        Self {
            name: name.into(),
            source,
            transform: None,
        }
    }

    pub fn direct(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, LabelSource::Direct(value.into()))
    }

    pub fn path(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, LabelSource::Path(path.into()))
    }

    pub fn join<I, S>(name: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            LabelSource::Join(paths.into_iter().map(Into::into).collect()),
        )
    }

    pub fn coalesce(name: impl Into<String>, alternatives: Vec<LabelDescriptor>) -> Self {
        Self::new(name, LabelSource::Coalesce(alternatives))
    }

    /// A label computed from the host rather than the document.
    pub fn host(name: impl Into<String>, transform: Transform) -> Self {
        Self::path(name, path::WHOLE_DOCUMENT).with_transform(transform)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Run the strategy and the optional transform. `Ok(None)` is a
    /// suppressed value.
    pub fn resolve(&self, base: &Value, ctx: &ResolveContext<'_>) -> Result<Option<Value>> {
        let raw = match &self.source {
            LabelSource::Direct(value) => Some(Value::String(value.clone())),
            LabelSource::Path(expr) => path::resolve(base, expr, ctx.index)?.cloned(),
            LabelSource::Join(exprs) => {
                let mut tokens = Vec::with_capacity(exprs.len());
                for expr in exprs {
                    let token = path::resolve(base, expr, ctx.index)?
                        .map(|v| label_text(Some(v)))
                        .unwrap_or_default();
                    tokens.push(token);
                }
                Some(Value::String(tokens.join(" ")))
            }
            LabelSource::Coalesce(alternatives) => {
                let mut chosen = None;
                for alternative in alternatives {
                    match alternative.resolve(base, ctx)? {
                        Some(Value::String(s)) if s.is_empty() => continue,
                        Some(value) => {
                            chosen = Some(value);
                            break;
                        }
                        None => continue,
                    }
                }
                chosen
            }
        };

        match (raw, &self.transform) {
            (Some(raw), Some(transform)) => transform.apply(&raw, ctx),
            (raw, _) => Ok(raw),
        }
    }
}

/// Render a resolved value as label text.
pub fn label_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::Bool(false)) => "false".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Coerce a resolved value to a sample value.
pub fn metric_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Ordered label names and values for one sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    pairs: Vec<(String, String)>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a whole label table in declaration order.
    pub fn resolve(
        descriptors: &[LabelDescriptor],
        base: &Value,
        ctx: &ResolveContext<'_>,
    ) -> Result<Self> {
        let mut set = Self::new();
        for descriptor in descriptors {
            let value = descriptor.resolve(base, ctx)?;
            set.push(descriptor.name.clone(), label_text(value.as_ref()));
        }
        Ok(set)
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Append another set after this one.
    pub fn merged(mut self, other: LabelSet) -> Self {
        self.pairs.extend(other.pairs);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(_, value)| value.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub name: String,
    pub kind: MetricKind,
    pub help: String,
    pub value_path: String,
    pub transform: Option<Transform>,
}

impl MetricDescriptor {
    fn new(
        kind: MetricKind,
        name: impl Into<String>,
        help: impl Into<String>,
        value_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            help: help.into(),
            value_path: value_path.into(),
            transform: None,
        }
    }

    pub fn counter(
        name: impl Into<String>,
        help: impl Into<String>,
        value_path: impl Into<String>,
    ) -> Self {
        Self::new(MetricKind::Counter, name, help, value_path)
    }

    pub fn gauge(
        name: impl Into<String>,
        help: impl Into<String>,
        value_path: impl Into<String>,
    ) -> Self {
        Self::new(MetricKind::Gauge, name, help, value_path)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Resolve, transform and coerce the sample value. `Ok(None)` means no
    /// sample for this poll.
    pub fn evaluate(&self, base: &Value, ctx: &ResolveContext<'_>) -> Result<Option<f64>> {
        let Some(raw) = path::resolve(base, &self.value_path, ctx.index)? else {
            return Ok(None);
        };
        let value = match &self.transform {
            Some(transform) => match transform.apply(raw, ctx)? {
                Some(value) => value,
                None => return Ok(None),
            },
            None => raw.clone(),
        };
        Ok(metric_number(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn host() -> HostInfo {
        HostInfo::new("rig-01", "Linux")
    }

    #[test]
    fn test_absent_path_suppresses() {
        let host = host();
        let ctx = ResolveContext::top_level(&host);
        let doc = json!({"version": "0.26.8"});

        let label = LabelDescriptor::path("coin", "coin");
        assert_eq!(label.resolve(&doc, &ctx).unwrap(), None);

        let metric = MetricDescriptor::counter("shares_accepted", "accepted", "accepted_count");
        assert_eq!(metric.evaluate(&doc, &ctx).unwrap(), None);
    }

    #[test]
    fn test_direct_ignores_document() {
        let host = host();
        let label = LabelDescriptor::direct("miner", "t-rex");
        let out = label
            .resolve(&Value::Null, &ResolveContext::top_level(&host))
            .unwrap();
        assert_eq!(out, Some(json!("t-rex")));
    }

    #[test]
    fn test_coalesce_skips_empty_and_null() {
        let host = host();
        let doc = json!({"empty": "", "nothing": null, "x": "X"});
        let label = LabelDescriptor::coalesce(
            "worker",
            vec![
                LabelDescriptor::path("a", "empty"),
                LabelDescriptor::path("b", "nothing"),
                LabelDescriptor::path("c", "x"),
            ],
        );
        let out = label.resolve(&doc, &ResolveContext::top_level(&host)).unwrap();
        assert_eq!(out, Some(json!("X")));
    }

    #[test]
    fn test_coalesce_with_no_candidate_is_null() {
        let host = host();
        let doc = json!({"empty": ""});
        let label = LabelDescriptor::coalesce(
            "worker",
            vec![
                LabelDescriptor::path("a", "empty"),
                LabelDescriptor::path("b", "missing"),
            ],
        );
        let out = label.resolve(&doc, &ResolveContext::top_level(&host)).unwrap();
        assert_eq!(out, None);
        assert_eq!(label_text(out.as_ref()), "null");
    }

    #[test]
    fn test_coalesce_applies_alternative_transforms() {
        let host = host();
        let doc = json!({"Algorithms": [{"Worker": "", "User": "0xabc.rig9"}]});
        let label = LabelDescriptor::coalesce(
            "worker",
            vec![
                LabelDescriptor::path("worker", "Algorithms[0].Worker"),
                LabelDescriptor::path("worker", "Algorithms[0].User")
                    .with_transform(Transform::WorkerFromUser),
            ],
        );
        let out = label.resolve(&doc, &ResolveContext::top_level(&host)).unwrap();
        assert_eq!(out, Some(json!("rig9")));
    }

    #[test]
    fn test_join_keeps_empty_token_for_absent_part() {
        let host = host();
        let doc = json!({"a": "foo"});
        let label = LabelDescriptor::join("ab", ["a", "b"]);
        let out = label.resolve(&doc, &ResolveContext::top_level(&host)).unwrap();
        assert_eq!(out, Some(json!("foo ")));
    }

    #[test]
    fn test_join_stringifies_numbers() {
        let host = host();
        let doc = json!({"version": "0.26.8", "build": 3});
        let label = LabelDescriptor::join("release", ["version", "build"]);
        let out = label.resolve(&doc, &ResolveContext::top_level(&host)).unwrap();
        assert_eq!(out, Some(json!("0.26.8 3")));
    }

    #[test]
    fn test_transform_skipped_for_absent_value() {
        let host = host();
        let label = LabelDescriptor::path("wallet", "Algorithms[0].User")
            .with_transform(Transform::WalletFromUser);
        let out = label
            .resolve(&json!({}), &ResolveContext::top_level(&host))
            .unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn test_host_labels() {
        let host = host();
        let ctx = ResolveContext::top_level(&host);
        let doc = json!({});
        let labels = LabelSet::resolve(
            &[
                LabelDescriptor::host("host", Transform::Hostname),
                LabelDescriptor::host("platform", Transform::Platform),
            ],
            &doc,
            &ctx,
        )
        .unwrap();
        assert_eq!(labels.get("host"), Some("rig-01"));
        assert_eq!(labels.get("platform"), Some("Linux"));
    }

    #[test]
    fn test_label_text_rules() {
        assert_eq!(label_text(None), "null");
        assert_eq!(label_text(Some(&json!(null))), "null");
        assert_eq!(label_text(Some(&json!(true))), "true");
        assert_eq!(label_text(Some(&json!(false))), "false");
        assert_eq!(label_text(Some(&json!("abc"))), "abc");
        assert_eq!(label_text(Some(&json!(7))), "7");
        assert_eq!(label_text(Some(&json!(1.5))), "1.5");
    }

    #[test]
    fn test_metric_number_coercion() {
        assert_eq!(metric_number(&json!(5)), Some(5.0));
        assert_eq!(metric_number(&json!(2.5)), Some(2.5));
        assert_eq!(metric_number(&json!(true)), Some(1.0));
        assert_eq!(metric_number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(metric_number(&json!("n/a")), None);
        assert_eq!(metric_number(&json!([1])), None);
    }

    #[test]
    fn test_metric_transform_suppresses() {
        let host = host();
        let ctx = ResolveContext::top_level(&host);
        let metric = MetricDescriptor::gauge("temp", "temperature", "t")
            .with_transform(Transform::OnlyPositive);
        assert_eq!(metric.evaluate(&json!({"t": -5}), &ctx).unwrap(), None);
        assert_eq!(metric.evaluate(&json!({"t": 42}), &ctx).unwrap(), Some(42.0));
    }

    #[test]
    fn test_label_set_merge_keeps_order() {
        let mut top = LabelSet::new();
        top.push("host", "rig");
        top.push("miner", "t-rex");
        let mut device = LabelSet::new();
        device.push("device_name", "RTX 3070");

        let merged = top.merged(device);
        let names: Vec<_> = merged.names().collect();
        assert_eq!(names, ["host", "miner", "device_name"]);
        assert_eq!(merged.len(), 3);
    }
}
