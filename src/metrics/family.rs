//! Metric families and the accumulator that fills them during a poll.

use crate::error::{ExporterError, Result};
use crate::metrics::descriptor::{LabelSet, MetricDescriptor, MetricKind, ResolveContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix applied to every exported family name.
pub const NAMESPACE: &str = "mining";

/// One timestamped observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Label values in the order of the family's label names
    pub label_values: Vec<String>,
    pub value: f64,
    /// Unix timestamp in milliseconds
    pub timestamp_ms: i64,
}

/// A named series of samples sharing one label schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFamily {
    pub name: String,
    pub kind: MetricKind,
    pub help: String,
    pub label_names: Vec<String>,
    pub samples: Vec<Sample>,
}

/// Binds a descriptor to the family it fills for the current poll.
#[derive(Debug)]
pub struct FamilyAccumulator<'d> {
    descriptor: &'d MetricDescriptor,
    family: MetricFamily,
}

impl<'d> FamilyAccumulator<'d> {
    /// Create an empty family with a frozen label list.
    pub fn new(descriptor: &'d MetricDescriptor, label_names: Vec<String>) -> Self {
        Self {
            descriptor,
            family: MetricFamily {
                name: format!("{NAMESPACE}_{}", descriptor.name),
                kind: descriptor.kind,
                help: descriptor.help.clone(),
                label_names,
                samples: Vec::new(),
            },
        }
    }

    /// Resolve the descriptor's value against `base` and record it under
    /// `labels`.
    ///
    /// Absent or suppressed values add nothing. A label set that does not
    /// match the frozen label names is a table bug and is reported as
    /// [`ExporterError::LabelMismatch`].
    pub fn add_value(
        &mut self,
        base: &Value,
        labels: &LabelSet,
        timestamp_ms: i64,
        ctx: &ResolveContext<'_>,
    ) -> Result<()> {
        let Some(value) = self.descriptor.evaluate(base, ctx)? else {
            return Ok(());
        };

        if !labels.names().eq(self.family.label_names.iter().map(String::as_str)) {
            return Err(ExporterError::LabelMismatch {
                family: self.family.name.clone(),
                expected: self.family.label_names.clone(),
                found: labels.names().map(str::to_string).collect(),
            });
        }

        self.family.samples.push(Sample {
            label_values: labels.values().map(str::to_string).collect(),
            value,
            timestamp_ms,
        });
        Ok(())
    }

    pub fn family(&self) -> &MetricFamily {
        &self.family
    }

    pub fn into_family(self) -> MetricFamily {
        self.family
    }
}
