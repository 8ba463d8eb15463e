//! The metric assembly engine.
//!
//! A poll moves a fetched JSON snapshot through the path resolver, the value
//! pipeline and the family accumulators, producing one [`MetricFamily`] per
//! metric descriptor.

pub mod collector;
pub mod descriptor;
pub mod family;
pub mod fetch;
pub mod path;
pub mod transform;

// Re-export commonly used items
pub use collector::{JsonCollector, MinerCollector, NoSupportedMiner};
pub use descriptor::{HostInfo, LabelDescriptor, LabelSet, MetricDescriptor, MetricKind};
pub use family::{MetricFamily, Sample};
pub use transform::Transform;
