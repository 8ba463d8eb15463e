//! Prometheus text exposition format.
//!
//! Renders metric families into the text format (version 0.0.4) understood
//! by Prometheus and compatible scrapers.

use crate::metrics::descriptor::MetricKind;
use crate::metrics::family::MetricFamily;
use std::fmt::Write;

/// Content type of the rendered text.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render metric families into Prometheus text format.
///
/// Counter samples are exposed with a `_total` suffix. Families without
/// samples still declare their HELP and TYPE lines.
pub fn render(families: &[MetricFamily]) -> String {
    let mut out = String::new();

    for family in families {
        let _ = writeln!(out, "# HELP {} {}", family.name, escape_help(&family.help));
        let _ = writeln!(out, "# TYPE {} {}", family.name, family.kind.as_str());

        let sample_name = match family.kind {
            MetricKind::Counter if !family.name.ends_with("_total") => format!("{}_total", family.name),
            _ => family.name.clone(),
        };

        for sample in &family.samples {
            out.push_str(&sample_name);
            if !family.label_names.is_empty() {
                out.push('{');
                for (i, (name, value)) in family
                    .label_names
                    .iter()
                    .zip(&sample.label_values)
                    .enumerate()
                {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{}=\"{}\"", name, escape_label_value(value));
                }
                out.push('}');
            }
            let _ = writeln!(out, " {} {}", format_value(sample.value), sample.timestamp_ms);
        }
    }

    out
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::family::Sample;

    fn family(kind: MetricKind, name: &str, samples: Vec<Sample>) -> MetricFamily {
        MetricFamily {
            name: name.to_string(),
            kind,
            help: "number of accepted shares".to_string(),
            label_names: vec!["host".to_string(), "miner".to_string()],
            samples,
        }
    }

    fn sample(host: &str, value: f64) -> Sample {
        Sample {
            label_values: vec![host.to_string(), "t-rex".to_string()],
            value,
            timestamp_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn render_empty_family() {
        let output = render(&[family(MetricKind::Gauge, "mining_hashrate", vec![])]);
        assert!(output.contains("# HELP mining_hashrate number of accepted shares"));
        assert!(output.contains("# TYPE mining_hashrate gauge"));
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn render_counter_adds_total_suffix() {
        let output = render(&[family(
            MetricKind::Counter,
            "mining_shares_accepted",
            vec![sample("rig", 5.0)],
        )]);
        assert!(output.contains("# TYPE mining_shares_accepted counter"));
        assert!(output
            .contains("mining_shares_accepted_total{host=\"rig\",miner=\"t-rex\"} 5 1700000000000"));
    }

    #[test]
    fn render_escapes_label_values() {
        let output = render(&[family(
            MetricKind::Gauge,
            "mining_hashrate",
            vec![sample("a\"b\\c\nd", 1.5)],
        )]);
        assert!(output.contains(r#"host="a\"b\\c\nd""#));
        assert!(output.contains(" 1.5 "));
    }

    #[test]
    fn render_special_values() {
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(61500000.0), "61500000");
    }

    #[test]
    fn render_unlabeled_family() {
        let mut fam = family(MetricKind::Gauge, "mining_gpu_count", vec![]);
        fam.label_names.clear();
        fam.samples.push(Sample {
            label_values: vec![],
            value: 2.0,
            timestamp_ms: 10,
        });
        let output = render(&[fam]);
        assert!(output.contains("\nmining_gpu_count 2 10\n"));
    }
}
