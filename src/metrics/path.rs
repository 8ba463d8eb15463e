//! Path expressions over miner JSON documents.
//!
//! A path is a dot separated list of segments. Each segment is an optional
//! object key followed by any number of bracketed selectors: `[N]` picks an
//! array element and `[i]` picks the element of the device currently being
//! resolved. `Algorithms[0].Worker_Accepted[i]` and `gpus` are both valid.
//! The path `.` on its own selects the whole document.

use crate::error::{ExporterError, Result};
use serde_json::Value;

/// Path selecting the whole document.
pub const WHOLE_DOCUMENT: &str = ".";

/// Selector replaced by the device index.
const DEVICE_PLACEHOLDER: &str = "i";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step<'p> {
    Key(&'p str),
    Index(usize),
    Device,
}

fn parse(path: &str) -> Result<Vec<Step<'_>>> {
    if path.is_empty() {
        return Err(ExporterError::descriptor_error("empty path expression"));
    }

    let mut steps = Vec::new();
    for segment in path.split('.') {
        let (key, mut rest) = match segment.find('[') {
            Some(pos) => segment.split_at(pos),
            None => (segment, ""),
        };
        if key.contains(']') {
            return Err(ExporterError::descriptor_error(format!(
                "unbalanced bracket in path `{path}`"
            )));
        }
        if key.is_empty() && rest.is_empty() {
            return Err(ExporterError::descriptor_error(format!(
                "empty segment in path `{path}`"
            )));
        }
        if !key.is_empty() {
            steps.push(Step::Key(key));
        }

        while !rest.is_empty() {
            let inner = rest
                .strip_prefix('[')
                .and_then(|r| r.split_once(']'))
                .ok_or_else(|| {
                    ExporterError::descriptor_error(format!("malformed selector in path `{path}`"))
                })?;
            let (selector, tail) = inner;
            if selector == DEVICE_PLACEHOLDER {
                steps.push(Step::Device);
            } else {
                let index = selector.parse::<usize>().map_err(|_| {
                    ExporterError::descriptor_error(format!(
                        "selector `[{selector}]` in path `{path}` is neither an index nor `[i]`"
                    ))
                })?;
                steps.push(Step::Index(index));
            }
            rest = tail;
        }
    }

    Ok(steps)
}

/// Resolve `path` against `root`.
///
/// Returns `Ok(None)` when any step is missing, out of range, or lands on
/// `null`. Fails only when the path itself is malformed, or uses `[i]` while
/// no device index is in scope.
pub fn resolve<'v>(root: &'v Value, path: &str, index: Option<usize>) -> Result<Option<&'v Value>> {
    if path == WHOLE_DOCUMENT {
        return Ok(present(root));
    }

    let steps = parse(path)?;
    if index.is_none() && steps.contains(&Step::Device) {
        return Err(ExporterError::descriptor_error(format!(
            "path `{path}` uses a device placeholder outside of a device context"
        )));
    }

    let mut current = root;
    for step in steps {
        let next = match step {
            Step::Key(key) => current.as_object().and_then(|map| map.get(key)),
            Step::Index(i) => current.as_array().and_then(|items| items.get(i)),
            Step::Device => index.and_then(|i| current.as_array().and_then(|items| items.get(i))),
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }

    Ok(present(current))
}

fn present(value: &Value) -> Option<&Value> {
    if value.is_null() {
        None
    } else {
        Some(value)
    }
}
