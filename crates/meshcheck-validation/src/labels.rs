//! Label selector matching
//!
//! One primitive serves subset matching and service selectors: every
//! selector pair must be present with an equal value, extra labels on the
//! candidate are ignored.

use std::collections::BTreeMap;

/// Check if `labels` carries every key/value pair in `selector`.
///
/// An empty selector matches everything.
pub fn selector_matches(
    selector: &BTreeMap<String, String>,
    labels: &BTreeMap<String, String>,
) -> bool {
    selector
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}
