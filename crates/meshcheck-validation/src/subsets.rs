//! Subset matching
//!
//! Each subset of a locally-resolved DestinationRule must select at least one
//! live workload. Every subset is checked; findings come back in declaration
//! order.

use meshcheck_common::crd::DestinationRule;
use tracing::debug;

use crate::inventory::ResolutionContext;
use crate::labels::selector_matches;
use crate::report::{subset_path, Finding, FindingCode};

/// Check every subset of `rule` against the context's workloads.
///
/// Only meaningful after the host resolved to a local service; callers skip
/// it for every other resolution since no workload inventory exists there.
pub fn check_subsets(rule: &DestinationRule, ctx: &ResolutionContext) -> Vec<Finding> {
    let findings: Vec<Finding> = rule
        .spec
        .subsets
        .iter()
        .enumerate()
        .filter_map(|(index, subset)| {
            if subset.labels.is_empty() {
                return Some(Finding::new(FindingCode::SubsetNoLabels, subset_path(index)));
            }
            let matched = ctx
                .workloads()
                .iter()
                .any(|wl| selector_matches(&subset.labels, &wl.labels));
            (!matched).then(|| Finding::new(FindingCode::SubsetUnmatched, subset_path(index)))
        })
        .collect();

    debug!(
        rule = %rule.metadata.name,
        subsets = rule.spec.subsets.len(),
        findings = findings.len(),
        "checked subsets"
    );
    findings
}
