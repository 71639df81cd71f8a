//! DestinationRule checking
//!
//! Ties host resolution, subset matching and reporting together for one
//! object, and runs that over a whole set of objects against an [`Inventory`].

use std::collections::BTreeMap;

use meshcheck_common::crd::{DestinationRule, ObjectKey};
use serde::Serialize;
use tracing::{debug, info};

use crate::host::ResolverConfig;
use crate::inventory::{Inventory, ResolutionContext};
use crate::report::ValidationReport;
use crate::resolve::{HostMatch, HostResolver};
use crate::subsets::check_subsets;

/// Outcome of checking one DestinationRule
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DestinationRuleResult {
    /// Which object
    pub key: ObjectKey,
    /// How its host resolved
    pub outcome: HostMatch,
    /// Findings and verdict
    pub report: ValidationReport,
}

impl DestinationRuleResult {
    /// True iff the report has no Error findings
    pub fn is_valid(&self) -> bool {
        self.report.valid
    }
}

/// Checks DestinationRules against a resolution context
#[derive(Clone, Debug, Default)]
pub struct DestinationRuleChecker {
    resolver: HostResolver,
}

impl DestinationRuleChecker {
    /// Create a checker
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            resolver: HostResolver::new(config),
        }
    }

    /// Check one DestinationRule
    ///
    /// Subsets are only checked when the host resolved to a local Service.
    pub fn check(&self, rule: &DestinationRule, ctx: &ResolutionContext) -> DestinationRuleResult {
        let resolution = self.resolver.resolve(rule, ctx);
        let subset_findings = if resolution.outcome.is_local() {
            check_subsets(rule, ctx)
        } else {
            Vec::new()
        };

        DestinationRuleResult {
            key: ObjectKey::of::<DestinationRule>(&rule.metadata),
            outcome: resolution.outcome,
            report: ValidationReport::aggregate(resolution.finding, subset_findings),
        }
    }
}

/// Counts over a batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Objects checked
    pub checked: usize,
    /// Objects without Error findings
    pub valid: usize,
    /// Error findings across all objects
    pub errors: usize,
    /// Warning findings across all objects
    pub warnings: usize,
}

/// Results of a batch pass, ordered by [`ObjectKey`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// One result per object
    pub results: Vec<DestinationRuleResult>,
    /// Totals
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Look up the result for one object
    pub fn get(&self, key: &ObjectKey) -> Option<&DestinationRuleResult> {
        self.results
            .binary_search_by(|result| result.key.cmp(key))
            .ok()
            .map(|index| &self.results[index])
    }

    /// True iff every object is valid
    pub fn all_valid(&self) -> bool {
        self.summary.valid == self.summary.checked
    }
}

/// Check every rule against the slice of `inventory` visible from its
/// namespace
///
/// A later rule with the same key replaces an earlier one.
pub fn validate_destination_rules<'a>(
    rules: impl IntoIterator<Item = &'a DestinationRule>,
    inventory: &Inventory,
    config: &ResolverConfig,
) -> BatchReport {
    let checker = DestinationRuleChecker::new(config.clone());
    let mut contexts: BTreeMap<String, ResolutionContext> = BTreeMap::new();
    let mut results: BTreeMap<ObjectKey, DestinationRuleResult> = BTreeMap::new();

    for rule in rules {
        let namespace = rule.namespace();
        let ctx = contexts
            .entry(namespace.to_string())
            .or_insert_with(|| inventory.context_for(namespace));
        let result = checker.check(rule, ctx);
        if !result.is_valid() {
            debug!(object = %result.key, errors = result.report.error_count(), "invalid");
        }
        results.insert(result.key.clone(), result);
    }

    let results: Vec<DestinationRuleResult> = results.into_values().collect();
    let summary = BatchSummary {
        checked: results.len(),
        valid: results.iter().filter(|r| r.is_valid()).count(),
        errors: results.iter().map(|r| r.report.error_count()).sum(),
        warnings: results.iter().map(|r| r.report.warning_count()).sum(),
    };
    info!(
        checked = summary.checked,
        valid = summary.valid,
        errors = summary.errors,
        warnings = summary.warnings,
        "validated destination rules"
    );

    BatchReport { results, summary }
}
