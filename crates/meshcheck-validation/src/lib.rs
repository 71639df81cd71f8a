//! Routing validation for meshcheck
//!
//! Checks that DestinationRules point at something reachable and that their
//! subsets select live workloads, and classifies VirtualServices by the
//! traffic-management features they use:
//!
//! - **Host**: classifies destination hosts (short, namespace-qualified,
//!   wildcard, external)
//! - **Resolve**: ordered host resolution strategies
//! - **Subsets**: subset label matching against workloads
//! - **Report**: findings and per-object verdicts
//! - **Checker**: per-object and batch DestinationRule checks
//! - **Classify**: VirtualService capability flags
//!
//! Everything here is a pure function over in-memory inputs.

#![deny(missing_docs)]

pub mod checker;
pub mod classify;
pub mod duration;
pub mod host;
pub mod inventory;
pub mod labels;
pub mod report;
pub mod resolve;
pub mod subsets;

pub use checker::{
    validate_destination_rules, BatchReport, BatchSummary, DestinationRuleChecker,
    DestinationRuleResult,
};
pub use classify::CapabilitySet;
pub use host::ResolverConfig;
pub use inventory::{Inventory, ResolutionContext, ServiceRecord, WorkloadRecord};
pub use report::{Finding, FindingCode, Severity, ValidationReport};
pub use resolve::{HostMatch, HostResolver};
