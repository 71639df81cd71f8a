//! Diagnostic findings and their aggregation
//!
//! Findings are facts, not prose: a severity, a stable code, and a path into
//! the object. Rendering a code into text is the consumer's job.

use serde::Serialize;

/// Finding severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory; does not affect validity
    Warning,
    /// Makes the object invalid
    Error,
}

/// Stable diagnostic identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FindingCode {
    /// No service, registry entry or service entry matches the host
    HostUnresolved,
    /// The host names a namespace the caller does not know about
    UnknownNamespace,
    /// No workload carries every label of a subset
    SubsetUnmatched,
    /// A subset declares no labels
    SubsetNoLabels,
}

impl FindingCode {
    /// Identifier handed to the message catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HostUnresolved => "destinationrules.nodest.matchingregistry",
            Self::UnknownNamespace => "destinationrules.nodest.unknownnamespace",
            Self::SubsetUnmatched => "destinationrules.nodest.subsetlabels",
            Self::SubsetNoLabels => "destinationrules.nodest.subsetnolabels",
        }
    }

    /// Severity this code is always reported with
    pub fn severity(&self) -> Severity {
        match self {
            Self::SubsetNoLabels => Severity::Warning,
            Self::HostUnresolved | Self::UnknownNamespace | Self::SubsetUnmatched => {
                Severity::Error
            }
        }
    }
}

impl std::fmt::Display for FindingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FindingCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Path of the host field
pub const HOST_PATH: &str = "spec/host";

/// Path of the subset at `index`
pub fn subset_path(index: usize) -> String {
    format!("spec/subsets[{}]", index)
}

/// A single diagnostic
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Severity
    pub severity: Severity,
    /// Diagnostic code
    pub code: FindingCode,
    /// Pointer into the object (e.g. `spec/subsets[1]`)
    pub path: String,
}

impl Finding {
    /// Build a finding; severity follows from the code
    pub fn new(code: FindingCode, path: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            path: path.into(),
        }
    }

    /// Check if this finding invalidates the object
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Findings for one object plus the overall verdict
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Findings, host finding first then subsets in declaration order
    pub findings: Vec<Finding>,
    /// True iff no finding has Error severity
    pub valid: bool,
}

impl ValidationReport {
    /// Concatenate host and subset findings and derive validity
    pub fn aggregate(host: Option<Finding>, subsets: Vec<Finding>) -> Self {
        let findings: Vec<Finding> = host.into_iter().chain(subsets).collect();
        let valid = !findings.iter().any(Finding::is_error);
        Self { findings, valid }
    }

    /// Number of Error findings
    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }

    /// Number of Warning findings
    pub fn warning_count(&self) -> usize {
        self.findings.len() - self.error_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            FindingCode::HostUnresolved.as_str(),
            "destinationrules.nodest.matchingregistry"
        );
        assert_eq!(
            FindingCode::SubsetUnmatched.as_str(),
            "destinationrules.nodest.subsetlabels"
        );
        assert_eq!(
            FindingCode::SubsetNoLabels.as_str(),
            "destinationrules.nodest.subsetnolabels"
        );
        assert_ne!(
            FindingCode::UnknownNamespace.as_str(),
            FindingCode::HostUnresolved.as_str()
        );
    }

    #[test]
    fn only_empty_label_subsets_are_warnings() {
        assert_eq!(FindingCode::SubsetNoLabels.severity(), Severity::Warning);
        assert_eq!(FindingCode::SubsetUnmatched.severity(), Severity::Error);
        assert_eq!(FindingCode::UnknownNamespace.severity(), Severity::Error);
    }

    #[test]
    fn empty_report_is_valid() {
        let report = ValidationReport::aggregate(None, vec![]);
        assert!(report.valid);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let report = ValidationReport::aggregate(
            None,
            vec![Finding::new(FindingCode::SubsetNoLabels, subset_path(0))],
        );
        assert!(report.valid);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn host_finding_precedes_subset_findings() {
        let report = ValidationReport::aggregate(
            Some(Finding::new(FindingCode::HostUnresolved, HOST_PATH)),
            vec![
                Finding::new(FindingCode::SubsetNoLabels, subset_path(0)),
                Finding::new(FindingCode::SubsetUnmatched, subset_path(1)),
            ],
        );
        assert!(!report.valid);
        let paths: Vec<_> = report.findings.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["spec/host", "spec/subsets[0]", "spec/subsets[1]"]);
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn serializes_code_as_identifier() {
        let finding = Finding::new(FindingCode::SubsetUnmatched, subset_path(2));
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["code"], "destinationrules.nodest.subsetlabels");
        assert_eq!(json["path"], "spec/subsets[2]");
    }
}
