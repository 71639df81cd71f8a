//! Istio DestinationRule

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{HasApiResource, ObjectMeta};

/// Istio DestinationRule: policies applied to traffic for one host
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRule {
    /// API version
    #[serde(default = "DestinationRule::api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "DestinationRule::kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: DestinationRuleSpec,
}

impl HasApiResource for DestinationRule {
    const API_VERSION: &'static str = "networking.istio.io/v1beta1";
    const KIND: &'static str = "DestinationRule";
}

impl DestinationRule {
    fn api_version() -> String {
        <Self as HasApiResource>::API_VERSION.to_string()
    }
    fn kind() -> String {
        <Self as HasApiResource>::KIND.to_string()
    }

    /// Create a DestinationRule for `host` with no subsets
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata: ObjectMeta::new(name, namespace),
            spec: DestinationRuleSpec {
                host: host.into(),
                subsets: vec![],
                traffic_policy: None,
                export_to: vec![],
            },
        }
    }

    /// Append a subset
    pub fn with_subset<'a>(
        mut self,
        name: impl Into<String>,
        labels: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        self.spec.subsets.push(Subset::new(name, labels));
        self
    }

    /// Namespace the rule lives in
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }
}

/// DestinationRule spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRuleSpec {
    /// Destination host the rule applies to
    pub host: String,
    /// Named label-selector subsets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsets: Vec<Subset>,
    /// Traffic policy, carried but not inspected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_policy: Option<serde_json::Value>,
    /// Namespaces the rule is exported to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub export_to: Vec<String>,
}

/// Named subset of a destination's workloads
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subset {
    /// Subset name
    pub name: String,
    /// Workload label selector (may be empty)
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Subset-level traffic policy, carried but not inspected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_policy: Option<serde_json::Value>,
}

impl Subset {
    /// Create a subset from label pairs
    pub fn new<'a>(
        name: impl Into<String>,
        labels: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            name: name.into(),
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            traffic_policy: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let json = serde_json::json!({
            "metadata": {"name": "reviews", "namespace": "bookinfo"},
            "spec": {
                "host": "reviews",
                "subsets": [
                    {"name": "v1", "labels": {"version": "v1"}},
                    {"name": "all"}
                ]
            }
        });
        let dr: DestinationRule = serde_json::from_value(json).unwrap();
        assert_eq!(dr.kind, "DestinationRule");
        assert_eq!(dr.api_version, "networking.istio.io/v1beta1");
        assert_eq!(dr.spec.subsets.len(), 2);
        assert!(dr.spec.subsets[1].labels.is_empty());
    }

    #[test]
    fn builder_appends_subsets_in_order() {
        let dr = DestinationRule::new("reviews", "bookinfo", "reviews")
            .with_subset("v1", [("version", "v1")])
            .with_subset("v2", [("version", "v2")]);
        let names: Vec<_> = dr.spec.subsets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["v1", "v2"]);
        assert_eq!(dr.namespace(), "bookinfo");
    }

    #[test]
    fn missing_host_is_rejected() {
        let json = serde_json::json!({
            "metadata": {"name": "reviews"},
            "spec": {"subsets": []}
        });
        assert!(serde_json::from_value::<DestinationRule>(json).is_err());
    }
}
