//! Typed buckets for multi-document manifest streams
//!
//! Routing objects and inventory objects usually arrive together (a
//! `kubectl get -o yaml` dump, a GitOps directory). [`Manifests`] sorts each
//! document into a typed list by its `kind`.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::crd::{DestinationRule, ServiceEntry, VirtualService};
use crate::{yaml, Error, Result};

/// Objects found in one or more manifest streams
#[derive(Clone, Debug, Default)]
pub struct Manifests {
    /// Istio DestinationRules
    pub destination_rules: Vec<DestinationRule>,
    /// Istio VirtualServices
    pub virtual_services: Vec<VirtualService>,
    /// Istio ServiceEntries
    pub service_entries: Vec<ServiceEntry>,
    /// Kubernetes Services
    pub services: Vec<Service>,
    /// Kubernetes Namespaces
    pub namespaces: Vec<Namespace>,
    /// Kubernetes Deployments
    pub deployments: Vec<Deployment>,
    /// Kubernetes Pods
    pub pods: Vec<Pod>,
}

impl Manifests {
    /// Parse a YAML stream
    pub fn from_yaml(input: &str) -> Result<Self> {
        let mut manifests = Self::default();
        manifests.extend_from_yaml(input)?;
        Ok(manifests)
    }

    /// Parse a YAML stream and add its objects to this set
    ///
    /// `kind: List` documents (as produced by `kubectl get -o yaml`) are
    /// unwrapped. Unknown kinds are skipped.
    pub fn extend_from_yaml(&mut self, input: &str) -> Result<()> {
        for doc in yaml::parse_yaml_multi(input)? {
            self.push_value(doc)?;
        }
        Ok(())
    }

    fn push_value(&mut self, doc: Value) -> Result<()> {
        let kind = doc
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_field("kind", "document has no kind"))?
            .to_string();

        match kind.as_str() {
            "List" => {
                let items = match doc.get("items") {
                    Some(Value::Array(items)) => items.clone(),
                    Some(Value::Null) | None => vec![],
                    Some(_) => return Err(Error::invalid_field("items", "items must be a list")),
                };
                for item in items {
                    self.push_value(item)?;
                }
            }
            "DestinationRule" => self.destination_rules.push(typed(&kind, doc)?),
            "VirtualService" => self.virtual_services.push(typed(&kind, doc)?),
            "ServiceEntry" => self.service_entries.push(typed(&kind, doc)?),
            "Service" => self.services.push(typed(&kind, doc)?),
            "Namespace" => self.namespaces.push(typed(&kind, doc)?),
            "Deployment" => self.deployments.push(typed(&kind, doc)?),
            "Pod" => self.pods.push(typed(&kind, doc)?),
            other => debug!(kind = other, "skipping unsupported manifest kind"),
        }
        Ok(())
    }

    /// Fill in the namespace of routing objects that omit one
    pub fn default_namespace(&mut self, namespace: &str) {
        for dr in &mut self.destination_rules {
            dr.metadata.default_namespace(namespace);
        }
        for vs in &mut self.virtual_services {
            vs.metadata.default_namespace(namespace);
        }
        for se in &mut self.service_entries {
            se.metadata.default_namespace(namespace);
        }
    }

    /// Total number of objects loaded
    pub fn len(&self) -> usize {
        self.destination_rules.len()
            + self.virtual_services.len()
            + self.service_entries.len()
            + self.services.len()
            + self.namespaces.len()
            + self.deployments.len()
            + self.pods.len()
    }

    /// Check if nothing was loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn typed<T: DeserializeOwned>(kind: &str, doc: Value) -> Result<T> {
    serde_json::from_value(doc).map_err(|e| Error::serialization_for(kind, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKINFO: &str = r#"
apiVersion: networking.istio.io/v1beta1
kind: DestinationRule
metadata:
  name: reviews
spec:
  host: reviews
  subsets:
  - name: v1
    labels:
      version: v1
---
apiVersion: networking.istio.io/v1beta1
kind: VirtualService
metadata:
  name: reviews
  namespace: bookinfo
spec:
  hosts:
  - reviews
  http:
  - route:
    - destination:
        host: reviews
        subset: v1
---
apiVersion: v1
kind: Service
metadata:
  name: reviews
  namespace: bookinfo
  labels:
    app: reviews
spec:
  selector:
    app: reviews
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: ignored
"#;

    #[test]
    fn sorts_documents_by_kind() {
        let manifests = Manifests::from_yaml(BOOKINFO).unwrap();
        assert_eq!(manifests.destination_rules.len(), 1);
        assert_eq!(manifests.virtual_services.len(), 1);
        assert_eq!(manifests.services.len(), 1);
        assert_eq!(manifests.len(), 3);
        assert_eq!(
            manifests.services[0].metadata.name.as_deref(),
            Some("reviews")
        );
    }

    #[test]
    fn default_namespace_fills_missing_only() {
        let mut manifests = Manifests::from_yaml(BOOKINFO).unwrap();
        manifests.default_namespace("default");
        assert_eq!(manifests.destination_rules[0].metadata.namespace, "default");
        assert_eq!(manifests.virtual_services[0].metadata.namespace, "bookinfo");
    }

    #[test]
    fn unwraps_list_documents() {
        let yaml = r#"
apiVersion: v1
kind: List
items:
- apiVersion: v1
  kind: Namespace
  metadata:
    name: bookinfo
- apiVersion: v1
  kind: Namespace
  metadata:
    name: outside-ns
"#;
        let manifests = Manifests::from_yaml(yaml).unwrap();
        assert_eq!(manifests.namespaces.len(), 2);
    }

    #[test]
    fn document_without_kind_is_rejected() {
        let err = Manifests::from_yaml("metadata:\n  name: x\n").unwrap_err();
        assert!(matches!(err, Error::InvalidManifest { .. }));
    }

    #[test]
    fn malformed_routing_object_reports_kind() {
        let yaml = "kind: DestinationRule\nmetadata:\n  name: x\nspec: {}\n";
        let err = Manifests::from_yaml(yaml).unwrap_err();
        assert_eq!(err.kind(), Some("DestinationRule"));
    }

    #[test]
    fn extend_accumulates_across_streams() {
        let mut manifests = Manifests::default();
        manifests.extend_from_yaml(BOOKINFO).unwrap();
        manifests.extend_from_yaml(BOOKINFO).unwrap();
        assert_eq!(manifests.destination_rules.len(), 2);
        assert!(!manifests.is_empty());
    }
}
