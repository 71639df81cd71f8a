//! Routing object model
//!
//! Typed forms of the Istio networking resources the validator reads:
//! - DestinationRule: host plus named label-selector subsets
//! - VirtualService: HTTP/TCP/TLS route rules
//! - ServiceEntry: hosts registered with the mesh by declaration
//! - RegistryStatus: one entry of the control plane's service registry
//!
//! All resource types implement [`HasApiResource`] for consistent API version
//! and kind handling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod destination_rule;
mod registry;
mod service_entry;
mod virtual_service;

pub use destination_rule::{DestinationRule, DestinationRuleSpec, Subset};
pub use registry::RegistryStatus;
pub use service_entry::{ServiceEntry, ServiceEntryPort, ServiceEntrySpec};
pub use virtual_service::{
    Destination, FaultAbort, FaultDelay, HttpFault, HttpRoute, PortSelector, RouteDestination,
    TcpRoute, TlsRoute, VirtualService, VirtualServiceSpec,
};

/// API version and kind of a resource type
pub trait HasApiResource {
    /// Full API version (e.g., "networking.istio.io/v1beta1")
    const API_VERSION: &'static str;
    /// Resource kind (e.g., "DestinationRule")
    const KIND: &'static str;
}

/// Metadata shared by every routing object
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    pub name: String,
    /// Resource namespace (empty when the manifest leaves it to the caller)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Create metadata for a namespaced object
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Fill in the namespace if the manifest omitted it
    pub fn default_namespace(&mut self, namespace: &str) {
        if self.namespace.is_empty() {
            self.namespace = namespace.to_string();
        }
    }
}

/// Identity of an object within one validation run
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ObjectKey {
    /// Resource kind
    pub kind: String,
    /// Namespace
    pub namespace: String,
    /// Name
    pub name: String,
}

impl ObjectKey {
    /// Build the key for a typed resource
    pub fn of<T: HasApiResource>(meta: &ObjectMeta) -> Self {
        Self {
            kind: T::KIND.to_string(),
            namespace: meta.namespace.clone(),
            name: meta.name.clone(),
        }
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}
