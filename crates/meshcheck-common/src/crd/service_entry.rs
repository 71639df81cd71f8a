//! Istio ServiceEntry
//!
//! ServiceEntries declare hosts reachable through the mesh without a
//! Kubernetes Service behind them (egress gateways, SNI proxies, external
//! APIs). The validator only needs their host list.

use serde::{Deserialize, Serialize};

use super::{HasApiResource, ObjectMeta};

/// Istio ServiceEntry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    /// API version
    #[serde(default = "ServiceEntry::api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "ServiceEntry::kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: ServiceEntrySpec,
}

impl HasApiResource for ServiceEntry {
    const API_VERSION: &'static str = "networking.istio.io/v1beta1";
    const KIND: &'static str = "ServiceEntry";
}

impl ServiceEntry {
    fn api_version() -> String {
        <Self as HasApiResource>::API_VERSION.to_string()
    }
    fn kind() -> String {
        <Self as HasApiResource>::KIND.to_string()
    }

    /// Create a MESH_EXTERNAL ServiceEntry for the given hosts
    pub fn mesh_external(
        name: impl Into<String>,
        namespace: impl Into<String>,
        hosts: Vec<String>,
    ) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata: ObjectMeta::new(name, namespace),
            spec: ServiceEntrySpec {
                hosts,
                ports: vec![],
                location: Some(crate::mesh::MESH_EXTERNAL.to_string()),
                resolution: None,
            },
        }
    }

    /// Hosts this entry declares, in declaration order
    pub fn hostnames(&self) -> impl Iterator<Item = &str> {
        self.spec.hosts.iter().map(String::as_str)
    }
}

/// ServiceEntry spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntrySpec {
    /// Hosts (DNS names, possibly wildcarded)
    #[serde(default)]
    pub hosts: Vec<String>,
    /// Ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ServiceEntryPort>,
    /// Location: MESH_EXTERNAL or MESH_INTERNAL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Resolution: DNS, STATIC, NONE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// ServiceEntry port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ServiceEntryPort {
    /// Port number
    pub number: u16,
    /// Port name
    pub name: String,
    /// Protocol (HTTP, HTTPS, TCP, GRPC, TLS)
    pub protocol: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostnames_in_declaration_order() {
        let se = ServiceEntry::mesh_external(
            "sni-proxy",
            "test",
            vec!["sni-proxy.local".to_string(), "*.wikipedia.org".to_string()],
        );
        let hosts: Vec<_> = se.hostnames().collect();
        assert_eq!(hosts, vec!["sni-proxy.local", "*.wikipedia.org"]);
        assert_eq!(se.spec.location.as_deref(), Some("MESH_EXTERNAL"));
    }

    #[test]
    fn deserializes_ports() {
        let json = serde_json::json!({
            "metadata": {"name": "sni-proxy", "namespace": "test"},
            "spec": {
                "hosts": ["sni-proxy.local"],
                "ports": [{"number": 8443, "name": "tcp", "protocol": "TCP"}],
                "location": "MESH_EXTERNAL",
                "resolution": "STATIC"
            }
        });
        let se: ServiceEntry = serde_json::from_value(json).unwrap();
        assert_eq!(se.spec.ports[0].number, 8443);
        assert_eq!(se.spec.resolution.as_deref(), Some("STATIC"));
    }
}
