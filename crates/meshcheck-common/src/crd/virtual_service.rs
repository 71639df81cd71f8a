//! Istio VirtualService
//!
//! Only the parts of the route rules that capability classification reads are
//! typed: destinations and weights, timeouts, and fault injection. Match
//! conditions and rewrites are carried as opaque JSON.

use serde::{Deserialize, Serialize};

use super::{HasApiResource, ObjectMeta};

/// Istio VirtualService: traffic routing rules for a set of hosts
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualService {
    /// API version
    #[serde(default = "VirtualService::api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "VirtualService::kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    #[serde(default)]
    pub spec: VirtualServiceSpec,
}

impl HasApiResource for VirtualService {
    const API_VERSION: &'static str = "networking.istio.io/v1beta1";
    const KIND: &'static str = "VirtualService";
}

impl VirtualService {
    fn api_version() -> String {
        <Self as HasApiResource>::API_VERSION.to_string()
    }
    fn kind() -> String {
        <Self as HasApiResource>::KIND.to_string()
    }

    /// Create a VirtualService with the given spec
    pub fn new(metadata: ObjectMeta, spec: VirtualServiceSpec) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata,
            spec,
        }
    }
}

/// VirtualService spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServiceSpec {
    /// Destination hosts the rules apply to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    /// Gateways the rules apply to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gateways: Vec<String>,
    /// HTTP route rules, evaluated in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http: Vec<HttpRoute>,
    /// Opaque TCP route rules, evaluated in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tcp: Vec<TcpRoute>,
    /// TLS/SNI route rules, evaluated in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tls: Vec<TlsRoute>,
}

/// HTTP route rule
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpRoute {
    /// Rule name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Match conditions
    #[serde(default, rename = "match", skip_serializing_if = "Vec::is_empty")]
    pub match_: Vec<serde_json::Value>,
    /// Weighted destinations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub route: Vec<RouteDestination>,
    /// Request timeout as an Istio duration string (e.g. "0.5s")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    /// Fault injection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<HttpFault>,
}

/// TCP route rule
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TcpRoute {
    /// Match conditions
    #[serde(default, rename = "match", skip_serializing_if = "Vec::is_empty")]
    pub match_: Vec<serde_json::Value>,
    /// Weighted destinations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub route: Vec<RouteDestination>,
}

/// TLS route rule
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TlsRoute {
    /// Match conditions (SNI hosts, ports)
    #[serde(default, rename = "match", skip_serializing_if = "Vec::is_empty")]
    pub match_: Vec<serde_json::Value>,
    /// Weighted destinations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub route: Vec<RouteDestination>,
}

/// A destination with an optional traffic weight
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteDestination {
    /// Where traffic goes
    pub destination: Destination,
    /// Share of traffic in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl RouteDestination {
    /// Unweighted destination
    pub fn to(host: impl Into<String>) -> Self {
        Self {
            destination: Destination {
                host: host.into(),
                subset: None,
                port: None,
            },
            weight: None,
        }
    }

    /// Set the subset
    pub fn subset(mut self, subset: impl Into<String>) -> Self {
        self.destination.subset = Some(subset.into());
        self
    }

    /// Set the weight
    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Destination host, subset and port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// Destination host
    pub host: String,
    /// Subset name from the host's DestinationRule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<String>,
    /// Destination port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<PortSelector>,
}

/// Port selector
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PortSelector {
    /// Port number
    pub number: u32,
}

/// HTTP fault injection
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpFault {
    /// Delay injection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<FaultDelay>,
    /// Abort injection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort: Option<FaultAbort>,
}

impl HttpFault {
    /// True when neither delay nor abort is configured
    pub fn is_empty(&self) -> bool {
        self.delay.is_none() && self.abort.is_none()
    }
}

/// Delay fault
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FaultDelay {
    /// Fixed delay as an Istio duration string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_delay: Option<String>,
    /// Share of requests to delay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<serde_json::Value>,
}

/// Abort fault
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FaultAbort {
    /// HTTP status to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u32>,
    /// gRPC status to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_status: Option<String>,
    /// Share of requests to abort
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_http_tcp_and_tls_rules() {
        let json = serde_json::json!({
            "metadata": {"name": "reviews-route", "namespace": "prod"},
            "spec": {
                "hosts": ["reviews.prod.svc.cluster.local"],
                "http": [{
                    "match": [{"headers": {"end-user": {"exact": "jason"}}}],
                    "route": [
                        {"destination": {"host": "reviews", "subset": "v2"}, "weight": 25},
                        {"destination": {"host": "reviews", "subset": "v1"}, "weight": 75}
                    ],
                    "timeout": "0.5s",
                    "fault": {"delay": {"fixedDelay": "7s", "percentage": {"value": 100}}}
                }],
                "tcp": [{"route": [{"destination": {"host": "tcp-echo", "port": {"number": 9000}}}]}],
                "tls": [{"route": [{"destination": {"host": "sni"}}]}]
            }
        });
        let vs: VirtualService = serde_json::from_value(json).unwrap();
        assert_eq!(vs.kind, "VirtualService");
        assert_eq!(vs.spec.http[0].route[1].weight, Some(75));
        assert_eq!(vs.spec.http[0].timeout.as_deref(), Some("0.5s"));
        assert_eq!(vs.spec.http[0].match_.len(), 1);
        assert!(!vs.spec.http[0].fault.as_ref().unwrap().is_empty());
        assert_eq!(
            vs.spec.tcp[0].route[0].destination.port,
            Some(PortSelector { number: 9000 })
        );
        assert_eq!(vs.spec.tls.len(), 1);
    }

    #[test]
    fn spec_defaults_when_absent() {
        let json = serde_json::json!({"metadata": {"name": "empty"}});
        let vs: VirtualService = serde_json::from_value(json).unwrap();
        assert!(vs.spec.http.is_empty());
        assert!(vs.spec.tcp.is_empty());
        assert!(vs.spec.tls.is_empty());
    }

    #[test]
    fn empty_fault_object_is_empty() {
        assert!(HttpFault::default().is_empty());
    }
}
