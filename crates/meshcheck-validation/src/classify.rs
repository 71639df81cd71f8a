//! Route capability classification
//!
//! Reports which traffic-management features a VirtualService uses. Every
//! predicate takes `Option<&VirtualService>` and answers `false` for `None`.

use meshcheck_common::crd::{
    HttpFault, HttpRoute, RouteDestination, TcpRoute, TlsRoute, VirtualService,
};
use serde::Serialize;

use crate::duration::parse_duration;

/// Capabilities present in a VirtualService
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySet {
    /// Some rule sets a non-zero timeout
    pub has_timeout: bool,
    /// Some rule injects a delay or abort
    pub has_fault_injection: bool,
    /// Some HTTP rule splits traffic across destinations
    #[serde(rename = "hasHTTPTrafficShifting")]
    pub has_http_traffic_shifting: bool,
    /// Some TCP rule splits traffic across destinations
    #[serde(rename = "hasTCPTrafficShifting")]
    pub has_tcp_traffic_shifting: bool,
    /// Some rule routes to a destination
    pub has_request_routing: bool,
}

impl CapabilitySet {
    /// Classify a VirtualService
    pub fn of(vs: Option<&VirtualService>) -> Self {
        Self {
            has_timeout: has_timeout(vs),
            has_fault_injection: has_fault_injection(vs),
            has_http_traffic_shifting: has_http_traffic_shifting(vs),
            has_tcp_traffic_shifting: has_tcp_traffic_shifting(vs),
            has_request_routing: has_request_routing(vs),
        }
    }
}

/// Common view over HTTP, TCP and TLS route rules
pub trait RouteRule {
    /// Weighted destinations
    fn destinations(&self) -> &[RouteDestination];

    /// Timeout string, if the protocol supports one
    fn timeout(&self) -> Option<&str> {
        None
    }

    /// Fault injection, if the protocol supports it
    fn fault(&self) -> Option<&HttpFault> {
        None
    }
}

impl RouteRule for HttpRoute {
    fn destinations(&self) -> &[RouteDestination] {
        &self.route
    }

    fn timeout(&self) -> Option<&str> {
        self.timeout.as_deref()
    }

    fn fault(&self) -> Option<&HttpFault> {
        self.fault.as_ref()
    }
}

impl RouteRule for TcpRoute {
    fn destinations(&self) -> &[RouteDestination] {
        &self.route
    }
}

impl RouteRule for TlsRoute {
    fn destinations(&self) -> &[RouteDestination] {
        &self.route
    }
}

fn all_rules(vs: &VirtualService) -> impl Iterator<Item = &dyn RouteRule> {
    let http = vs.spec.http.iter().map(|r| r as &dyn RouteRule);
    let tcp = vs.spec.tcp.iter().map(|r| r as &dyn RouteRule);
    let tls = vs.spec.tls.iter().map(|r| r as &dyn RouteRule);
    http.chain(tcp).chain(tls)
}

/// Any rule carries a timeout that parses to a non-zero duration
pub fn has_timeout(vs: Option<&VirtualService>) -> bool {
    vs.is_some_and(|vs| {
        all_rules(vs)
            .filter_map(|rule| rule.timeout())
            .any(|t| parse_duration(t).is_ok_and(|d| !d.is_zero()))
    })
}

/// Any rule configures a delay or an abort
pub fn has_fault_injection(vs: Option<&VirtualService>) -> bool {
    vs.is_some_and(|vs| {
        all_rules(vs)
            .filter_map(|rule| rule.fault())
            .any(|fault| !fault.is_empty())
    })
}

/// Any HTTP rule splits traffic
pub fn has_http_traffic_shifting(vs: Option<&VirtualService>) -> bool {
    vs.is_some_and(|vs| vs.spec.http.iter().any(shifts_traffic))
}

/// Any TCP rule splits traffic
pub fn has_tcp_traffic_shifting(vs: Option<&VirtualService>) -> bool {
    vs.is_some_and(|vs| vs.spec.tcp.iter().any(shifts_traffic))
}

/// Any HTTP, TCP or TLS rule has a destination
pub fn has_request_routing(vs: Option<&VirtualService>) -> bool {
    vs.is_some_and(|vs| all_rules(vs).any(|rule| !rule.destinations().is_empty()))
}

/// At least two destinations receive a share of the traffic
///
/// A destination without a weight gets nothing when its siblings are
/// weighted, and an equal share when none are.
pub fn shifts_traffic(rule: &impl RouteRule) -> bool {
    let destinations = rule.destinations();
    if destinations.iter().all(|d| d.weight.is_none()) {
        return destinations.len() > 1;
    }
    destinations
        .iter()
        .filter(|d| d.weight.unwrap_or(0) > 0)
        .count()
        > 1
}
