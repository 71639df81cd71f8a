//! Host resolution
//!
//! Decides whether a destination host denotes something reachable. Resolution
//! is an ordered list of strategies, each a pure check over the parsed host
//! and the context; the first one that matches wins:
//!
//! 1. [`Strategy::LocalService`]: a Service in the object's own namespace
//! 2. [`Strategy::CrossNamespace`]: a known namespace whose host is exported
//!    through the mesh registry
//! 3. [`Strategy::MeshWideWildcard`]: `*` and `*.suffix` always resolve
//! 4. [`Strategy::ServiceEntry`]: a host declared by a ServiceEntry
//! 5. [`Strategy::ExternalRegistry`]: a host in the mesh registry
//!
//! Strategies 3-5 don't read the service inventory, so a rule pointing at a
//! purely external destination resolves even when no services are supplied.

use meshcheck_common::crd::DestinationRule;
use serde::Serialize;
use tracing::{debug, trace};

use crate::host::{HostKind, ParsedHost, ResolverConfig};
use crate::inventory::ResolutionContext;
use crate::report::{Finding, FindingCode, HOST_PATH};

/// How a host resolved
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMatch {
    /// A Service in the object's own namespace
    LocalService {
        /// Service name
        name: String,
        /// Service namespace
        namespace: String,
    },
    /// A registered service in another known namespace
    NamespaceQualified {
        /// Service name
        name: String,
        /// Service namespace
        namespace: String,
        /// Registry hostname that matched
        hostname: String,
    },
    /// A wildcard host, which always resolves
    MeshWideWildcard {
        /// The wildcard pattern
        pattern: String,
    },
    /// A host declared by a ServiceEntry
    ServiceEntryMatch {
        /// ServiceEntry host (possibly a wildcard) that matched
        hostname: String,
    },
    /// A host present in the mesh registry
    ExternalRegistry {
        /// Registry hostname that matched
        hostname: String,
    },
    /// Nothing matched
    Unresolved,
}

impl HostMatch {
    /// Check if subsets can be checked against a local workload inventory
    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalService { .. })
    }
}

/// One resolution rule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Service in the object's own namespace
    LocalService,
    /// Registered service in another known namespace
    CrossNamespace,
    /// `*` or `*.suffix`
    MeshWideWildcard,
    /// ServiceEntry host
    ServiceEntry,
    /// Mesh registry host
    ExternalRegistry,
}

impl Strategy {
    /// Evaluation order
    pub const ORDER: [Strategy; 5] = [
        Strategy::LocalService,
        Strategy::CrossNamespace,
        Strategy::MeshWideWildcard,
        Strategy::ServiceEntry,
        Strategy::ExternalRegistry,
    ];

    /// Apply this strategy alone
    pub fn apply(self, host: &ParsedHost, ctx: &ResolutionContext) -> Option<HostMatch> {
        match self {
            Self::LocalService => local_service(host, ctx),
            Self::CrossNamespace => cross_namespace(host, ctx),
            Self::MeshWideWildcard => (host.kind() == HostKind::MeshWideWildcard).then(|| {
                HostMatch::MeshWideWildcard {
                    pattern: host.raw().to_string(),
                }
            }),
            Self::ServiceEntry => host
                .lookup_names()
                .into_iter()
                .find_map(|name| ctx.service_entry_match(name))
                .map(|hostname| HostMatch::ServiceEntryMatch {
                    hostname: hostname.to_string(),
                }),
            Self::ExternalRegistry => host
                .lookup_names()
                .into_iter()
                .find_map(|name| ctx.registry_match(name))
                .map(|hostname| HostMatch::ExternalRegistry {
                    hostname: hostname.to_string(),
                }),
        }
    }
}

fn local_service(host: &ParsedHost, ctx: &ResolutionContext) -> Option<HostMatch> {
    if !matches!(host.kind(), HostKind::Short | HostKind::NamespaceQualified)
        || !host.is_in_namespace(ctx.namespace())
    {
        return None;
    }
    let name = host.service()?;
    ctx.find_service(name, ctx.namespace())
        .map(|svc| HostMatch::LocalService {
            name: svc.name.clone(),
            namespace: svc.namespace.clone(),
        })
}

// Cross-namespace visibility needs explicit registration: a same-named
// Service in the other namespace is not consulted.
fn cross_namespace(host: &ParsedHost, ctx: &ResolutionContext) -> Option<HostMatch> {
    if host.kind() != HostKind::NamespaceQualified || host.is_in_namespace(ctx.namespace()) {
        return None;
    }
    let namespace = host.namespace()?;
    if !ctx.knows_namespace(namespace) {
        return None;
    }
    let hostname = ctx.registry_match(host.fqdn())?;
    Some(HostMatch::NamespaceQualified {
        name: host.service()?.to_string(),
        namespace: namespace.to_string(),
        hostname: hostname.to_string(),
    })
}

/// Result of resolving one host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// The host as classified
    pub host: ParsedHost,
    /// How it resolved
    pub outcome: HostMatch,
    /// Error at `spec/host` when unresolved
    pub finding: Option<Finding>,
}

/// Resolves destination hosts against a [`ResolutionContext`]
#[derive(Clone, Debug, Default)]
pub struct HostResolver {
    config: ResolverConfig,
}

impl HostResolver {
    /// Create a resolver
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolve a DestinationRule's host
    pub fn resolve(&self, rule: &DestinationRule, ctx: &ResolutionContext) -> Resolution {
        self.resolve_host(&rule.spec.host, ctx)
    }

    /// Resolve a raw host referenced from `ctx.namespace()`
    pub fn resolve_host(&self, raw: &str, ctx: &ResolutionContext) -> Resolution {
        let host = ParsedHost::parse(raw, ctx.namespace(), &self.config);

        // `name.ns` with an `ns` the caller can't see is not a namespace
        // reference we can verify; it can only be an external literal.
        let unknown_namespace = host.kind() == HostKind::NamespaceQualified
            && !host.is_in_namespace(ctx.namespace())
            && ctx.has_namespace_list()
            && host.namespace().is_some_and(|ns| !ctx.knows_namespace(ns));
        let subject = if unknown_namespace {
            host.as_external()
        } else {
            host.clone()
        };

        for strategy in Strategy::ORDER {
            if let Some(outcome) = strategy.apply(&subject, ctx) {
                debug!(host = raw, ?strategy, "host resolved");
                return Resolution {
                    host,
                    outcome,
                    finding: None,
                };
            }
            trace!(host = raw, ?strategy, "strategy did not match");
        }

        let code = if unknown_namespace {
            FindingCode::UnknownNamespace
        } else {
            FindingCode::HostUnresolved
        };
        debug!(host = raw, code = code.as_str(), "host unresolved");
        Resolution {
            host,
            outcome: HostMatch::Unresolved,
            finding: Some(Finding::new(code, HOST_PATH)),
        }
    }
}
