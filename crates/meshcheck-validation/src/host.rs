//! Hostname normalization
//!
//! Classifies a raw destination host into one of four shapes, relative to the
//! namespace of the object that references it:
//!
//! - short name (`reviews`): scoped to the referencing namespace
//! - namespace-qualified (`reviews.prod`, `reviews.prod.svc.cluster.local`)
//! - mesh-wide wildcard (`*`, `*.local`)
//! - fully-qualified external (`api.stripe.com`), compared literally
//!
//! Classification never fails. Anything that doesn't fit the first three
//! shapes (empty labels, embedded `*`) is treated as an external literal.

use meshcheck_common::mesh::{self, DEFAULT_CLUSTER_DOMAIN, WILDCARD_HOST, WILDCARD_PREFIX};

/// Settings the normalizer and resolver depend on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Domain appended to `name.namespace` (e.g. "svc.cluster.local")
    pub cluster_domain: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cluster_domain: DEFAULT_CLUSTER_DOMAIN.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Config for a non-default cluster domain
    pub fn with_cluster_domain(cluster_domain: impl Into<String>) -> Self {
        Self {
            cluster_domain: cluster_domain.into(),
        }
    }
}

/// Shape of a destination host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKind {
    /// No dots: a service in the referencing namespace
    Short,
    /// `name.namespace[.cluster-domain]`
    NamespaceQualified,
    /// `*` or `*.suffix`
    MeshWideWildcard,
    /// Anything else, compared literally
    External,
}

/// A classified destination host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedHost {
    raw: String,
    kind: HostKind,
    service: Option<String>,
    namespace: Option<String>,
    fqdn: String,
}

impl ParsedHost {
    /// Classify `raw` as referenced from `own_namespace`
    pub fn parse(raw: &str, own_namespace: &str, config: &ResolverConfig) -> Self {
        if raw == WILDCARD_HOST {
            return Self::wildcard(raw);
        }
        if let Some(suffix) = raw.strip_prefix(WILDCARD_PREFIX) {
            if well_formed(suffix) {
                return Self::wildcard(raw);
            }
            return Self::external(raw);
        }
        if !well_formed(raw) {
            return Self::external(raw);
        }

        let labels: Vec<&str> = raw.split('.').collect();
        match labels.as_slice() {
            [name] => Self::qualified(raw, HostKind::Short, name, own_namespace, config),
            [name, namespace] => {
                Self::qualified(raw, HostKind::NamespaceQualified, name, namespace, config)
            }
            [name, namespace, tail @ ..] if is_domain_prefix(tail, &config.cluster_domain) => {
                Self::qualified(raw, HostKind::NamespaceQualified, name, namespace, config)
            }
            _ => Self::external(raw),
        }
    }

    fn qualified(
        raw: &str,
        kind: HostKind,
        name: &str,
        namespace: &str,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            raw: raw.to_string(),
            kind,
            service: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            fqdn: mesh::service_fqdn(name, namespace, &config.cluster_domain),
        }
    }

    fn wildcard(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: HostKind::MeshWideWildcard,
            service: None,
            namespace: None,
            fqdn: raw.to_string(),
        }
    }

    fn external(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: HostKind::External,
            service: None,
            namespace: None,
            fqdn: raw.to_string(),
        }
    }

    /// The same host read as an external literal
    pub fn as_external(&self) -> Self {
        Self::external(&self.raw)
    }

    /// Host as written in the object
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Classified shape
    pub fn kind(&self) -> HostKind {
        self.kind
    }

    /// Service name portion (short and namespace-qualified hosts)
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Implied or explicit namespace (short and namespace-qualified hosts)
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Fully-qualified form; the raw host for wildcards and externals
    pub fn fqdn(&self) -> &str {
        &self.fqdn
    }

    /// Check if this host refers to a service in `namespace`
    pub fn is_in_namespace(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }

    /// Names to compare against registry and service-entry hosts
    pub fn lookup_names(&self) -> Vec<&str> {
        if self.raw == self.fqdn {
            vec![self.fqdn.as_str()]
        } else {
            vec![self.fqdn.as_str(), self.raw.as_str()]
        }
    }
}

/// Compare a host against a declared host pattern.
///
/// Patterns are either exact hosts or `*`/`*.suffix`. Suffix comparison works
/// on whole labels, so `*.local` matches `foo.bar.local` but not
/// `foobarlocal` or `local` itself.
pub fn host_matches(pattern: &str, host: &str) -> bool {
    if pattern == host || pattern == WILDCARD_HOST {
        return true;
    }
    let Some(suffix) = pattern.strip_prefix(WILDCARD_PREFIX) else {
        return false;
    };
    let suffix_labels: Vec<&str> = suffix.split('.').collect();
    let host_labels: Vec<&str> = host.split('.').collect();
    host_labels.len() > suffix_labels.len()
        && host_labels[host_labels.len() - suffix_labels.len()..] == suffix_labels[..]
}

fn well_formed(host: &str) -> bool {
    !host.is_empty()
        && host
            .split('.')
            .all(|label| !label.is_empty() && !label.contains('*'))
}

// `reviews.prod.svc` and `reviews.prod.svc.cluster` are accepted as partial
// forms of the cluster domain.
fn is_domain_prefix(tail: &[&str], cluster_domain: &str) -> bool {
    let domain: Vec<&str> = cluster_domain.split('.').collect();
    !tail.is_empty() && tail.len() <= domain.len() && tail == &domain[..tail.len()]
}
