//! Service mesh naming constants
//!
//! Single source of truth for the DNS shapes the resolver reasons about.
//! Values here are defaults only; the resolver takes the cluster domain as an
//! explicit parameter.

/// Default Kubernetes service domain appended to `name.namespace`.
pub const DEFAULT_CLUSTER_DOMAIN: &str = "svc.cluster.local";

/// Host pattern matching every destination in the mesh.
pub const WILDCARD_HOST: &str = "*";

/// Prefix of a wildcard host pattern (`*.example.com`).
pub const WILDCARD_PREFIX: &str = "*.";

/// ServiceEntry location for hosts outside the mesh.
pub const MESH_EXTERNAL: &str = "MESH_EXTERNAL";

/// Build the fully-qualified service hostname.
///
/// Format: `{service}.{namespace}.{cluster_domain}`
pub fn service_fqdn(service: &str, namespace: &str, cluster_domain: &str) -> String {
    format!("{}.{}.{}", service, namespace, cluster_domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_domain_is_kubernetes_default() {
        assert_eq!(DEFAULT_CLUSTER_DOMAIN, "svc.cluster.local");
    }

    #[test]
    fn service_fqdn_format() {
        assert_eq!(
            service_fqdn("reviews", "bookinfo", DEFAULT_CLUSTER_DOMAIN),
            "reviews.bookinfo.svc.cluster.local"
        );
        assert_eq!(
            service_fqdn("ratings", "mesh2", "svc.mesh1-imports.local"),
            "ratings.mesh2.svc.mesh1-imports.local"
        );
    }
}
