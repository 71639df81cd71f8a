//! Service and workload inventory
//!
//! Read-only views over a caller-supplied snapshot. [`Inventory`] holds a
//! whole cluster snapshot; [`ResolutionContext`] is the per-namespace slice
//! one validation call reads.

use std::collections::{BTreeMap, BTreeSet};

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service};
use meshcheck_common::crd::{RegistryStatus, ServiceEntry};
use meshcheck_common::manifests::Manifests;
use tracing::{debug, warn};

use crate::host::host_matches;
use crate::labels::selector_matches;

/// A Kubernetes Service as the resolver sees it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Service name
    pub name: String,
    /// Service namespace
    pub namespace: String,
    /// Labels on the Service object
    pub labels: BTreeMap<String, String>,
    /// Pod selector
    pub selector: BTreeMap<String, String>,
}

impl ServiceRecord {
    /// Create a service with no labels or selector
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Set the pod selector
    pub fn with_selector<'a>(
        mut self,
        selector: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        self.selector = to_map(selector);
        self
    }

    /// Convert a Kubernetes Service; `None` when name or namespace is missing
    pub fn from_k8s(service: &Service) -> Option<Self> {
        let meta = &service.metadata;
        Some(Self {
            name: meta.name.clone()?,
            namespace: meta.namespace.clone()?,
            labels: meta.labels.clone().unwrap_or_default(),
            selector: service
                .spec
                .as_ref()
                .and_then(|spec| spec.selector.clone())
                .unwrap_or_default(),
        })
    }

    /// Check if this service's selector picks `workload`.
    ///
    /// A service without a selector selects nothing (its endpoints are
    /// managed by hand).
    pub fn selects(&self, workload: &WorkloadRecord) -> bool {
        !self.selector.is_empty()
            && workload.namespace == self.namespace
            && selector_matches(&self.selector, &workload.labels)
    }
}

/// A workload (Deployment, Pod, ...) and the labels its pods carry
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkloadRecord {
    /// Workload name
    pub name: String,
    /// Workload namespace
    pub namespace: String,
    /// Pod labels
    pub labels: BTreeMap<String, String>,
}

impl WorkloadRecord {
    /// Create a workload from label pairs
    pub fn new<'a>(
        name: impl Into<String>,
        namespace: impl Into<String>,
        labels: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: to_map(labels),
        }
    }

    /// Workload from a Deployment's pod template labels
    pub fn from_deployment(deployment: &Deployment) -> Option<Self> {
        let meta = &deployment.metadata;
        let labels = deployment
            .spec
            .as_ref()
            .and_then(|spec| spec.template.metadata.as_ref())
            .and_then(|template| template.labels.clone())
            .unwrap_or_default();
        Some(Self {
            name: meta.name.clone()?,
            namespace: meta.namespace.clone()?,
            labels,
        })
    }

    /// Workload from a bare Pod's labels
    pub fn from_pod(pod: &Pod) -> Option<Self> {
        let meta = &pod.metadata;
        Some(Self {
            name: meta.name.clone()?,
            namespace: meta.namespace.clone()?,
            labels: meta.labels.clone().unwrap_or_default(),
        })
    }
}

/// Everything one resolution reads, scoped to the object's namespace
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionContext {
    namespace: String,
    known_namespaces: BTreeSet<String>,
    services: Vec<ServiceRecord>,
    workloads: Vec<WorkloadRecord>,
    external_hosts: BTreeSet<String>,
    service_entry_hosts: BTreeSet<String>,
}

impl ResolutionContext {
    /// Empty context for objects in `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Namespaces visible to the caller
    pub fn with_known_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_namespaces
            .extend(namespaces.into_iter().map(Into::into));
        self
    }

    /// Services in the namespace
    pub fn with_services(mut self, services: impl IntoIterator<Item = ServiceRecord>) -> Self {
        self.services.extend(services);
        self
    }

    /// Workloads in the namespace, order preserved
    pub fn with_workloads(mut self, workloads: impl IntoIterator<Item = WorkloadRecord>) -> Self {
        self.workloads.extend(workloads);
        self
    }

    /// Hosts visible through the mesh registry
    pub fn with_external_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external_hosts.extend(hosts.into_iter().map(Into::into));
        self
    }

    /// Hosts declared by ServiceEntries, possibly wildcarded
    pub fn with_service_entry_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.service_entry_hosts
            .extend(hosts.into_iter().map(Into::into));
        self
    }

    /// Namespace of the object under validation
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Check if cross-namespace references can be verified at all
    pub fn has_namespace_list(&self) -> bool {
        !self.known_namespaces.is_empty()
    }

    /// Check if `namespace` is visible to the caller
    pub fn knows_namespace(&self, namespace: &str) -> bool {
        self.known_namespaces.contains(namespace)
    }

    /// Find a service by name and namespace
    pub fn find_service(&self, name: &str, namespace: &str) -> Option<&ServiceRecord> {
        self.services
            .iter()
            .find(|svc| svc.name == name && svc.namespace == namespace)
    }

    /// Workloads in declaration order
    pub fn workloads(&self) -> &[WorkloadRecord] {
        &self.workloads
    }

    /// Workloads picked by a service's selector
    pub fn workloads_for_service<'a>(
        &'a self,
        service: &'a ServiceRecord,
    ) -> impl Iterator<Item = &'a WorkloadRecord> + 'a {
        self.workloads.iter().filter(move |wl| service.selects(wl))
    }

    /// Registry host (exact or wildcard) matching `host`
    pub fn registry_match(&self, host: &str) -> Option<&str> {
        find_host(&self.external_hosts, host)
    }

    /// ServiceEntry host (exact or wildcard) matching `host`
    pub fn service_entry_match(&self, host: &str) -> Option<&str> {
        find_host(&self.service_entry_hosts, host)
    }
}

fn find_host<'a>(declared: &'a BTreeSet<String>, host: &str) -> Option<&'a str> {
    if let Some(exact) = declared.get(host) {
        return Some(exact.as_str());
    }
    declared
        .iter()
        .find(|pattern| host_matches(pattern, host))
        .map(String::as_str)
}

fn to_map<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Cluster-wide snapshot from which per-namespace contexts are cut
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    namespaces: BTreeSet<String>,
    services: Vec<ServiceRecord>,
    workloads: Vec<WorkloadRecord>,
    registry_hosts: BTreeSet<String>,
    service_entry_hosts: BTreeSet<String>,
}

impl Inventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loaded manifests
    ///
    /// Kubernetes objects missing a name or namespace are skipped.
    pub fn from_manifests(manifests: &Manifests) -> Self {
        let mut inventory = Self::new();

        for ns in &manifests.namespaces {
            match &ns.metadata.name {
                Some(name) => {
                    inventory.namespaces.insert(name.clone());
                }
                None => warn!("skipping Namespace without a name"),
            }
        }
        for svc in &manifests.services {
            match ServiceRecord::from_k8s(svc) {
                Some(record) => inventory.services.push(record),
                None => warn!(
                    name = ?svc.metadata.name,
                    "skipping Service without name or namespace"
                ),
            }
        }
        for deployment in &manifests.deployments {
            match WorkloadRecord::from_deployment(deployment) {
                Some(record) => inventory.workloads.push(record),
                None => warn!(
                    name = ?deployment.metadata.name,
                    "skipping Deployment without name or namespace"
                ),
            }
        }
        for pod in &manifests.pods {
            match WorkloadRecord::from_pod(pod) {
                Some(record) => inventory.workloads.push(record),
                None => warn!(
                    name = ?pod.metadata.name,
                    "skipping Pod without name or namespace"
                ),
            }
        }
        inventory.add_service_entries(&manifests.service_entries);

        debug!(
            namespaces = inventory.namespaces.len(),
            services = inventory.services.len(),
            workloads = inventory.workloads.len(),
            service_entry_hosts = inventory.service_entry_hosts.len(),
            "built inventory from manifests"
        );
        inventory
    }

    /// Add namespaces
    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces.extend(namespaces.into_iter().map(Into::into));
        self
    }

    /// Add a service
    pub fn with_service(mut self, service: ServiceRecord) -> Self {
        self.services.push(service);
        self
    }

    /// Add a workload
    pub fn with_workload(mut self, workload: WorkloadRecord) -> Self {
        self.workloads.push(workload);
        self
    }

    /// Add registry entries
    pub fn add_registry(&mut self, entries: &[RegistryStatus]) {
        self.registry_hosts
            .extend(entries.iter().map(|entry| entry.hostname.clone()));
    }

    /// Add the hosts of ServiceEntries
    pub fn add_service_entries(&mut self, entries: &[ServiceEntry]) {
        for entry in entries {
            self.service_entry_hosts
                .extend(entry.hostnames().map(str::to_string));
        }
    }

    /// Namespaces in the snapshot
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(String::as_str)
    }

    /// Context for validating objects in `namespace`
    ///
    /// Services and workloads are limited to that namespace; namespaces,
    /// registry and ServiceEntry hosts are mesh-wide.
    pub fn context_for(&self, namespace: &str) -> ResolutionContext {
        ResolutionContext::new(namespace)
            .with_known_namespaces(self.namespaces.iter().cloned())
            .with_services(
                self.services
                    .iter()
                    .filter(|svc| svc.namespace == namespace)
                    .cloned(),
            )
            .with_workloads(
                self.workloads
                    .iter()
                    .filter(|wl| wl.namespace == namespace)
                    .cloned(),
            )
            .with_external_hosts(self.registry_hosts.iter().cloned())
            .with_service_entry_hosts(self.service_entry_hosts.iter().cloned())
    }
}
