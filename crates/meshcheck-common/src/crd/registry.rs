//! Control plane service registry entries
//!
//! Istiod exposes its merged service registry (`/debug/registryz`) as a JSON
//! array. Hosts in it are visible mesh-wide, including services imported from
//! other clusters or meshes, so they count as reachable destinations.

use serde::{Deserialize, Serialize};

/// One registry entry; only the hostname is read
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatus {
    /// Fully-qualified hostname of the registered service
    pub hostname: String,
}

impl RegistryStatus {
    /// Create an entry for a hostname
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }

    /// Parse a registry dump (JSON array); unknown fields are ignored
    pub fn list_from_json(input: &str) -> crate::Result<Vec<Self>> {
        serde_json::from_str(input)
            .map_err(|e| crate::Error::serialization_for("RegistryStatus", e.to_string()))
    }
}
