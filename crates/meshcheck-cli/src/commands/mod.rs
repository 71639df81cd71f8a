//! CLI commands

use std::path::PathBuf;

use clap::ValueEnum;
use meshcheck_common::manifests::Manifests;
use serde::Deserialize;
use tracing::debug;

use crate::error::read_file;
use crate::Result;

pub mod classify;
pub mod format;
pub mod validate;

/// Output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Column-aligned table (default)
    #[default]
    Text,
    /// JSON
    Json,
}

/// Load and merge manifest files
///
/// Routing objects without a namespace are placed in `namespace`.
pub fn load_manifests(paths: &[PathBuf], namespace: &str) -> Result<Manifests> {
    let mut manifests = Manifests::default();
    extend_manifests(&mut manifests, paths)?;
    manifests.default_namespace(namespace);
    Ok(manifests)
}

/// Add the objects from `paths` to `manifests`
pub fn extend_manifests(manifests: &mut Manifests, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let before = manifests.len();
        manifests.extend_from_yaml(&read_file(path)?)?;
        debug!(
            path = %path.display(),
            objects = manifests.len() - before,
            "loaded manifests"
        );
    }
    Ok(())
}
