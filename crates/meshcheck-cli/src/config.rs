//! CLI configuration file
//!
//! Settings come from, highest priority first:
//! 1. Command-line flags
//! 2. `MESHCHECK_CLUSTER_DOMAIN` for the cluster domain
//! 3. The file named by `--config` / `MESHCHECK_CONFIG`
//! 4. Built-in defaults

use std::path::Path;

use meshcheck_common::mesh::DEFAULT_CLUSTER_DOMAIN;
use serde::Deserialize;
use tracing::debug;

use crate::commands::OutputFormat;
use crate::error::read_file;
use crate::{Error, Result};

const CLUSTER_DOMAIN_ENV: &str = "MESHCHECK_CLUSTER_DOMAIN";

/// Settings read from the config file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CliConfig {
    /// DNS suffix of in-cluster service names
    #[serde(default)]
    pub cluster_domain: Option<String>,
    /// Default output format
    #[serde(default)]
    pub output: Option<OutputFormat>,
    /// Treat warnings as failures
    #[serde(default)]
    pub fail_on_warning: bool,
}

/// Load the config file, or defaults when no path is given
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let data = read_file(path)?;
    if data.trim().is_empty() {
        return Ok(CliConfig::default());
    }
    let config: CliConfig = meshcheck_common::yaml::from_yaml(&data)
        .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Resolve the cluster domain using the priority chain
pub fn resolve_cluster_domain(explicit: Option<&str>, config: &CliConfig) -> String {
    cluster_domain_from(
        explicit,
        std::env::var(CLUSTER_DOMAIN_ENV).ok().as_deref(),
        config,
    )
}

fn cluster_domain_from(explicit: Option<&str>, env: Option<&str>, config: &CliConfig) -> String {
    explicit
        .or(env.filter(|v| !v.is_empty()))
        .or(config.cluster_domain.as_deref())
        .unwrap_or(DEFAULT_CLUSTER_DOMAIN)
        .trim_matches('.')
        .to_string()
}

/// Resolve the output format: flag, then config file, then text
pub fn resolve_output(explicit: Option<OutputFormat>, config: &CliConfig) -> OutputFormat {
    explicit.or(config.output).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_path_gives_defaults() {
        assert_eq!(load_config(None).unwrap(), CliConfig::default());
    }

    #[test]
    fn loads_yaml_config() {
        let file =
            write_config("clusterDomain: svc.example.internal\noutput: json\nfailOnWarning: true\n");
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.cluster_domain.as_deref(), Some("svc.example.internal"));
        assert_eq!(config.output, Some(OutputFormat::Json));
        assert!(config.fail_on_warning);
    }

    #[test]
    fn loads_json_config() {
        let file = write_config(r#"{"output": "text"}"#);
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.output, Some(OutputFormat::Text));
        assert!(!config.fail_on_warning);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let file = write_config("\n");
        assert_eq!(load_config(Some(file.path())).unwrap(), CliConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_config("clusterDomian: typo.local\n");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn unreadable_path_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/meshcheck.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn cluster_domain_priority() {
        let config = CliConfig {
            cluster_domain: Some("file.local".to_string()),
            ..Default::default()
        };
        assert_eq!(
            cluster_domain_from(Some("flag.local"), Some("env.local"), &config),
            "flag.local"
        );
        assert_eq!(cluster_domain_from(None, Some("env.local"), &config), "env.local");
        assert_eq!(cluster_domain_from(None, Some(""), &config), "file.local");
        assert_eq!(cluster_domain_from(None, None, &config), "file.local");
        assert_eq!(
            cluster_domain_from(None, None, &CliConfig::default()),
            DEFAULT_CLUSTER_DOMAIN
        );
    }

    #[test]
    fn cluster_domain_dots_are_trimmed() {
        assert_eq!(
            cluster_domain_from(Some(".svc.corp.local."), None, &CliConfig::default()),
            "svc.corp.local"
        );
    }

    #[test]
    fn output_priority() {
        let config = CliConfig {
            output: Some(OutputFormat::Json),
            ..Default::default()
        };
        assert_eq!(resolve_output(Some(OutputFormat::Text), &config), OutputFormat::Text);
        assert_eq!(resolve_output(None, &config), OutputFormat::Json);
        assert_eq!(resolve_output(None, &CliConfig::default()), OutputFormat::Text);
    }
}
