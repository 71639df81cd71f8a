//! Validate command

use std::path::PathBuf;

use clap::Args;
use meshcheck_common::crd::RegistryStatus;
use meshcheck_validation::{
    validate_destination_rules, BatchReport, HostMatch, Inventory, ResolverConfig, Severity,
};
use tracing::warn;

use super::format::render_table;
use super::{extend_manifests, load_manifests, OutputFormat};
use crate::config::{resolve_cluster_domain, resolve_output, CliConfig};
use crate::error::read_file;
use crate::{Error, Result};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Manifests holding the DestinationRules to check; inventory objects in
    /// them are used too
    #[arg(short = 'f', long = "file", required = true)]
    pub files: Vec<PathBuf>,

    /// Extra manifests to read Namespaces, Services, Deployments, Pods and
    /// ServiceEntries from
    #[arg(long)]
    pub inventory: Vec<PathBuf>,

    /// Mesh registry dump: a JSON array of `{"hostname": ...}` entries
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Namespace for routing objects that don't set one
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Cluster DNS domain (default: svc.cluster.local)
    #[arg(long)]
    pub cluster_domain: Option<String>,

    /// Output format
    #[arg(short, long)]
    pub output: Option<OutputFormat>,

    /// Exit non-zero when any warning is reported
    #[arg(long)]
    pub fail_on_warning: bool,
}

pub fn run(args: ValidateArgs, config: &CliConfig) -> Result<()> {
    let report = check(&args, config)?;
    print!("{}", render(&report, resolve_output(args.output, config))?);
    verdict(&report, args.fail_on_warning || config.fail_on_warning)
}

/// Load everything the arguments name and check every DestinationRule
pub fn check(args: &ValidateArgs, config: &CliConfig) -> Result<BatchReport> {
    let manifests = load_manifests(&args.files, &args.namespace)?;

    let mut snapshot = manifests.clone();
    extend_manifests(&mut snapshot, &args.inventory)?;
    snapshot.default_namespace(&args.namespace);
    let mut inventory = Inventory::from_manifests(&snapshot);

    if let Some(path) = &args.registry {
        let entries = RegistryStatus::list_from_json(&read_file(path)?)?;
        inventory.add_registry(&entries);
    }

    if manifests.destination_rules.is_empty() {
        warn!("no DestinationRules found");
    }

    let resolver = ResolverConfig::with_cluster_domain(resolve_cluster_domain(
        args.cluster_domain.as_deref(),
        config,
    ));
    Ok(validate_destination_rules(
        &manifests.destination_rules,
        &inventory,
        &resolver,
    ))
}

/// Render a report in the requested format
pub fn render(report: &BatchReport, output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)? + "\n"),
        OutputFormat::Text => Ok(render_text(report)),
    }
}

fn render_text(report: &BatchReport) -> String {
    let rows: Vec<Vec<String>> = report
        .results
        .iter()
        .map(|result| {
            let status = if result.is_valid() { "valid" } else { "invalid" };
            vec![
                result.key.namespace.clone(),
                result.key.name.clone(),
                resolution_label(&result.outcome).to_string(),
                status.to_string(),
            ]
        })
        .collect();
    let mut out = render_table(&["NAMESPACE", "NAME", "RESOLUTION", "STATUS"], &rows);

    let findings: Vec<String> = report
        .results
        .iter()
        .flat_map(|result| {
            result.report.findings.iter().map(move |finding| {
                format!(
                    "  {}: {} {} {}",
                    result.key,
                    severity_label(finding.severity),
                    finding.path,
                    finding.code
                )
            })
        })
        .collect();
    if !findings.is_empty() {
        out.push_str("\nFindings:\n");
        for line in findings {
            out.push_str(&line);
            out.push('\n');
        }
    }

    let summary = &report.summary;
    out.push_str(&format!(
        "\n{} checked, {} valid, {} errors, {} warnings\n",
        summary.checked, summary.valid, summary.errors, summary.warnings
    ));
    out
}

fn resolution_label(outcome: &HostMatch) -> &'static str {
    match outcome {
        HostMatch::LocalService { .. } => "local",
        HostMatch::NamespaceQualified { .. } => "cross-namespace",
        HostMatch::MeshWideWildcard { .. } => "wildcard",
        HostMatch::ServiceEntryMatch { .. } => "service-entry",
        HostMatch::ExternalRegistry { .. } => "registry",
        HostMatch::Unresolved => "unresolved",
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

/// Map a report to the command's exit status
pub fn verdict(report: &BatchReport, fail_on_warning: bool) -> Result<()> {
    let summary = &report.summary;
    let invalid = summary.checked - summary.valid;
    if invalid > 0 {
        return Err(Error::validation(format!(
            "{} of {} DestinationRules invalid",
            invalid, summary.checked
        )));
    }
    if fail_on_warning && summary.warnings > 0 {
        return Err(Error::validation(format!(
            "{} warnings reported",
            summary.warnings
        )));
    }
    Ok(())
}
