//! Classify command

use std::path::PathBuf;

use clap::Args;
use meshcheck_common::crd::{ObjectKey, VirtualService};
use meshcheck_validation::CapabilitySet;
use serde::Serialize;

use super::format::{flag, render_table};
use super::{load_manifests, OutputFormat};
use crate::config::{resolve_output, CliConfig};
use crate::Result;

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Manifests holding the VirtualServices to classify
    #[arg(short = 'f', long = "file", required = true)]
    pub files: Vec<PathBuf>,

    /// Namespace for routing objects that don't set one
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Output format
    #[arg(short, long)]
    pub output: Option<OutputFormat>,
}

/// Capabilities of one VirtualService
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub key: ObjectKey,
    pub capabilities: CapabilitySet,
}

pub fn run(args: ClassifyArgs, config: &CliConfig) -> Result<()> {
    let manifests = load_manifests(&args.files, &args.namespace)?;
    let classes = classify(&manifests.virtual_services);
    print!("{}", render(&classes, resolve_output(args.output, config))?);
    Ok(())
}

/// Classify VirtualServices, ordered by key
pub fn classify(services: &[VirtualService]) -> Vec<Classification> {
    let mut classes: Vec<Classification> = services
        .iter()
        .map(|vs| Classification {
            key: ObjectKey::of::<VirtualService>(&vs.metadata),
            capabilities: CapabilitySet::of(Some(vs)),
        })
        .collect();
    classes.sort_by(|a, b| a.key.cmp(&b.key));
    classes
}

/// Render classifications in the requested format
pub fn render(classes: &[Classification], output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(classes)? + "\n"),
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = classes
                .iter()
                .map(|class| {
                    let caps = &class.capabilities;
                    vec![
                        class.key.namespace.clone(),
                        class.key.name.clone(),
                        flag(caps.has_request_routing),
                        flag(caps.has_timeout),
                        flag(caps.has_fault_injection),
                        flag(caps.has_http_traffic_shifting),
                        flag(caps.has_tcp_traffic_shifting),
                    ]
                })
                .collect();
            Ok(render_table(
                &[
                    "NAMESPACE",
                    "NAME",
                    "ROUTING",
                    "TIMEOUT",
                    "FAULT",
                    "HTTP-SHIFT",
                    "TCP-SHIFT",
                ],
                &rows,
            ))
        }
    }
}
