//! Text and JSON reports for a discovery run

use crate::container::ContainerKind;
use crate::discovery::{DiscoveryError, DiscoveryOutcome};
use crate::inventory::DiscoveryResult;
use crate::regenerate::RegenerationReport;
use crate::scheme::Scheme;
use owo_colors::{OwoColorize, Stream};
use schemekit_cli::output::{format_count, Status};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Show `path` relative to the directory holding the root container
pub fn display_path(path: &Path, root: &Path) -> String {
    let base = root.parent().unwrap_or(root);
    path.strip_prefix(base)
        .ok()
        .filter(|relative| !relative.as_os_str().is_empty())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// One scheme as a list entry, tagged shared or user
pub fn scheme_line(scheme: &Scheme) -> String {
    let tag = if scheme.is_shared() {
        "(Shared)".if_supports_color(Stream::Stdout, |t| t.green()).to_string()
    } else {
        "(User)".if_supports_color(Stream::Stdout, |t| t.yellow()).to_string()
    };
    format!("{} {tag}", scheme.name())
}

fn print_inventory(root: &Path, inventory: &DiscoveryResult) {
    for container in inventory.containers() {
        println!("{}", display_path(&container.container, root));
        if container.schemes.is_empty() {
            Status::item(1, "no schemes");
        }
        for scheme in &container.schemes {
            Status::item(1, &scheme_line(scheme));
        }
    }
}

fn print_skipped(root: &Path, skipped: &[PathBuf]) {
    for missing in skipped {
        Status::warning(&format!(
            "Skipping project ({}), as it is not present",
            display_path(missing, root)
        ));
    }
}

fn print_regeneration(root: &Path, regeneration: &RegenerationReport) {
    for (project, reason) in regeneration.failures() {
        Status::error(&format!(
            "Failed to generate schemes for {}: {reason}",
            display_path(project, root)
        ));
    }
}

/// Print the human report for a successful run
pub fn print_outcome(root: &Path, outcome: &DiscoveryOutcome) {
    Status::header("Schemes");
    print_inventory(root, outcome.inventory());
    println!();

    print_skipped(root, outcome.skipped());

    let shared = format_count(outcome.inventory().shared_count(), "shared scheme", "shared schemes");
    match outcome {
        DiscoveryOutcome::SharedFound { .. } => Status::success(&format!("{shared} found")),
        DiscoveryOutcome::Regenerated {
            regeneration,
            attempts,
            ..
        } => {
            print_regeneration(root, regeneration);
            Status::success(&format!(
                "{shared} after regeneration with {} (verified on attempt {attempts})",
                regeneration.generator
            ));
        }
    }
}

/// Print the human report for a failed run
pub fn print_failure(root: &Path, error: &DiscoveryError) {
    print_skipped(root, &error.skipped);
    if let Some(regeneration) = &error.regeneration {
        print_regeneration(root, regeneration);
    }
    Status::error(&error.to_string());
}

#[derive(Debug, Serialize)]
pub struct JsonContainer<'a> {
    pub path: String,
    pub kind: ContainerKind,
    pub schemes: &'a [Scheme],
}

#[derive(Debug, Serialize)]
pub struct JsonError {
    pub stage: crate::error::Stage,
    pub code: String,
    pub path: String,
    pub message: String,
}

/// Machine-readable report, printed with `--format json`
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub success: bool,
    pub container: String,
    pub regenerated: bool,
    pub shared_count: usize,
    pub containers: Vec<JsonContainer<'a>>,
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regeneration: Option<&'a RegenerationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

impl<'a> JsonReport<'a> {
    pub fn from_outcome(root: &Path, outcome: &'a DiscoveryOutcome) -> Self {
        let inventory = outcome.inventory();
        Self {
            success: true,
            container: root.display().to_string(),
            regenerated: outcome.regeneration().is_some(),
            shared_count: inventory.shared_count(),
            containers: inventory
                .containers()
                .iter()
                .map(|c| JsonContainer {
                    path: display_path(&c.container, root),
                    kind: c.kind,
                    schemes: &c.schemes,
                })
                .collect(),
            skipped: outcome.skipped().iter().map(|p| display_path(p, root)).collect(),
            regeneration: outcome.regeneration(),
            error: None,
        }
    }

    pub fn from_error(root: &Path, error: &'a DiscoveryError) -> Self {
        Self {
            success: false,
            container: root.display().to_string(),
            regenerated: error.regeneration.is_some(),
            shared_count: 0,
            containers: Vec::new(),
            skipped: error.skipped.iter().map(|p| display_path(p, root)).collect(),
            regeneration: error.regeneration.as_ref(),
            error: Some(JsonError {
                stage: error.stage,
                code: error.source.code().to_string(),
                path: error.path.display().to_string(),
                message: error.source.to_string(),
            }),
        }
    }
}
