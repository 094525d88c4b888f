//! Scheme regeneration across projects

use crate::generator::SchemeGenerator;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What happened to one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProjectOutcome {
    Generated { written: Vec<String> },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRegeneration {
    pub project: PathBuf,
    #[serde(flatten)]
    pub outcome: ProjectOutcome,
}

/// Per-project results of a regeneration pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegenerationReport {
    pub generator: String,
    pub projects: Vec<ProjectRegeneration>,
}

impl RegenerationReport {
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.projects.iter().filter_map(|p| match &p.outcome {
            ProjectOutcome::Failed { reason } => Some((p.project.as_path(), reason.as_str())),
            ProjectOutcome::Generated { .. } => None,
        })
    }

    pub fn succeeded(&self) -> usize {
        self.projects
            .iter()
            .filter(|p| matches!(p.outcome, ProjectOutcome::Generated { .. }))
            .count()
    }

    pub fn written(&self) -> usize {
        self.projects
            .iter()
            .map(|p| match &p.outcome {
                ProjectOutcome::Generated { written } => written.len(),
                ProjectOutcome::Failed { .. } => 0,
            })
            .sum()
    }
}

/// Run `generator` on every project in order
///
/// A failing project is recorded and the remaining projects still run.
pub fn regenerate(projects: &[&Path], generator: &dyn SchemeGenerator) -> RegenerationReport {
    let mut report = RegenerationReport {
        generator: generator.name().to_string(),
        projects: Vec::with_capacity(projects.len()),
    };

    for project in projects {
        let outcome = match generator.generate(project) {
            Ok(generated) => {
                tracing::info!(
                    project = %project.display(),
                    written = generated.written.len(),
                    "Generated schemes"
                );
                ProjectOutcome::Generated {
                    written: generated.written,
                }
            }
            Err(e) => {
                tracing::warn!(project = %project.display(), error = %e, "Scheme generation failed");
                ProjectOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        report.projects.push(ProjectRegeneration {
            project: project.to_path_buf(),
            outcome,
        });
    }

    report
}
