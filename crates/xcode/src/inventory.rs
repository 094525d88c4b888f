//! Scheme inventory of a container and its member projects

use crate::container::{Container, ContainerKind};
use crate::error::Result;
use crate::scheme::Scheme;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What to read while inventorying
#[derive(Debug, Clone)]
pub struct InventoryOptions {
    /// Open scheme files to detect test actions
    pub inspect_test_actions: bool,
}

impl Default for InventoryOptions {
    fn default() -> Self {
        Self {
            inspect_test_actions: true,
        }
    }
}

/// Schemes found in a single container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSchemes {
    pub container: PathBuf,
    pub kind: ContainerKind,
    pub schemes: Vec<Scheme>,
}

impl ContainerSchemes {
    pub fn shared(&self) -> impl Iterator<Item = &Scheme> {
        self.schemes.iter().filter(|s| s.is_shared())
    }

    pub fn has_shared(&self) -> bool {
        self.shared().next().is_some()
    }
}

/// Every scheme of a container, grouped by owning container
///
/// For a workspace the first entry is the workspace itself, followed by its
/// present member projects in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryResult {
    containers: Vec<ContainerSchemes>,
    skipped: Vec<PathBuf>,
}

impl DiscoveryResult {
    pub fn containers(&self) -> &[ContainerSchemes] {
        &self.containers
    }

    /// Workspace members that were not present on disk
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    pub fn get(&self, container: &Path) -> Option<&ContainerSchemes> {
        self.containers.iter().find(|c| c.container == container)
    }

    pub fn shared_schemes(&self) -> impl Iterator<Item = &Scheme> {
        self.containers.iter().flat_map(|c| c.shared())
    }

    pub fn shared_count(&self) -> usize {
        self.shared_schemes().count()
    }

    pub fn has_shared(&self) -> bool {
        self.shared_schemes().next().is_some()
    }

    pub fn scheme_count(&self) -> usize {
        self.containers.iter().map(|c| c.schemes.len()).sum()
    }

    /// `(container, name, shared)` triples in inventory order
    pub fn scheme_names(&self) -> Vec<(PathBuf, String, bool)> {
        self.containers
            .iter()
            .flat_map(|c| {
                c.schemes
                    .iter()
                    .map(|s| (c.container.clone(), s.name().to_string(), s.is_shared()))
            })
            .collect()
    }

    /// Inventoried projects with no shared scheme of their own
    pub fn projects_without_shared(&self) -> Vec<&Path> {
        self.containers
            .iter()
            .filter(|c| c.kind == ContainerKind::Project && !c.has_shared())
            .map(|c| c.container.as_path())
            .collect()
    }
}

/// Read every scheme of `container` from disk
///
/// Members missing from disk are recorded in [`DiscoveryResult::skipped`]
/// and never abort the inventory.
pub fn inventory(container: &Container, options: &InventoryOptions) -> Result<DiscoveryResult> {
    let mut result = DiscoveryResult::default();

    if let Container::Workspace(workspace, _) = container {
        result.containers.push(ContainerSchemes {
            container: workspace.path().to_path_buf(),
            kind: ContainerKind::Workspace,
            schemes: workspace.schemes(options)?,
        });
    }

    let (projects, missing) = container.projects();
    for project in projects {
        let schemes = project.schemes(options)?;
        tracing::debug!(
            project = %project.path().display(),
            schemes = schemes.len(),
            "Inventoried project"
        );
        result.containers.push(ContainerSchemes {
            container: project.path().to_path_buf(),
            kind: ContainerKind::Project,
            schemes,
        });
    }
    result.skipped = missing;

    Ok(result)
}
