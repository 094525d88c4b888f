//! Project and workspace containers
//!
//! Whether a path is a project or a workspace is decided by its directory
//! extension alone; file contents are never inspected.

use crate::error::{Result, SchemeError};
use crate::inventory::{self, DiscoveryResult, InventoryOptions};
use crate::scheme::{self, Scheme};
use crate::workspace::{self, ProjectReference, ResolveOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const PROJECT_EXTENSION: &str = "xcodeproj";
pub const WORKSPACE_EXTENSION: &str = "xcworkspace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Project,
    Workspace,
}

/// Check if a path has the `.xcodeproj` extension
pub fn is_project(path: &Path) -> bool {
    has_extension(path, PROJECT_EXTENSION)
}

/// Check if a path has the `.xcworkspace` extension
pub fn is_workspace(path: &Path) -> bool {
    has_extension(path, WORKSPACE_EXTENSION)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

/// Classify an existing path as a project or a workspace
pub fn classify(path: &Path) -> Result<ContainerKind> {
    if !path.exists() {
        return Err(SchemeError::PathNotFound(path.to_path_buf()));
    }

    if is_project(path) {
        Ok(ContainerKind::Project)
    } else if is_workspace(path) {
        Ok(ContainerKind::Workspace)
    } else {
        Err(SchemeError::InvalidContainerKind(path.to_path_buf()))
    }
}

/// Resolve a user-supplied container path to an absolute one
pub fn resolve_container_path(raw: &Path) -> Result<PathBuf> {
    if raw.as_os_str().is_empty() {
        return Err(SchemeError::PathNotFound(raw.to_path_buf()));
    }

    let absolute = std::path::absolute(raw).map_err(|e| SchemeError::io(raw, e))?;
    Ok(workspace::normalize(&absolute))
}

/// An opened `.xcodeproj`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectHandle {
    path: PathBuf,
}

impl ProjectHandle {
    /// Open a project directory
    pub fn open(path: &Path) -> Result<Self> {
        if classify(path)? != ContainerKind::Project {
            return Err(SchemeError::InvalidContainerKind(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schemes stored in this project, read fresh from disk
    pub fn schemes(&self, options: &InventoryOptions) -> Result<Vec<Scheme>> {
        scheme::list_schemes(&self.path, options.inspect_test_actions)
    }
}

/// An opened `.xcworkspace`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceHandle {
    path: PathBuf,
}

impl WorkspaceHandle {
    /// Open a workspace directory
    pub fn open(path: &Path) -> Result<Self> {
        if classify(path)? != ContainerKind::Workspace {
            return Err(SchemeError::InvalidContainerKind(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Member projects in manifest order, tagged present or absent
    pub fn project_references(&self, options: &ResolveOptions) -> Result<Vec<ProjectReference>> {
        workspace::resolve_references(&self.path, options)
    }

    /// Schemes stored in the workspace itself
    pub fn schemes(&self, options: &InventoryOptions) -> Result<Vec<Scheme>> {
        scheme::list_schemes(&self.path, options.inspect_test_actions)
    }
}

/// A classified container; workspaces carry their resolved members
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Project(ProjectHandle),
    Workspace(WorkspaceHandle, Vec<ProjectReference>),
}

impl Container {
    /// Classify and open a container, resolving workspace members
    pub fn open(path: &Path, options: &ResolveOptions) -> Result<Self> {
        match classify(path)? {
            ContainerKind::Project => Ok(Self::Project(ProjectHandle::open(path)?)),
            ContainerKind::Workspace => {
                let workspace = WorkspaceHandle::open(path)?;
                let references = workspace.project_references(options)?;
                Ok(Self::Workspace(workspace, references))
            }
        }
    }

    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Project(_) => ContainerKind::Project,
            Self::Workspace(..) => ContainerKind::Workspace,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Project(project) => project.path(),
            Self::Workspace(workspace, _) => workspace.path(),
        }
    }

    /// Every scheme of the container and its present members
    pub fn schemes(&self, options: &InventoryOptions) -> Result<DiscoveryResult> {
        inventory::inventory(self, options)
    }

    /// Present projects, and the paths of members missing from disk
    pub fn projects(&self) -> (Vec<ProjectHandle>, Vec<PathBuf>) {
        match self {
            Self::Project(project) => (vec![project.clone()], Vec::new()),
            Self::Workspace(_, references) => {
                let mut present = Vec::new();
                let mut missing = Vec::new();
                for reference in references {
                    if reference.exists {
                        present.push(ProjectHandle {
                            path: reference.path.clone(),
                        });
                    } else {
                        missing.push(reference.path.clone());
                    }
                }
                (present, missing)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_project, make_workspace};

    #[test]
    fn test_classify_project_and_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let project = make_project(dir.path(), "App");
        let workspace = make_workspace(dir.path(), "App", &[]);

        assert_eq!(classify(&project).unwrap(), ContainerKind::Project);
        assert_eq!(classify(&workspace).unwrap(), ContainerKind::Workspace);
    }

    #[test]
    fn test_classify_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = classify(&dir.path().join("Missing.xcodeproj")).unwrap_err();
        assert!(matches!(err, SchemeError::PathNotFound(_)));
    }

    #[test]
    fn test_classify_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Package.swift");
        std::fs::write(&path, "// swift-tools-version:5.9").unwrap();

        let err = classify(&path).unwrap_err();
        assert!(matches!(err, SchemeError::InvalidContainerKind(_)));
    }

    #[test]
    fn test_resolve_relative_path() {
        let resolved = resolve_container_path(Path::new("App.xcodeproj")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("App.xcodeproj"));
    }

    #[test]
    fn test_resolve_folds_dot_components() {
        let resolved = resolve_container_path(Path::new("../ios/./App.xcworkspace")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("ios/App.xcworkspace"));
        assert!(resolved
            .components()
            .all(|c| !matches!(c, std::path::Component::ParentDir | std::path::Component::CurDir)));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_absolute_path_with_parent_dirs() {
        let resolved = resolve_container_path(Path::new("/src/ios/build/../App.xcworkspace")).unwrap();
        assert_eq!(resolved, PathBuf::from("/src/ios/App.xcworkspace"));
    }

    #[test]
    fn test_resolve_empty_path() {
        let err = resolve_container_path(Path::new("")).unwrap_err();
        assert!(matches!(err, SchemeError::PathNotFound(_)));
    }

    #[test]
    fn test_project_handle_rejects_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = make_workspace(dir.path(), "App", &[]);

        let err = ProjectHandle::open(&workspace).unwrap_err();
        assert!(matches!(err, SchemeError::InvalidContainerKind(_)));
    }

    #[test]
    fn test_container_projects_splits_missing() {
        let dir = tempfile::tempdir().unwrap();
        let present = make_project(dir.path(), "A");
        let workspace = make_workspace(
            dir.path(),
            "App",
            &["group:A.xcodeproj", "group:B.xcodeproj"],
        );

        let container = Container::open(&workspace, &ResolveOptions::default()).unwrap();
        assert_eq!(container.kind(), ContainerKind::Workspace);

        let (projects, missing) = container.projects();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].path(), present.as_path());
        assert_eq!(missing, vec![dir.path().join("B.xcodeproj")]);
    }

    #[test]
    fn test_project_container_has_single_project() {
        let dir = tempfile::tempdir().unwrap();
        let project = make_project(dir.path(), "App");

        let container = Container::open(&project, &ResolveOptions::default()).unwrap();
        let (projects, missing) = container.projects();
        assert_eq!(projects.len(), 1);
        assert!(missing.is_empty());
        assert_eq!(container.path(), project.as_path());
    }
}
