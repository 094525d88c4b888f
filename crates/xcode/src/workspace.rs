//! Workspace member resolution
//!
//! Reads `contents.xcworkspacedata` and turns its `FileRef` entries into
//! absolute project paths, in declaration order. `Group` elements nest, and
//! a `group:` location is relative to the enclosing groups.
//!
//! A member that is missing on disk is not an error here; it is returned
//! with `exists = false` and the caller decides what to do with it.

use crate::container::PROJECT_EXTENSION;
use crate::error::{Result, SchemeError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "contents.xcworkspacedata";

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<\s*(/?)\s*(Workspace|Group|FileRef)\b([^>]*)>").expect("valid tag regex")
});

static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\blocation\s*=\s*"([^"]*)""#).expect("valid location regex"));

/// A member project declared by a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReference {
    pub path: PathBuf,
    pub exists: bool,
}

/// Which references to keep
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Drop CocoaPods' generated `Pods/Pods.xcodeproj`
    pub skip_pods: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { skip_pods: true }
    }
}

/// A `location` attribute, split into its kind and path
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    /// Relative to the enclosing group
    Group(String),
    /// Relative to the directory holding the workspace
    Container(String),
    Absolute(String),
    /// The workspace itself
    SelfRef,
    Other(String, String),
}

impl Location {
    fn parse(raw: &str) -> std::result::Result<Self, String> {
        let (kind, path) = raw
            .split_once(':')
            .ok_or_else(|| format!("location \"{raw}\" has no type prefix"))?;
        let path = unescape_xml(path);

        Ok(match kind {
            "group" => Self::Group(path),
            "container" => Self::Container(path),
            "absolute" => Self::Absolute(path),
            "self" => Self::SelfRef,
            other => Self::Other(other.to_string(), path),
        })
    }

    /// Path relative to the workspace directory (or absolute)
    fn resolve(&self, group_base: &Path) -> Option<PathBuf> {
        match self {
            Self::Group(path) => Some(group_base.join(path)),
            Self::Container(path) | Self::Absolute(path) => Some(PathBuf::from(path)),
            Self::SelfRef | Self::Other(..) => None,
        }
    }
}

/// Parse manifest content into file reference paths, relative to the
/// workspace's directory unless absolute
fn parse_manifest(content: &str) -> std::result::Result<Vec<PathBuf>, String> {
    let mut saw_workspace = false;
    let mut groups: Vec<PathBuf> = Vec::new();
    let mut files = Vec::new();

    for cap in TAG_RE.captures_iter(content) {
        let closing = !cap[1].is_empty();
        let element = &cap[2];
        let attributes = cap[3].trim_end();
        let self_closing = attributes.ends_with('/');

        match (element, closing) {
            ("Workspace", false) => saw_workspace = true,
            ("Workspace", true) | ("FileRef", true) => {}
            ("Group", true) => {
                groups
                    .pop()
                    .ok_or_else(|| "unbalanced </Group>".to_string())?;
            }
            ("Group", false) => {
                let base = groups.last().cloned().unwrap_or_default();
                let group_base = match location_attribute(attributes)? {
                    Some(location) => location.resolve(&base).unwrap_or(base),
                    None => base,
                };
                if !self_closing {
                    groups.push(group_base);
                }
            }
            ("FileRef", false) => {
                let Some(location) = location_attribute(attributes)? else {
                    continue;
                };
                let base = groups.last().cloned().unwrap_or_default();
                match location.resolve(&base) {
                    Some(path) => files.push(path),
                    None => {
                        tracing::debug!(?location, "Ignoring workspace file reference");
                    }
                }
            }
            _ => {}
        }
    }

    if !saw_workspace {
        return Err("missing <Workspace> root element".to_string());
    }
    if !groups.is_empty() {
        return Err(format!("{} unclosed <Group> element(s)", groups.len()));
    }

    Ok(files)
}

fn location_attribute(attributes: &str) -> std::result::Result<Option<Location>, String> {
    LOCATION_RE
        .captures(attributes)
        .map(|cap| Location::parse(&cap[1]))
        .transpose()
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Lexically remove `.` and `..` components
/// Drop `.` and fold `..` components without touching the filesystem
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn is_pods_project(path: &Path) -> bool {
    path.ends_with(Path::new("Pods").join("Pods.xcodeproj"))
}

/// Resolve the member projects of a workspace
pub fn resolve_references(workspace: &Path, options: &ResolveOptions) -> Result<Vec<ProjectReference>> {
    let manifest = workspace.join(MANIFEST_FILE_NAME);
    let content = match fs::read_to_string(&manifest) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SchemeError::ManifestMissing(manifest));
        }
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(SchemeError::ManifestParseError {
                path: manifest,
                reason: "manifest is not valid UTF-8".to_string(),
            });
        }
        Err(e) => return Err(SchemeError::io(manifest, e)),
    };

    let locations = parse_manifest(&content).map_err(|reason| SchemeError::ManifestParseError {
        path: manifest.clone(),
        reason,
    })?;

    let workspace_dir = workspace.parent().unwrap_or(Path::new(""));
    let mut seen = HashSet::new();
    let mut references = Vec::new();

    for location in locations {
        if location.extension().is_none_or(|ext| ext != PROJECT_EXTENSION) {
            continue;
        }

        let path = normalize(&workspace_dir.join(location));
        if options.skip_pods && is_pods_project(&path) {
            tracing::debug!(path = %path.display(), "Skipping CocoaPods project");
            continue;
        }
        if !seen.insert(path.clone()) {
            continue;
        }

        let exists = path.exists();
        references.push(ProjectReference { path, exists });
    }

    tracing::debug!(
        workspace = %workspace.display(),
        members = references.len(),
        "Resolved workspace members"
    );

    Ok(references)
}
