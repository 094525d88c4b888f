//! Scheme files and their storage location
//!
//! A scheme is shared when its file lives in
//! `<container>/xcshareddata/xcschemes/` and user-private when it lives in
//! `<container>/xcuserdata/<user>.xcuserdatad/xcschemes/`. Nothing else
//! about the file affects that classification.

use crate::error::{Result, SchemeError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const SCHEME_EXTENSION: &str = "xcscheme";
pub const SHARED_DATA_DIR: &str = "xcshareddata";
pub const USER_DATA_DIR: &str = "xcuserdata";
pub const USER_DATA_SUFFIX: &str = ".xcuserdatad";
pub const SCHEMES_DIR: &str = "xcschemes";

static TEST_ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<TestAction\b[^>]*[^/]>(.*?)</TestAction>").expect("valid test action regex")
});

static XCTEST_BUNDLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"BuildableName\s*=\s*"[^"]+\.xctest""#).expect("valid buildable regex")
});

/// Where a scheme file is stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SchemeLocation {
    Shared,
    User { user: String },
}

impl SchemeLocation {
    /// Classify a scheme file path by its parent directories
    pub fn of(file: &Path) -> Option<Self> {
        if file.extension()? != SCHEME_EXTENSION {
            return None;
        }

        let schemes_dir = file.parent()?;
        if schemes_dir.file_name()? != SCHEMES_DIR {
            return None;
        }

        let data_dir = schemes_dir.parent()?;
        let data_name = data_dir.file_name()?.to_str()?;
        if data_name == SHARED_DATA_DIR {
            return Some(Self::Shared);
        }

        let user = data_name.strip_suffix(USER_DATA_SUFFIX)?;
        if data_dir.parent()?.file_name()? == USER_DATA_DIR {
            return Some(Self::User {
                user: user.to_string(),
            });
        }

        None
    }
}

/// A scheme read from disk
///
/// Immutable: sharing a scheme writes a new file and yields a new `Scheme`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scheme {
    name: String,
    owner_container_path: PathBuf,
    location: SchemeLocation,
    has_test_action: bool,
    #[serde(skip)]
    file: PathBuf,
}

impl Scheme {
    /// Build a scheme from a file under `container`; `None` if the file is not
    /// in a scheme directory
    pub fn from_file(container: &Path, file: &Path, inspect_test_action: bool) -> Option<Self> {
        let location = SchemeLocation::of(file)?;
        let name = file.file_stem()?.to_string_lossy().to_string();
        let has_test_action = inspect_test_action && file_has_test_action(file);

        Some(Self {
            name,
            owner_container_path: container.to_path_buf(),
            location,
            has_test_action,
            file: file.to_path_buf(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner_container_path(&self) -> &Path {
        &self.owner_container_path
    }

    pub fn location(&self) -> &SchemeLocation {
        &self.location
    }

    pub fn is_shared(&self) -> bool {
        self.location == SchemeLocation::Shared
    }

    /// Informational only; never affects shared/user classification
    pub fn has_test_action(&self) -> bool {
        self.has_test_action
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Whether scheme XML declares a test action with an `.xctest` testable
pub fn contains_test_action(content: &str) -> bool {
    TEST_ACTION_RE
        .captures_iter(content)
        .any(|cap| XCTEST_BUNDLE_RE.is_match(&cap[1]))
}

fn file_has_test_action(file: &Path) -> bool {
    match fs::read_to_string(file) {
        Ok(content) => contains_test_action(&content),
        Err(e) => {
            tracing::warn!(file = %file.display(), error = %e, "Could not read scheme file");
            false
        }
    }
}

/// Directory holding a container's shared schemes
pub fn shared_schemes_dir(container: &Path) -> PathBuf {
    container.join(SHARED_DATA_DIR).join(SCHEMES_DIR)
}

/// List every scheme file of a container, shared first, then by name
pub fn list_schemes(container: &Path, inspect_test_actions: bool) -> Result<Vec<Scheme>> {
    let root = glob::Pattern::escape(&container.to_string_lossy());
    let patterns = [
        format!("{root}/{SHARED_DATA_DIR}/{SCHEMES_DIR}/*.{SCHEME_EXTENSION}"),
        format!("{root}/{USER_DATA_DIR}/*{USER_DATA_SUFFIX}/{SCHEMES_DIR}/*.{SCHEME_EXTENSION}"),
    ];

    let mut schemes = Vec::new();
    for pattern in &patterns {
        let entries = glob::glob(pattern).map_err(|e| {
            SchemeError::Core(schemekit_core::Error::validation(format!(
                "invalid scheme pattern {pattern}: {e}"
            )))
        })?;

        for entry in entries {
            let file = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                SchemeError::io(path, e.into_error())
            })?;
            if !file.is_file() {
                continue;
            }
            if let Some(scheme) = Scheme::from_file(container, &file, inspect_test_actions) {
                schemes.push(scheme);
            }
        }
    }

    schemes.sort_by(|a, b| {
        (!a.is_shared(), &a.name, &a.location).cmp(&(!b.is_shared(), &b.name, &b.location))
    });

    Ok(schemes)
}
