use schemekit_core::error::{exit_codes, ErrorCode};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemeError>;

/// Step of a discovery run, used to say how far a failed run got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Input,
    Manifest,
    Inventory,
    Regeneration,
    Verification,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::Manifest => "manifest",
            Stage::Inventory => "inventory",
            Stage::Regeneration => "regeneration",
            Stage::Verification => "verification",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SchemeError {
    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("path ({}) has an invalid extension, expected '.xcodeproj' or '.xcworkspace'", .0.display())]
    InvalidContainerKind(PathBuf),

    #[error("workspace manifest does not exist at: {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("failed to parse workspace manifest {}: {reason}", .path.display())]
    ManifestParseError { path: PathBuf, reason: String },

    #[error("failed to generate schemes for {}: {reason}", .project.display())]
    GenerationFailed { project: PathBuf, reason: String },

    #[error("no shared schemes found in {} after {attempts} verification attempt(s)", .container.display())]
    NoSchemesGenerated { container: PathBuf, attempts: u32 },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] schemekit_core::Error),
}

impl SchemeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn generation(project: &Path, reason: impl Into<String>) -> Self {
        Self::GenerationFailed {
            project: project.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Stage this kind of error belongs to, if it is tied to one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::PathNotFound(_) | Self::InvalidContainerKind(_) => Some(Stage::Input),
            Self::ManifestMissing(_) | Self::ManifestParseError { .. } => Some(Stage::Manifest),
            Self::GenerationFailed { .. } => Some(Stage::Regeneration),
            Self::NoSchemesGenerated { .. } => Some(Stage::Verification),
            Self::Io { .. } | Self::Core(_) => None,
        }
    }

    /// Path the error is about, when there is one
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PathNotFound(path)
            | Self::InvalidContainerKind(path)
            | Self::ManifestMissing(path)
            | Self::ManifestParseError { path, .. }
            | Self::Io { path, .. } => Some(path),
            Self::GenerationFailed { project, .. } => Some(project),
            Self::NoSchemesGenerated { container, .. } => Some(container),
            Self::Core(_) => None,
        }
    }

    /// Structured code, shared with `schemekit_core` errors
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PathNotFound(_) => ErrorCode::FileNotFound,
            Self::InvalidContainerKind(_) => ErrorCode::InvalidContainer,
            Self::ManifestMissing(_) | Self::ManifestParseError { .. } => ErrorCode::ManifestError,
            Self::GenerationFailed { .. } => ErrorCode::GenerationFailed,
            Self::NoSchemesGenerated { .. } => ErrorCode::NoSchemesGenerated,
            Self::Io { .. } => ErrorCode::IoError,
            Self::Core(err) => err.code,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PathNotFound(_) | Self::InvalidContainerKind(_) => exit_codes::INPUT_ERROR,
            Self::ManifestMissing(_) | Self::ManifestParseError { .. } => {
                exit_codes::MANIFEST_ERROR
            }
            Self::GenerationFailed { .. } => exit_codes::GENERATION_FAILED,
            Self::NoSchemesGenerated { .. } => exit_codes::NO_SCHEMES_GENERATED,
            Self::Io { .. } => exit_codes::FAILURE,
            Self::Core(err) => err.exit_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_exit_code() {
        let err = SchemeError::InvalidContainerKind(PathBuf::from("/tmp/App.txt"));
        assert_eq!(err.stage(), Some(Stage::Input));
        assert_eq!(err.exit_code(), exit_codes::INPUT_ERROR);

        let err = SchemeError::NoSchemesGenerated {
            container: PathBuf::from("/tmp/App.xcodeproj"),
            attempts: 3,
        };
        assert_eq!(err.stage(), Some(Stage::Verification));
        assert_eq!(err.exit_code(), exit_codes::NO_SCHEMES_GENERATED);
        assert!(err.to_string().contains("after 3 verification attempt(s)"));
        assert_eq!(err.code().to_string(), "E6004");
    }

    #[test]
    fn test_io_error_has_no_stage() {
        let err = SchemeError::io(
            "/tmp/App.xcodeproj",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.stage(), None);
        assert_eq!(err.path(), Some(Path::new("/tmp/App.xcodeproj")));
    }
}
