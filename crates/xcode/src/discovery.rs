//! Shared scheme discovery state machine
//!
//! ```text
//! Initial → Inventoried → SharedFound → Success
//!                       ↘ NeedsRegeneration → Regenerating → Verified → Success
//!                                                                     ↘ Failure
//! ```
//!
//! Input and manifest errors move straight from `Initial` to `Failure`.
//! Verification re-reads the container from disk a bounded number of times,
//! because generated files may not be visible immediately.

use crate::container::Container;
use crate::error::{SchemeError, Stage};
use crate::generator::SchemeGenerator;
use crate::inventory::{DiscoveryResult, InventoryOptions};
use crate::regenerate::{self, RegenerationReport};
use crate::workspace::ResolveOptions;
use schemekit_core::config::DiscoveryConfig;
use schemekit_core::retry::{retry_when, RetryConfig, RetryError};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryState {
    Initial,
    Inventoried,
    SharedFound,
    NeedsRegeneration,
    Regenerating,
    Verified,
    Success,
    Failure,
}

impl fmt::Display for DiscoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initial => "initial",
            Self::Inventoried => "inventoried",
            Self::SharedFound => "shared-found",
            Self::NeedsRegeneration => "needs-regeneration",
            Self::Regenerating => "regenerating",
            Self::Verified => "verified",
            Self::Success => "success",
            Self::Failure => "failure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub resolve: ResolveOptions,
    pub inventory: InventoryOptions,
    /// Attempts and delay for post-regeneration verification
    pub verify: RetryConfig,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

impl From<&DiscoveryConfig> for DiscoveryOptions {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            resolve: ResolveOptions {
                skip_pods: config.skip_pods,
            },
            inventory: InventoryOptions {
                inspect_test_actions: config.inspect_test_actions,
            },
            verify: RetryConfig::fixed(config.verify_attempts, config.verify_delay()),
        }
    }
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// Shared schemes already existed; nothing was generated
    SharedFound { inventory: DiscoveryResult },
    /// Schemes were regenerated and verified
    Regenerated {
        before: DiscoveryResult,
        regeneration: RegenerationReport,
        after: DiscoveryResult,
        attempts: u32,
    },
}

impl DiscoveryOutcome {
    /// The inventory the run finished with
    pub fn inventory(&self) -> &DiscoveryResult {
        match self {
            Self::SharedFound { inventory } => inventory,
            Self::Regenerated { after, .. } => after,
        }
    }

    pub fn regeneration(&self) -> Option<&RegenerationReport> {
        match self {
            Self::SharedFound { .. } => None,
            Self::Regenerated { regeneration, .. } => Some(regeneration),
        }
    }

    /// Members missing from disk, as seen by the first inventory
    pub fn skipped(&self) -> &[PathBuf] {
        match self {
            Self::SharedFound { inventory } => inventory.skipped(),
            Self::Regenerated { before, .. } => before.skipped(),
        }
    }
}

/// A failed run: the stage reached, the offending path, and the cause
#[derive(Error, Debug)]
#[error("{stage} stage failed for {}: {source}", .path.display())]
pub struct DiscoveryError {
    pub stage: Stage,
    pub path: PathBuf,
    #[source]
    pub source: SchemeError,
    /// Present when regeneration ran before the failure
    pub regeneration: Option<RegenerationReport>,
    /// Members missing from disk, when the inventory got that far
    pub skipped: Vec<PathBuf>,
}

impl DiscoveryError {
    fn new(default_stage: Stage, container: &Path, source: SchemeError) -> Self {
        Self {
            stage: source.stage().unwrap_or(default_stage),
            path: source.path().unwrap_or(container).to_path_buf(),
            source,
            regeneration: None,
            skipped: Vec::new(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.source.exit_code()
    }
}

enum Verification {
    NoShared,
    Failed(SchemeError),
}

/// Drives inventory, regeneration and verification for one container
pub struct Discovery<'g> {
    options: DiscoveryOptions,
    generator: &'g dyn SchemeGenerator,
    states: Vec<DiscoveryState>,
}

impl<'g> Discovery<'g> {
    pub fn new(options: DiscoveryOptions, generator: &'g dyn SchemeGenerator) -> Self {
        Self {
            options,
            generator,
            states: Vec::new(),
        }
    }

    /// States visited by the last run, in order
    pub fn states(&self) -> &[DiscoveryState] {
        &self.states
    }

    fn enter(&mut self, state: DiscoveryState) {
        tracing::debug!(%state, "Discovery state");
        self.states.push(state);
    }

    fn fail(&mut self, error: DiscoveryError) -> Result<DiscoveryOutcome, DiscoveryError> {
        self.enter(DiscoveryState::Failure);
        Err(error)
    }

    /// Ensure `container_path` ends up with at least one shared scheme
    pub fn run(&mut self, container_path: &Path) -> Result<DiscoveryOutcome, DiscoveryError> {
        self.states.clear();
        self.enter(DiscoveryState::Initial);

        let container = match Container::open(container_path, &self.options.resolve) {
            Ok(container) => container,
            Err(e) => return self.fail(DiscoveryError::new(Stage::Manifest, container_path, e)),
        };

        let before = match container.schemes(&self.options.inventory) {
            Ok(result) => result,
            Err(e) => return self.fail(DiscoveryError::new(Stage::Inventory, container_path, e)),
        };
        self.enter(DiscoveryState::Inventoried);

        for missing in before.skipped() {
            tracing::info!(project = %missing.display(), "Skipping project, as it is not present");
        }

        if before.has_shared() {
            tracing::info!(shared = before.shared_count(), "Shared schemes found");
            self.enter(DiscoveryState::SharedFound);
            self.enter(DiscoveryState::Success);
            return Ok(DiscoveryOutcome::SharedFound { inventory: before });
        }

        self.enter(DiscoveryState::NeedsRegeneration);
        let targets = before.projects_without_shared();
        tracing::info!(
            projects = targets.len(),
            generator = self.generator.name(),
            "No shared schemes, regenerating"
        );

        self.enter(DiscoveryState::Regenerating);
        let regeneration = regenerate::regenerate(&targets, self.generator);

        // Nothing was generated, so waiting cannot change what is on disk
        let policy = if regeneration.projects.is_empty() {
            RetryConfig::no_retry()
        } else {
            self.options.verify.clone()
        };
        let verified = retry_when(
            policy,
            || self.verify(container_path),
            |e| matches!(e, Verification::NoShared),
        );
        self.enter(DiscoveryState::Verified);

        match verified {
            Ok(result) => {
                tracing::info!(
                    shared = result.value.shared_count(),
                    attempts = result.attempts,
                    "Shared schemes verified"
                );
                self.enter(DiscoveryState::Success);
                Ok(DiscoveryOutcome::Regenerated {
                    before,
                    regeneration,
                    after: result.value,
                    attempts: result.attempts,
                })
            }
            Err(RetryError { error, attempts }) => {
                let source = match error {
                    Verification::NoShared => SchemeError::NoSchemesGenerated {
                        container: container_path.to_path_buf(),
                        attempts,
                    },
                    Verification::Failed(e) => e,
                };
                let mut error = DiscoveryError::new(Stage::Verification, container_path, source);
                error.regeneration = Some(regeneration);
                error.skipped = before.skipped().to_vec();
                self.fail(error)
            }
        }
    }

    /// Re-read the container from scratch and require a shared scheme
    fn verify(&self, container_path: &Path) -> Result<DiscoveryResult, Verification> {
        let result = Container::open(container_path, &self.options.resolve)
            .and_then(|container| container.schemes(&self.options.inventory))
            .map_err(Verification::Failed)?;

        if result.has_shared() {
            Ok(result)
        } else {
            tracing::debug!(container = %container_path.display(), "No shared schemes visible yet");
            Err(Verification::NoShared)
        }
    }
}
