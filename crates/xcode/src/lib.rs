//! Xcode shared scheme discovery and regeneration
//!
//! CI pipelines need at least one shared scheme to build an Xcode project.
//! This crate finds the schemes of a project or workspace and, when none of
//! them is shared, regenerates them and checks the result:
//!
//! - [`container`]: classify a path as project or workspace and open it
//! - [`workspace`]: resolve a workspace's member projects from its manifest
//! - [`scheme`]: scheme files and their shared/user location
//! - [`inventory`]: collect every scheme of a container and its members
//! - [`generator`]: external scheme generators (xcodeproj gem, user scheme sharing)
//! - [`regenerate`]: run a generator over the projects lacking shared schemes
//! - [`discovery`]: the inventory → regenerate → verify state machine
//! - [`report`]: text and JSON reports

pub mod container;
pub mod discovery;
pub mod error;
pub mod generator;
pub mod inventory;
pub mod regenerate;
pub mod report;
pub mod scheme;
pub mod workspace;

pub use container::{Container, ContainerKind};
pub use discovery::{Discovery, DiscoveryError, DiscoveryOptions, DiscoveryOutcome, DiscoveryState};
pub use error::{Result, SchemeError, Stage};
pub use generator::{Generated, SchemeGenerator};
pub use inventory::{ContainerSchemes, DiscoveryResult, InventoryOptions};
pub use regenerate::RegenerationReport;
pub use scheme::{Scheme, SchemeLocation};

#[cfg(test)]
pub(crate) mod testutil;
