//! Configuration loading and schema definitions
//!
//! Settings for scheme discovery and regeneration.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
