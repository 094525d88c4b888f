//! Core utilities for the schemekit Xcode scheme tools
//!
//! This crate provides shared functionality used by the scheme engine and the CLI:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Process execution**: Command execution with captured output, directories and env
//! - **Retry**: Bounded fixed-delay retries with a retry predicate
//! - **Configuration**: TOML-based configuration with defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use schemekit_core::config::Config;
//! use schemekit_core::retry::{retry_when, RetryConfig};
//!
//! let config = Config::load(None).expect("config");
//! let policy = RetryConfig::fixed(
//!     config.schema.discovery.verify_attempts,
//!     config.schema.discovery.verify_delay(),
//! );
//!
//! let result = retry_when(policy, || Ok::<_, String>("visible"), |_| true);
//! assert!(result.is_ok());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;
pub mod retry;

pub use error::{Error, ErrorCode, Result};
