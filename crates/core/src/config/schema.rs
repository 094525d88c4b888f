//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Scheme discovery and verification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Number of post-regeneration inventory attempts
    #[serde(default = "default_verify_attempts")]
    pub verify_attempts: u32,

    /// Seconds to wait between verification attempts
    #[serde(default = "default_verify_delay_secs")]
    pub verify_delay_secs: u64,

    /// Skip CocoaPods-owned `Pods/Pods.xcodeproj` workspace members
    #[serde(default = "default_true")]
    pub skip_pods: bool,

    /// Read scheme files to detect test actions
    #[serde(default = "default_true")]
    pub inspect_test_actions: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            verify_attempts: default_verify_attempts(),
            verify_delay_secs: default_verify_delay_secs(),
            skip_pods: true,
            inspect_test_actions: true,
        }
    }
}

impl DiscoveryConfig {
    /// Delay between verification attempts
    pub fn verify_delay(&self) -> Duration {
        Duration::from_secs(self.verify_delay_secs)
    }
}

fn default_verify_attempts() -> u32 {
    3
}

fn default_verify_delay_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

/// How missing shared schemes are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorStrategy {
    /// Share existing user schemes, recreating defaults when there are none
    #[default]
    Auto,
    /// Recreate default schemes from the project targets
    Recreate,
    /// Only share existing user schemes
    ShareUserSchemes,
}

/// External scheme generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub strategy: GeneratorStrategy,

    /// Ruby interpreter used to run the xcodeproj script
    #[serde(default = "default_ruby")]
    pub ruby: String,

    /// Install the xcodeproj gem through Bundler before running the script
    #[serde(default = "default_true")]
    pub use_bundler: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strategy: GeneratorStrategy::default(),
            ruby: default_ruby(),
            use_bundler: true,
        }
    }
}

fn default_ruby() -> String {
    "ruby".to_string()
}
