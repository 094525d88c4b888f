//! ensure-shared-schemes
//!
//! Makes sure an Xcode project or workspace has at least one shared scheme,
//! regenerating schemes when none is shared.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use schemekit_cli::output::{format_duration, Status};
use schemekit_core::config::{Config, GeneratorStrategy};
use schemekit_core::error::exit_codes;
use schemekit_telemetry::{TelemetryConfig, Timer};
use schemekit_xcode::container::resolve_container_path;
use schemekit_xcode::generator;
use schemekit_xcode::report::{self, JsonReport};
use schemekit_xcode::{Discovery, DiscoveryOptions};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ensure-shared-schemes")]
#[command(about = "Make sure an Xcode project or workspace has shared schemes")]
#[command(version)]
struct Cli {
    /// Path to the .xcodeproj or .xcworkspace
    #[arg(long, env = "project_path")]
    project_path: PathBuf,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// How missing shared schemes are generated (overrides the config file)
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Auto,
    Recreate,
    ShareUserSchemes,
}

impl From<Strategy> for GeneratorStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Auto => GeneratorStrategy::Auto,
            Strategy::Recreate => GeneratorStrategy::Recreate,
            Strategy::ShareUserSchemes => GeneratorStrategy::ShareUserSchemes,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    schemekit_telemetry::init_with_config(TelemetryConfig::from_verbosity(cli.verbose, cli.quiet))?;

    let exit_code = run(&cli);
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> i32 {
    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            return e.exit_code();
        }
    };
    if let Some(path) = &config.path {
        tracing::debug!(config = %path, "Loaded configuration");
    }
    if let Some(strategy) = cli.strategy {
        config.schema.generator.strategy = strategy.into();
    }

    let container = match resolve_container_path(&cli.project_path) {
        Ok(path) => path,
        Err(e) => {
            Status::error(&e.to_string());
            return e.exit_code();
        }
    };
    tracing::info!(container = %container.display(), "Checking shared schemes");

    let generator = generator::from_config(&config.schema.generator);
    let mut discovery = Discovery::new(
        DiscoveryOptions::from(&config.schema.discovery),
        generator.as_ref(),
    );

    let timer = Timer::start("discovery");
    let result = discovery.run(&container);
    let elapsed = timer.stop();

    match result {
        Ok(outcome) => {
            match cli.format {
                Format::Json => print_json(&JsonReport::from_outcome(&container, &outcome)),
                Format::Text if !cli.quiet => {
                    report::print_outcome(&container, &outcome);
                    Status::info(&format!("Finished in {}", format_duration(elapsed)));
                }
                Format::Text => {}
            }
            exit_codes::SUCCESS
        }
        Err(error) => {
            match cli.format {
                Format::Json => print_json(&JsonReport::from_error(&container, &error)),
                Format::Text => report::print_failure(&container, &error),
            }
            error.exit_code()
        }
    }
}

fn print_json<T: Serialize>(report: &T) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{json}"),
        Err(e) => Status::error(&format!("Failed to serialize report: {e}")),
    }
}
