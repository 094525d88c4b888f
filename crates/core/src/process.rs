//! Process execution utilities
//!
//! Provides a unified interface for running external commands with:
//! - Output capture
//! - Directory context
//! - Environment variables

use crate::error::{Error, ErrorCode, Result};
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// Exit code of the command
    pub exit_code: i32,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandResult {
    /// Create from std::process::Output
    pub fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Get combined output (stdout + stderr)
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// A command invocation with optional directory and environment
#[derive(Debug, Clone, Default)]
pub struct CommandSpec<'a> {
    /// Program to execute
    pub program: &'a str,
    /// Arguments
    pub args: Vec<&'a str>,
    /// Working directory
    pub dir: Option<&'a Path>,
    /// Extra environment variables, layered over the inherited environment
    pub env: Vec<(&'a str, String)>,
}

impl<'a> CommandSpec<'a> {
    /// Start a new command spec
    pub fn new(program: &'a str) -> Self {
        Self {
            program,
            ..Self::default()
        }
    }

    /// Append arguments
    pub fn args(mut self, args: &[&'a str]) -> Self {
        self.args.extend_from_slice(args);
        self
    }

    /// Set the working directory
    pub fn current_dir(mut self, dir: &'a Path) -> Self {
        self.dir = Some(dir);
        self
    }

    /// Add an environment variable
    pub fn env(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.env.push((key, value.into()));
        self
    }

    /// Run the command and capture its output
    pub fn run(&self) -> Result<CommandResult> {
        let mut cmd = Command::new(self.program);
        cmd.args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::command_not_found(self.program)
            } else {
                Error::process(format!("Failed to execute {}: {}", self.program, e))
            }
        })?;

        Ok(CommandResult::from_output(output))
    }

    /// Run the command and fail unless it exits with status 0
    pub fn run_checked(&self) -> Result<CommandResult> {
        let result = self.run()?;
        if result.success {
            return Ok(result);
        }

        let output = result.combined_output();
        let message = if output.trim().is_empty() {
            format!("{} exited with status {}", self.program, result.exit_code)
        } else {
            format!(
                "{} exited with status {}: {}",
                self.program,
                result.exit_code,
                output.trim()
            )
        };
        Err(Error::new(ErrorCode::CommandFailed, message))
    }
}

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}
