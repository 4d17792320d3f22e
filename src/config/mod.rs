//! Configuration management for azdterm
//!
//! This module holds the configuration model for locating the external CLI
//! and for the terminals that host its tasks, plus validation. Loading and
//! saving live in [`loader`].

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Terminal title used when none is configured
pub const DEFAULT_TERMINAL_TITLE: &str = "Azure Dev CLI";

/// Program name of the Azure Developer CLI
pub const DEFAULT_PROGRAM: &str = "azd";

/// Main configuration structure for azdterm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External CLI configuration
    pub cli: CliConfig,

    /// Terminal configuration
    pub terminal: TerminalConfig,
}

impl Config {
    /// Validate every section of the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cli.validate()?;
        self.terminal.validate()
    }
}

/// How the external CLI is located and invoked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Program name searched for in PATH
    pub program: String,

    /// Explicit executable path, takes precedence over the PATH search
    pub executable: Option<PathBuf>,

    /// Arguments placed before every subcommand
    pub global_args: Vec<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            executable: None,
            global_args: Vec::new(),
        }
    }
}

impl CliConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram);
        }
        if let Some(path) = &self.executable {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidExecutable(path.clone()));
            }
        }
        Ok(())
    }
}

/// Terminal-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Title given to terminals that host CLI tasks
    pub title: String,

    /// Terminal rows
    pub rows: u16,

    /// Terminal columns
    pub cols: u16,

    /// Working directory for spawned tasks (current directory when unset)
    pub working_directory: Option<PathBuf>,

    /// Extra environment variables for spawned tasks
    pub env: HashMap<String, String>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TERMINAL_TITLE.to_string(),
            rows: 24,
            cols: 80,
            working_directory: None,
            env: HashMap::new(),
        }
    }
}

impl TerminalConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::EmptyTitle);
        }
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::InvalidDimensions(self.cols, self.rows));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CLI program name cannot be empty")]
    EmptyProgram,

    #[error("Invalid executable path: {0:?}")]
    InvalidExecutable(PathBuf),

    #[error("Terminal title cannot be empty")]
    EmptyTitle,

    #[error("Invalid terminal size: {0}x{1} (both must be non-zero)")]
    InvalidDimensions(u16, u16),
}

impl ConfigError {
    /// Dotted path of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::EmptyProgram => "cli.program",
            ConfigError::InvalidExecutable(_) => "cli.executable",
            ConfigError::EmptyTitle => "terminal.title",
            ConfigError::InvalidDimensions(..) => "terminal.rows/cols",
        }
    }
}
