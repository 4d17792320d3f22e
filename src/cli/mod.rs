//! External CLI invocation
//!
//! [`CommandBuilder`] assembles the token list for one invocation of the
//! external CLI. [`CliBuilderFactory`] is the seam that hands out builders
//! already pointing at the right executable; [`AzureDevCliFactory`] is the
//! implementation backed by configuration and a `PATH` lookup.

pub mod locate;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::CliConfig;
use crate::context::ActionContext;
use crate::error::{Error, Result};

/// Argument list for a single CLI invocation
///
/// The first token is always the program. Builders are consumed by
/// [`with_arg`](Self::with_arg) and [`build`](Self::build), so a finished
/// command line cannot be appended to afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuilder {
    tokens: Vec<String>,
}

impl CommandBuilder {
    /// Start a command line for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tokens: vec![program.into()],
        }
    }

    /// Append a single argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.tokens.push(arg.into());
        self
    }

    /// Append several arguments in order
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `flag value` when `value` is present
    pub fn with_optional_flag(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with_arg(flag).with_arg(value),
            None => self,
        }
    }

    /// The program this builder invokes
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// Finalize into a flat list of command-line tokens
    pub fn build(self) -> Vec<String> {
        self.tokens
    }
}

/// Source of command builders for the external CLI
#[async_trait]
pub trait CliBuilderFactory: Send + Sync {
    /// Create a builder for the external CLI, scoped to `context`
    ///
    /// # Errors
    /// Returns an error if the CLI cannot be located
    async fn create_cli(&self, context: &ActionContext) -> Result<CommandBuilder>;
}

/// Builder factory for the Azure Developer CLI
#[derive(Debug, Clone)]
pub struct AzureDevCliFactory {
    config: CliConfig,
}

impl AzureDevCliFactory {
    /// Create a factory from CLI configuration
    pub fn new(config: CliConfig) -> Self {
        Self { config }
    }

    /// Resolve the executable without building a command
    pub fn resolve_executable(&self) -> Result<PathBuf> {
        locate::find_executable(&self.config.program, self.config.executable.as_deref()).ok_or_else(
            || Error::CliNotFound {
                program: self.config.program.clone(),
            },
        )
    }
}

impl Default for AzureDevCliFactory {
    fn default() -> Self {
        Self::new(CliConfig::default())
    }
}

#[async_trait]
impl CliBuilderFactory for AzureDevCliFactory {
    async fn create_cli(&self, context: &ActionContext) -> Result<CommandBuilder> {
        let config = self.config.clone();
        // PATH scanning touches the filesystem
        let resolved = tokio::task::spawn_blocking(move || {
            locate::find_executable(&config.program, config.executable.as_deref())
        })
        .await
        .map_err(|e| Error::Other(format!("Executable lookup failed: {}", e)))?;

        let executable = match resolved {
            Some(path) => path,
            None => {
                warn!(context = %context, program = %self.config.program, "CLI not found");
                return Err(Error::CliNotFound {
                    program: self.config.program.clone(),
                });
            }
        };

        debug!(context = %context, executable = %executable.display(), "Resolved CLI");
        Ok(CommandBuilder::new(executable.to_string_lossy())
            .with_args(self.config.global_args.iter().cloned()))
    }
}
