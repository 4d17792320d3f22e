//! azdterm - run Azure Developer CLI workflows as terminal-hosted tasks
//!
//! Command handlers build an invocation of the external `azd` program and
//! dispatch it to a task executor, which runs it in a new pseudoterminal.
//!
//! ## Module Organization
//!
//! - [`cli`] - Command-line builders and locating the external CLI
//! - [`task`] - Task executor, PTY spawning, terminal panels and their host
//! - [`commands`] - Invocable command handlers (`login`, `pipeline config`) and their registry
//! - [`config`] - Configuration model and loader
//! - [`context`] - Per-invocation context
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use azdterm::{commands::LOGIN_COMMAND_ID, init, TerminalHost};
//! use std::sync::Arc;
//!
//! # async fn run() -> azdterm::Result<()> {
//! let config = init()?;
//! let host = Arc::new(TerminalHost::new());
//! let registry = azdterm::default_registry(&config, Arc::clone(&host), Default::default());
//!
//! registry.invoke(LOGIN_COMMAND_ID).await?;
//! if let Some(terminal) = host.focused().await {
//!     terminal.wait().await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Threading
//!
//! Handlers are async and run on tokio. Each task gets a blocking reader,
//! writer and waiter thread for its PTY, bridged to async code by channels.

#[macro_use]
extern crate tracing;

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod task;

use std::sync::Arc;

pub use cli::{AzureDevCliFactory, CliBuilderFactory, CommandBuilder};
pub use commands::{CommandHandler, CommandRegistry, LoginCommand};
pub use config::loader::ConfigLoader;
pub use config::Config;
pub use context::ActionContext;
pub use error::{Error, Result};
pub use task::{PtyTaskExecutor, TaskExecutor, TaskOptions, TerminalHost};

use commands::{PipelineConfigCommand, PipelineOptions};

/// The current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The package name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Load configuration from the default locations
///
/// A missing or unreadable configuration falls back to defaults; an invalid
/// one is an error.
pub fn init() -> Result<Config> {
    info!("Initializing {} v{}", NAME, VERSION);

    match ConfigLoader::load() {
        Ok(config) => Ok(config),
        Err(e @ Error::ConfigValidationFailed { .. }) => Err(e),
        Err(e) => {
            warn!("Failed to load configuration: {}. Using defaults", e);
            Ok(Config::default())
        }
    }
}

/// Registry with every built-in command wired to the `azd` CLI and a PTY executor
pub fn default_registry(
    config: &Config,
    host: Arc<TerminalHost>,
    pipeline: PipelineOptions,
) -> CommandRegistry {
    let cli: Arc<dyn CliBuilderFactory> = Arc::new(AzureDevCliFactory::new(config.cli.clone()));
    let tasks: Arc<dyn TaskExecutor> = Arc::new(PtyTaskExecutor::new(host, &config.terminal));
    let title = commands::terminal_title(&config.terminal);

    let mut registry = CommandRegistry::new();
    registry.register(
        commands::LOGIN_COMMAND_ID,
        Arc::new(LoginCommand::new(Arc::clone(&cli), Arc::clone(&tasks), title.clone())),
    );
    registry.register(
        commands::PIPELINE_CONFIG_COMMAND_ID,
        Arc::new(PipelineConfigCommand::new(cli, tasks, title, pipeline)),
    );
    registry
}
