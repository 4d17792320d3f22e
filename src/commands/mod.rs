//! Invocable commands
//!
//! Each command is a [`CommandHandler`] registered under an id in the
//! [`CommandRegistry`]. Handlers build an external CLI invocation and hand
//! it to a [`TaskExecutor`](crate::task::TaskExecutor).

pub mod login;
pub mod pipeline;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::TerminalConfig;
use crate::context::ActionContext;
use crate::error::{Error, Result};

pub use login::LoginCommand;
pub use pipeline::{PipelineConfigCommand, PipelineOptions};

/// Command id of the login handler
pub const LOGIN_COMMAND_ID: &str = "azure-dev.commands.cli.login";

/// Command id of the pipeline configuration handler
pub const PIPELINE_CONFIG_COMMAND_ID: &str = "azure-dev.commands.cli.pipeline-config";

/// Title for terminals hosting CLI tasks
pub fn terminal_title(config: &TerminalConfig) -> String {
    config.title.clone()
}

/// A command that can be invoked by id
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Run the command with its default arguments
    async fn invoke(&self, context: &ActionContext) -> Result<()>;
}

/// Maps command ids to their handlers
#[derive(Default)]
pub struct CommandRegistry {
    handlers: BTreeMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `id`, replacing any previous handler
    pub fn register(&mut self, id: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        let id = id.into();
        if self.handlers.insert(id.clone(), handler).is_some() {
            warn!("Replaced handler for command '{}'", id);
        }
    }

    /// Registered command ids, sorted
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    /// Invoke the command registered as `id` in a fresh context
    pub async fn invoke(&self, id: &str) -> Result<()> {
        let handler = self
            .handlers
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownCommand {
                command_id: id.to_string(),
            })?;

        let context = ActionContext::new(id);
        debug!(context = %context, "Invoking command");
        let result = handler.invoke(&context).await;
        if let Err(e) = &result {
            error!(context = %context, "Command failed: {}", e);
        }
        result
    }
}
