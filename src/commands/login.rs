//! `azd login` in a new, focused terminal

use async_trait::async_trait;
use std::sync::Arc;

use super::CommandHandler;
use crate::cli::CliBuilderFactory;
use crate::context::ActionContext;
use crate::error::Result;
use crate::task::{TaskExecutor, TaskOptions};

/// Launches the CLI's interactive login flow
pub struct LoginCommand {
    cli: Arc<dyn CliBuilderFactory>,
    tasks: Arc<dyn TaskExecutor>,
    title: String,
}

impl LoginCommand {
    pub fn new(
        cli: Arc<dyn CliBuilderFactory>,
        tasks: Arc<dyn TaskExecutor>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            cli,
            tasks,
            title: title.into(),
        }
    }

    /// Build `<cli> login` and run it in a new terminal that takes focus
    ///
    /// `should_prompt` is accepted for callers that pass it but has no effect.
    /// Failures from the builder factory or the executor are returned as-is.
    pub async fn run(&self, context: &ActionContext, should_prompt: bool) -> Result<()> {
        debug!(context = %context, should_prompt, "Starting login");

        let command = self.cli.create_cli(context).await?.with_arg("login").build();

        self.tasks
            .execute_as_task(
                command,
                &self.title,
                TaskOptions {
                    always_run_new: true,
                    focus: true,
                },
            )
            .await
    }
}

#[async_trait]
impl CommandHandler for LoginCommand {
    async fn invoke(&self, context: &ActionContext) -> Result<()> {
        self.run(context, true).await
    }
}
