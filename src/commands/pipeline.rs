//! `azd pipeline config` in a new, focused terminal

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::CommandHandler;
use crate::cli::CliBuilderFactory;
use crate::context::ActionContext;
use crate::error::Result;
use crate::task::{TaskExecutor, TaskOptions};

/// Flags passed to `pipeline config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Service principal used to grant the pipeline access to Azure resources
    pub principal_name: Option<String>,
    /// Git remote the pipeline runs on
    pub remote_name: String,
    /// Role assigned to the service principal
    pub principal_role: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            principal_name: None,
            remote_name: "origin".to_string(),
            principal_role: "Contributor".to_string(),
        }
    }
}

/// Configures a CI pipeline for the current project
pub struct PipelineConfigCommand {
    cli: Arc<dyn CliBuilderFactory>,
    tasks: Arc<dyn TaskExecutor>,
    title: String,
    options: PipelineOptions,
}

impl PipelineConfigCommand {
    pub fn new(
        cli: Arc<dyn CliBuilderFactory>,
        tasks: Arc<dyn TaskExecutor>,
        title: impl Into<String>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            cli,
            tasks,
            title: title.into(),
            options,
        }
    }

    /// Build `<cli> pipeline config <flags>` and run it in a new focused terminal
    pub async fn run(&self, context: &ActionContext) -> Result<()> {
        let command = self
            .cli
            .create_cli(context)
            .await?
            .with_args(["pipeline", "config"])
            .with_optional_flag("--principal-name", self.options.principal_name.as_deref())
            .with_args(["--remote-name", self.options.remote_name.as_str()])
            .with_args(["--principal-role", self.options.principal_role.as_str()])
            .build();

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
impl CommandHandler for PipelineConfigCommand {
    async fn invoke(&self, context: &ActionContext) -> Result<()> {
        self.run(context).await
    }
}
