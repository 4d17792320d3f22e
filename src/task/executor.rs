//! PTY-backed task executor

use async_trait::async_trait;
use std::sync::Arc;

use super::process::{spawn_task_process, SpawnConfig};
use super::terminal::{TerminalHost, TerminalPanel};
use super::{PanelKind, Presentation, Reveal, TaskExecutor, TaskOptions};
use crate::config::TerminalConfig;
use crate::error::{Error, Result};

/// Runs tasks in pseudoterminals registered with a [`TerminalHost`]
pub struct PtyTaskExecutor {
    host: Arc<TerminalHost>,
    spawn_config: SpawnConfig,
}

impl PtyTaskExecutor {
    /// Create an executor that registers its terminals with `host`
    pub fn new(host: Arc<TerminalHost>, config: &TerminalConfig) -> Self {
        Self {
            host,
            spawn_config: SpawnConfig::from(config),
        }
    }

    /// The host this executor registers terminals with
    pub fn host(&self) -> &Arc<TerminalHost> {
        &self.host
    }
}

#[async_trait]
impl TaskExecutor for PtyTaskExecutor {
    async fn execute_as_task(
        &self,
        command: Vec<String>,
        title: &str,
        options: TaskOptions,
    ) -> Result<()> {
        if command.is_empty() {
            return Err(Error::EmptyCommand);
        }

        let presentation = Presentation::from(options);
        // Held until the panel is registered so a concurrent shared launch sees it
        let slot = match presentation.panel {
            PanelKind::Shared => Some(self.host.reserve_shared(title).await?),
            PanelKind::New => None,
        };
        let reuse_id = slot.as_ref().and_then(|s| s.reuse_id()).map(str::to_string);
        if let Some(id) = &reuse_id {
            debug!("Reusing shared terminal {} for '{}'", id, title);
        }

        let spawn_config = self.spawn_config.clone();
        let spawn_command = command.clone();
        let task = tokio::task::spawn_blocking(move || {
            spawn_task_process(&spawn_command, &spawn_config)
        })
        .await
        .map_err(|e| Error::Other(format!("Task spawn was cancelled: {}", e)))??;

        let shared = presentation.panel == PanelKind::Shared;
        let panel = TerminalPanel::from_spawned(reuse_id, title, command, shared, task);
        let panel = self.host.register(panel).await;
        drop(slot);

        if presentation.focus {
            self.host.focus(panel.id()).await?;
        } else if presentation.reveal == Reveal::Always {
            panel.reveal();
        }

        info!(
            terminal = %panel.id(),
            title = %title,
            focus = presentation.focus,
            "Task started"
        );
        Ok(())
    }
}
