//! Terminal-hosted task execution
//!
//! A task is a fully built command line that runs inside a terminal panel.
//! [`TaskExecutor`] is the seam command handlers dispatch through; the
//! [`PtyTaskExecutor`] implementation spawns each task in a pseudoterminal
//! and registers it with a [`TerminalHost`].

pub mod executor;
pub mod process;
pub mod streams;
pub mod terminal;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use executor::PtyTaskExecutor;
pub use process::{spawn_task_process, SpawnConfig, SpawnedTask};
pub use streams::TerminalStreams;
pub use terminal::{SharedSlot, TaskStatus, TerminalEvent, TerminalHost, TerminalPanel};

/// Options controlling how a task is presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOptions {
    /// Always create a new terminal instead of reusing one with the same title
    pub always_run_new: bool,
    /// Bring the terminal to the foreground
    pub focus: bool,
}

/// Which terminal panel a task runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    /// A dedicated panel for this task
    New,
    /// The panel shared by tasks with the same title
    Shared,
}

/// Whether the panel is shown when the task starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Always,
    Silent,
}

/// Presentation derived from [`TaskOptions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub panel: PanelKind,
    pub reveal: Reveal,
    pub focus: bool,
}

impl From<TaskOptions> for Presentation {
    fn from(options: TaskOptions) -> Self {
        Self {
            panel: if options.always_run_new {
                PanelKind::New
            } else {
                PanelKind::Shared
            },
            reveal: if options.focus {
                Reveal::Always
            } else {
                Reveal::Silent
            },
            focus: options.focus,
        }
    }
}

/// Runs command lines as terminal-hosted tasks
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Launch `command` as a task in a terminal titled `title`
    ///
    /// Returns once the task has been launched; the task itself keeps
    /// running independently.
    ///
    /// # Errors
    /// Returns an error if the command is empty or cannot be spawned
    async fn execute_as_task(
        &self,
        command: Vec<String>,
        title: &str,
        options: TaskOptions,
    ) -> Result<()>;
}
