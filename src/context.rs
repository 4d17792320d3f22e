//! Invocation context
//!
//! Every command invocation carries an [`ActionContext`] that identifies it
//! in logs and scopes the collaborators it talks to.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Context of a single command invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext {
    /// Unique identifier for this invocation
    pub id: String,
    /// Id of the command being invoked (e.g. `azure-dev.commands.cli.login`)
    pub command_id: String,
    /// When the invocation started
    pub started_at: DateTime<Utc>,
}

impl ActionContext {
    /// Create a context for a new invocation of `command_id`
    pub fn new(command_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            command_id: command_id.into(),
            started_at: Utc::now(),
        }
    }

    /// Time since the invocation started
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.started_at)
    }
}

impl fmt::Display for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.command_id, self.id)
    }
}
