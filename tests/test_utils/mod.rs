//! Test Utilities and Mocks
//!
//! Recording doubles for the CLI-builder and task-execution seams.

#![allow(dead_code)]

use async_trait::async_trait;
use azdterm::cli::{CliBuilderFactory, CommandBuilder};
use azdterm::error::{Error, Result};
use azdterm::task::{TaskExecutor, TaskOptions};
use azdterm::ActionContext;
use std::sync::{Arc, Mutex};

/// One recorded `execute_as_task` call
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedTask {
    pub command: Vec<String>,
    pub title: String,
    pub options: TaskOptions,
}

/// Builder factory returning a fixed program, or failing on demand
pub struct MockCliFactory {
    program: String,
    fail: bool,
    contexts: Mutex<Vec<String>>,
}

impl MockCliFactory {
    /// A factory whose builders start with `program`
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            fail: false,
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// A factory that fails every call with `CliNotFound`
    pub fn failing(program: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(program)
        }
    }

    /// Ids of the contexts `create_cli` was called with
    pub fn calls(&self) -> Vec<String> {
        self.contexts.lock().unwrap().clone()
    }

    /// The error a failing factory returns
    pub fn expected_error(&self) -> Error {
        Error::CliNotFound {
            program: self.program.clone(),
        }
    }
}

#[async_trait]
impl CliBuilderFactory for MockCliFactory {
    async fn create_cli(&self, context: &ActionContext) -> Result<CommandBuilder> {
        self.contexts.lock().unwrap().push(context.id.clone());
        if self.fail {
            return Err(self.expected_error());
        }
        Ok(CommandBuilder::new(self.program.clone()))
    }
}

/// Task executor that records every call
#[derive(Default)]
pub struct RecordingExecutor {
    tasks: Mutex<Vec<ExecutedTask>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent call fail with `Error::Other(message)`
    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn tasks(&self) -> Vec<ExecutedTask> {
        self.tasks.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskExecutor for RecordingExecutor {
    async fn execute_as_task(
        &self,
        command: Vec<String>,
        title: &str,
        options: TaskOptions,
    ) -> Result<()> {
        self.tasks.lock().unwrap().push(ExecutedTask {
            command,
            title: title.to_string(),
            options,
        });
        match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(Error::Other(message)),
            None => Ok(()),
        }
    }
}
