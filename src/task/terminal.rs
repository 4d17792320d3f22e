//! Terminal panels and their registry
//!
//! A [`TerminalPanel`] is one task hosted in a PTY. The [`TerminalHost`]
//! keeps every panel, tracks which one has focus, and publishes
//! [`TerminalEvent`]s as panels come and go.
//!
//! ```ignore
//! let host = TerminalHost::new();
//! let mut events = host.subscribe();
//!
//! // ... dispatch a task through a PtyTaskExecutor sharing `host` ...
//!
//! while let Ok(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! ```

use chrono::{DateTime, Utc};
use portable_pty::{ChildKiller, MasterPty};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender as StdSender;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use uuid::Uuid;

use super::process::SpawnedTask;
use super::streams::TerminalStreams;
use crate::error::{Error, Result};

/// Lifecycle of the process hosted by a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Process is running
    Running,
    /// Process exited with the given code
    Exited(i32),
}

/// Events published by the [`TerminalHost`]
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalEvent {
    /// A panel was registered
    Created {
        terminal_id: String,
        title: String,
        pid: Option<u32>,
    },
    /// A panel received focus
    Focused { terminal_id: String },
    /// The process in a panel exited
    Exited { terminal_id: String, code: i32 },
    /// A panel was closed and removed
    Closed { terminal_id: String },
}

/// A task hosted in a terminal
pub struct TerminalPanel {
    id: String,
    title: String,
    command: Vec<String>,
    pid: Option<u32>,
    shared: bool,
    created_at: DateTime<Utc>,
    revealed: AtomicBool,
    streams: Mutex<TerminalStreams>,
    status: watch::Receiver<TaskStatus>,
    killer: Option<StdMutex<Box<dyn ChildKiller + Send + Sync>>>,
    _master: Option<StdMutex<Box<dyn MasterPty + Send>>>,
}

impl TerminalPanel {
    /// Wrap a spawned task; `id` is reused when replacing a shared panel
    pub fn from_spawned(
        id: Option<String>,
        title: impl Into<String>,
        command: Vec<String>,
        shared: bool,
        task: SpawnedTask,
    ) -> Self {
        Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: title.into(),
            command,
            pid: task.pid,
            shared,
            created_at: Utc::now(),
            revealed: AtomicBool::new(false),
            streams: Mutex::new(task.streams),
            status: task.status,
            killer: Some(StdMutex::new(task.killer)),
            _master: Some(StdMutex::new(task.master)),
        }
    }

    /// A panel driven entirely by the given channels, with no process behind it
    pub fn detached(
        title: impl Into<String>,
        command: Vec<String>,
        shared: bool,
        streams: TerminalStreams,
        status: watch::Receiver<TaskStatus>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            command,
            pid: None,
            shared,
            created_at: Utc::now(),
            revealed: AtomicBool::new(false),
            streams: Mutex::new(streams),
            status,
            killer: None,
            _master: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The command line this panel runs
    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Whether the panel is shared by tasks with the same title
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the panel has been shown to the user
    pub fn is_revealed(&self) -> bool {
        self.revealed.load(Ordering::Relaxed)
    }

    pub(crate) fn reveal(&self) {
        self.revealed.store(true, Ordering::Relaxed);
    }

    /// Current status of the hosted process
    pub fn status(&self) -> TaskStatus {
        *self.status.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.status() == TaskStatus::Running
    }

    /// Wait for the process to exit and return its exit code
    pub async fn wait(&self) -> i32 {
        let mut rx = self.status.clone();
        let result = rx
            .wait_for(|s| matches!(s, TaskStatus::Exited(_)))
            .await
            .map(|s| *s);
        match result {
            Ok(TaskStatus::Exited(code)) => code,
            // Sender gone without an exit status
            _ => -1,
        }
    }

    /// Send bytes to the process's stdin
    pub async fn send_input(&self, data: &[u8]) -> Result<()> {
        self.streams.lock().await.write(data)
    }

    /// A stdin sender usable from blocking threads
    pub async fn input_handle(&self) -> StdSender<Vec<u8>> {
        self.streams.lock().await.input_handle()
    }

    /// Wait for the next output chunk; `None` once the terminal has closed
    pub async fn read_output(&self) -> Option<Vec<u8>> {
        self.streams.lock().await.read().await
    }

    /// Output that is already available, without waiting
    pub async fn try_read_output(&self) -> Vec<u8> {
        self.streams.lock().await.try_read_now()
    }

    /// Kill the hosted process if it is still running
    pub fn kill(&self) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }
        let Some(killer) = &self.killer else {
            return Ok(());
        };
        let mut killer = killer.lock().map_err(|e| Error::ProcessKillFailed {
            terminal_id: self.id.clone(),
            reason: e.to_string(),
        })?;
        killer.kill().map_err(|e| Error::ProcessKillFailed {
            terminal_id: self.id.clone(),
            reason: e.to_string(),
        })
    }
}

impl std::fmt::Debug for TerminalPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalPanel")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("command", &self.command)
            .field("pid", &self.pid)
            .field("shared", &self.shared)
            .field("status", &self.status())
            .finish()
    }
}

/// Registry of terminal panels
pub struct TerminalHost {
    terminals: RwLock<HashMap<String, Arc<TerminalPanel>>>,
    focused: RwLock<Option<String>>,
    /// Titles of shared panels whose task is being launched
    launching: StdMutex<HashSet<String>>,
    events: broadcast::Sender<TerminalEvent>,
}

/// Exclusive right to launch a task into the shared panel for a title
///
/// Held from [`TerminalHost::reserve_shared`] until the new panel is
/// registered. The title is released when the slot is dropped.
pub struct SharedSlot {
    host: Arc<TerminalHost>,
    title: String,
    reuse_id: Option<String>,
}

impl SharedSlot {
    /// Id of the idle shared panel to replace, if there is one
    pub fn reuse_id(&self) -> Option<&str> {
        self.reuse_id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Drop for SharedSlot {
    fn drop(&mut self) {
        // A poisoned set still holds valid titles
        let mut launching = match self.host.launching.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        launching.remove(&self.title);
    }
}

impl std::fmt::Debug for SharedSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSlot")
            .field("title", &self.title)
            .field("reuse_id", &self.reuse_id)
            .finish()
    }
}

fn newest_shared<'a>(
    terminals: &'a HashMap<String, Arc<TerminalPanel>>,
    title: &str,
) -> Option<&'a Arc<TerminalPanel>> {
    terminals
        .values()
        .filter(|p| p.is_shared() && p.title() == title)
        .max_by_key(|p| p.created_at())
}

impl TerminalHost {
    /// Create a host with the default event capacity
    pub fn new() -> Self {
        Self::with_event_capacity(256)
    }

    /// Create a host whose event channel buffers `capacity` events
    pub fn with_event_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            terminals: RwLock::new(HashMap::new()),
            focused: RwLock::new(None),
            launching: StdMutex::new(HashSet::new()),
            events,
        }
    }

    /// Subscribe to terminal events
    pub fn subscribe(&self) -> broadcast::Receiver<TerminalEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: TerminalEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Add a panel, replacing any panel with the same id
    ///
    /// Must be called from within a tokio runtime: a watcher task publishes
    /// [`TerminalEvent::Exited`] when the process ends.
    pub async fn register(&self, panel: TerminalPanel) -> Arc<TerminalPanel> {
        let panel = Arc::new(panel);
        let id = panel.id().to_string();

        self.terminals
            .write()
            .await
            .insert(id.clone(), Arc::clone(&panel));

        self.publish(TerminalEvent::Created {
            terminal_id: id.clone(),
            title: panel.title().to_string(),
            pid: panel.pid(),
        });

        let mut status = panel.status.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let exited = status
                .wait_for(|s| matches!(s, TaskStatus::Exited(_)))
                .await
                .map(|s| *s);
            if let Ok(TaskStatus::Exited(code)) = exited {
                let _ = events.send(TerminalEvent::Exited {
                    terminal_id: id,
                    code,
                });
            }
        });

        panel
    }

    /// Give focus to a panel and reveal it
    pub async fn focus(&self, terminal_id: &str) -> Result<()> {
        let panel = self
            .get(terminal_id)
            .await
            .ok_or_else(|| Error::TerminalNotFound {
                terminal_id: terminal_id.to_string(),
            })?;

        panel.reveal();
        *self.focused.write().await = Some(terminal_id.to_string());
        self.publish(TerminalEvent::Focused {
            terminal_id: terminal_id.to_string(),
        });
        Ok(())
    }

    /// The panel that currently has focus
    pub async fn focused(&self) -> Option<Arc<TerminalPanel>> {
        let focused = self.focused.read().await.clone()?;
        self.get(&focused).await
    }

    pub async fn get(&self, terminal_id: &str) -> Option<Arc<TerminalPanel>> {
        self.terminals.read().await.get(terminal_id).cloned()
    }

    /// The most recently created shared panel with `title`
    pub async fn find_shared(&self, title: &str) -> Option<Arc<TerminalPanel>> {
        newest_shared(&*self.terminals.read().await, title).cloned()
    }

    /// Claim the shared panel for `title` before launching a task into it
    ///
    /// Fails with [`Error::TerminalBusy`] while the shared panel's task is
    /// running or another launch for the same title holds its slot.
    pub async fn reserve_shared(self: &Arc<Self>, title: &str) -> Result<SharedSlot> {
        let terminals = self.terminals.read().await;
        let busy = || Error::TerminalBusy {
            title: title.to_string(),
        };

        let existing = newest_shared(&terminals, title);
        if existing.is_some_and(|p| p.is_running()) {
            return Err(busy());
        }

        let mut launching = match self.launching.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !launching.insert(title.to_string()) {
            return Err(busy());
        }

        Ok(SharedSlot {
            host: Arc::clone(self),
            title: title.to_string(),
            reuse_id: existing.map(|p| p.id().to_string()),
        })
    }

    /// All panels, oldest first
    pub async fn list(&self) -> Vec<Arc<TerminalPanel>> {
        let mut panels: Vec<_> = self.terminals.read().await.values().cloned().collect();
        panels.sort_by_key(|p| p.created_at());
        panels
    }

    /// Number of registered panels
    pub async fn count(&self) -> usize {
        self.terminals.read().await.len()
    }

    /// Kill the panel's process and remove it
    pub async fn close(&self, terminal_id: &str) -> Result<()> {
        let panel = self
            .terminals
            .write()
            .await
            .remove(terminal_id)
            .ok_or_else(|| Error::TerminalNotFound {
                terminal_id: terminal_id.to_string(),
            })?;

        {
            let mut focused = self.focused.write().await;
            if focused.as_deref() == Some(terminal_id) {
                *focused = None;
            }
        }

        self.publish(TerminalEvent::Closed {
            terminal_id: terminal_id.to_string(),
        });
        panel.kill()
    }

    /// Remove panels whose process has exited; returns how many were removed
    pub async fn cleanup_exited(&self) -> usize {
        let mut terminals = self.terminals.write().await;
        let exited: Vec<String> = terminals
            .iter()
            .filter(|(_, panel)| !panel.is_running())
            .map(|(id, _)| id.clone())
            .collect();

        for id in &exited {
            terminals.remove(id);
        }
        drop(terminals);

        {
            let mut focused = self.focused.write().await;
            if focused.as_ref().is_some_and(|id| exited.contains(id)) {
                *focused = None;
            }
        }

        for id in &exited {
            self.publish(TerminalEvent::Closed {
                terminal_id: id.clone(),
            });
        }
        exited.len()
    }
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self::new()
    }
}
