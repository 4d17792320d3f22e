//! Task Process Spawning
//!
//! Spawns a task's command line in a pseudoterminal using the portable-pty
//! crate and bridges its blocking I/O to async code.

use portable_pty::{native_pty_system, ChildKiller, CommandBuilder as PtyCommand, MasterPty, PtyPair, PtySize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::thread;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::watch;

use super::streams::TerminalStreams;
use super::terminal::TaskStatus;
use crate::config::TerminalConfig;
use crate::error::{Error, Result};

/// Process spawning configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnConfig {
    /// Terminal rows
    pub rows: u16,
    /// Terminal columns
    pub cols: u16,
    /// Extra environment variables on top of the inherited environment
    pub env: HashMap<String, String>,
    /// Working directory, current directory when unset
    pub working_directory: Option<PathBuf>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self::from(&TerminalConfig::default())
    }
}

impl From<&TerminalConfig> for SpawnConfig {
    fn from(config: &TerminalConfig) -> Self {
        Self {
            rows: config.rows,
            cols: config.cols,
            env: config.env.clone(),
            working_directory: config.working_directory.clone(),
        }
    }
}

/// A freshly spawned task and the handles needed to drive it
pub struct SpawnedTask {
    /// OS process identifier
    pub pid: Option<u32>,
    /// PTY I/O
    pub streams: TerminalStreams,
    /// Updated once when the process exits
    pub status: watch::Receiver<TaskStatus>,
    /// Kills the process
    pub killer: Box<dyn ChildKiller + Send + Sync>,
    /// Keeps the PTY master open for the lifetime of the task
    pub master: Box<dyn MasterPty + Send>,
}

/// Spawn `command` (program followed by arguments) in a new PTY
pub fn spawn_task_process(command: &[String], config: &SpawnConfig) -> Result<SpawnedTask> {
    let (program, args) = command.split_first().ok_or(Error::EmptyCommand)?;
    let command_line = command.join(" ");

    let pair = native_pty_system()
        .openpty(PtySize {
            rows: config.rows,
            cols: config.cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| Error::PtyCreationFailed {
            command: command_line.clone(),
            reason: e.to_string(),
        })?;

    let mut cmd = PtyCommand::new(program);
    cmd.args(args);
    for (key, value) in &config.env {
        cmd.env(key, value);
    }
    // portable-pty falls back to the home directory when no cwd is given
    let cwd = match &config.working_directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    cmd.cwd(cwd);

    let PtyPair { master, slave } = pair;
    let mut child = slave
        .spawn_command(cmd)
        .map_err(|e| Error::CommandSpawnFailed {
            command: command_line.clone(),
            reason: e.to_string(),
        })?;
    // Release our copy of the slave so the reader sees EOF when the child exits
    drop(slave);

    let pid = child.process_id();
    let killer = child.clone_killer();
    let streams = create_streams(master.as_ref())?;

    let (status_tx, status_rx) = watch::channel(TaskStatus::Running);
    thread::spawn(move || {
        let code = match child.wait() {
            Ok(status) => status.exit_code() as i32,
            Err(e) => {
                warn!("Failed to wait for task process: {}", e);
                -1
            }
        };
        debug!("Task process exited with code {}", code);
        let _ = status_tx.send(TaskStatus::Exited(code));
    });

    info!("Spawned '{}' (pid {:?})", command_line, pid);
    Ok(SpawnedTask {
        pid,
        streams,
        status: status_rx,
        killer,
        master,
    })
}

/// Start the reader and writer threads for a PTY master
fn create_streams(master: &dyn MasterPty) -> Result<TerminalStreams> {
    let mut reader = master
        .try_clone_reader()
        .map_err(|e| Error::PtyReaderCloneFailed {
            reason: e.to_string(),
        })?;
    let mut writer = master
        .take_writer()
        .map_err(|e| Error::PtyWriterTakeFailed {
            reason: e.to_string(),
        })?;

    let (tx_out, rx_out) = unbounded_channel::<Vec<u8>>();
    let (tx_in, rx_in) = channel::<Vec<u8>>();

    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        let mut consecutive_errors = 0;
        const MAX_CONSECUTIVE_ERRORS: u32 = 5;

        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    consecutive_errors = 0;
                    if tx_out.send(buf[..n].to_vec()).is_err() {
                        debug!("Task output receiver dropped, stopping reader thread");
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(std::time::Duration::from_millis(10));
                }
                // Linux reports EIO on the master once the slave side is gone
                Err(e) if e.raw_os_error() == Some(5) => break,
                Err(e) => {
                    consecutive_errors += 1;
                    warn!(
                        "PTY read error ({}): {} (attempt {}/{})",
                        e.kind(),
                        e,
                        consecutive_errors,
                        MAX_CONSECUTIVE_ERRORS
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        error!("PTY read: too many consecutive errors, stopping reader thread");
                        break;
                    }
                    thread::sleep(std::time::Duration::from_millis(50));
                }
            }
        }
        debug!("PTY reader thread exiting");
    });

    thread::spawn(move || {
        while let Ok(data) = rx_in.recv() {
            let result = writer.write_all(&data).and_then(|_| writer.flush());
            if let Err(e) = result {
                warn!("PTY write error ({}): {}", e.kind(), e);
                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    break;
                }
            }
        }
        debug!("PTY writer thread exiting");
    });

    Ok(TerminalStreams::from_channels(rx_out, tx_in))
}
