//! Terminal Streams
//!
//! Async-friendly access to a task's PTY. Blocking reads and writes happen
//! on dedicated threads; this side only sees the channel ends.

use crate::error::{Error, Result};
use std::sync::mpsc::Sender as StdSender;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

/// PTY I/O streams of one task
pub struct TerminalStreams {
    /// Output bytes from the PTY (stdout and stderr are merged by the PTY)
    output_rx: UnboundedReceiver<Vec<u8>>,
    /// Input bytes for the PTY
    input_tx: StdSender<Vec<u8>>,
}

impl TerminalStreams {
    /// Create streams from channel ends
    pub fn from_channels(
        output_rx: UnboundedReceiver<Vec<u8>>,
        input_tx: StdSender<Vec<u8>>,
    ) -> Self {
        Self {
            output_rx,
            input_tx,
        }
    }

    /// Queue bytes for the PTY's stdin
    pub fn write(&self, data: &[u8]) -> Result<()> {
        self.input_tx
            .send(data.to_vec())
            .map_err(|e| Error::PtyInputSendFailed {
                reason: e.to_string(),
            })
    }

    /// A sender feeding the PTY's stdin, usable from blocking threads
    pub fn input_handle(&self) -> StdSender<Vec<u8>> {
        self.input_tx.clone()
    }

    /// Wait for the next chunk of output
    ///
    /// Returns `None` once the PTY has closed and all output was consumed.
    pub async fn read(&mut self) -> Option<Vec<u8>> {
        self.output_rx.recv().await
    }

    /// Wait up to `timeout_ms` for output; empty on timeout or close
    pub async fn read_with_timeout(&mut self, timeout_ms: u64) -> Vec<u8> {
        use tokio::time::{timeout, Duration};

        match timeout(Duration::from_millis(timeout_ms), self.read()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) | Err(_) => Vec::new(),
        }
    }

    /// Take output that is already available without waiting
    pub fn try_read_now(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            match self.output_rx.try_recv() {
                Ok(bytes) => out.extend_from_slice(&bytes),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Discard pending output, returning the number of chunks dropped
    pub fn drain_output(&mut self) -> usize {
        let mut count = 0;
        while self.output_rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

impl Default for TerminalStreams {
    fn default() -> Self {
        let (_tx, rx) = tokio::sync::mpsc::unbounded_channel::<Vec<u8>>();
        let (stdin_tx, _stdin_rx) = std::sync::mpsc::channel::<Vec<u8>>();
        TerminalStreams::from_channels(rx, stdin_tx)
    }
}
