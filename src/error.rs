//! Error types and Result aliases for azdterm

use std::fmt;
use std::path::PathBuf;

/// Result type alias for azdterm operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for azdterm
#[derive(Debug)]
pub enum Error {
    // === CLI errors ===
    /// The external CLI could not be located
    CliNotFound {
        program: String,
    },

    /// A command line with no tokens was submitted
    EmptyCommand,

    /// No handler is registered under the given command id
    UnknownCommand {
        command_id: String,
    },

    // === PTY-related errors ===
    /// Failed to create PTY
    PtyCreationFailed {
        command: String,
        reason: String,
    },

    /// Failed to spawn command in PTY
    CommandSpawnFailed {
        command: String,
        reason: String,
    },

    /// Failed to clone PTY reader
    PtyReaderCloneFailed {
        reason: String,
    },

    /// Failed to take PTY writer
    PtyWriterTakeFailed {
        reason: String,
    },

    /// Failed to send input to PTY
    PtyInputSendFailed {
        reason: String,
    },

    /// Failed to kill the process hosted in a terminal
    ProcessKillFailed {
        terminal_id: String,
        reason: String,
    },

    // === Terminal errors ===
    /// Terminal panel not found
    TerminalNotFound {
        terminal_id: String,
    },

    /// A shared terminal still runs a task with the same title
    TerminalBusy {
        title: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration file not found
    ConfigNotFound,

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    /// Failed to serialize configuration
    ConfigSerializationFailed {
        format: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    // === I/O errors ===
    /// I/O errors
    Io(std::io::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // CLI errors
            Error::CliNotFound { program } => {
                write!(f, "Could not find '{}' in PATH or configuration", program)
            }
            Error::EmptyCommand => {
                write!(f, "Command cannot be empty")
            }
            Error::UnknownCommand { command_id } => {
                write!(f, "No command registered as '{}'", command_id)
            }

            // PTY errors
            Error::PtyCreationFailed { command, reason } => {
                write!(f, "Failed to create PTY for command '{}': {}", command, reason)
            }
            Error::CommandSpawnFailed { command, reason } => {
                write!(f, "Failed to spawn command '{}': {}", command, reason)
            }
            Error::PtyReaderCloneFailed { reason } => {
                write!(f, "Failed to clone PTY reader: {}", reason)
            }
            Error::PtyWriterTakeFailed { reason } => {
                write!(f, "Failed to take PTY writer: {}", reason)
            }
            Error::PtyInputSendFailed { reason } => {
                write!(f, "Failed to send input to PTY: {}", reason)
            }
            Error::ProcessKillFailed {
                terminal_id,
                reason,
            } => {
                write!(f, "Failed to kill process in terminal '{}': {}", terminal_id, reason)
            }

            // Terminal errors
            Error::TerminalNotFound { terminal_id } => {
                write!(f, "Terminal '{}' not found", terminal_id)
            }
            Error::TerminalBusy { title } => {
                write!(f, "Terminal '{}' is still running a task", title)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigNotFound => {
                write!(f, "Configuration file not found")
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }
            Error::ConfigSerializationFailed { format, reason } => {
                write!(f, "Failed to serialize config as {}: {}", format, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }

            // I/O errors
            Error::Io(err) => write!(f, "I/O error: {}", err),

            // Generic fallback
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Error::ConfigValidationFailed {
            field: err.field().to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
