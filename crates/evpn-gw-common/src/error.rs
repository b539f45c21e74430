//! Error types for EVPN gateway operations.
//!
//! Every failure a lifecycle operation can report is a [`GwError`]. Callers
//! that need a machine-actionable distinction (transport layers mapping to
//! status codes) use [`GwError::code`] rather than matching on messages.

use std::io;
use thiserror::Error;

/// Result type alias for gateway operations.
pub type GwResult<T> = Result<T, GwError>;

/// Coarse status code carried by every error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// The request was malformed; retrying it unchanged cannot succeed.
    InvalidArgument,
    /// The named resource (or its kernel counterpart) does not exist.
    NotFound,
    /// A backend or internal failure.
    Internal,
}

impl Code {
    /// Returns the canonical status name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::NotFound => "NOT_FOUND",
            Code::Internal => "INTERNAL",
        }
    }
}

/// Errors that can occur during gateway operations.
#[derive(Debug, Error)]
pub enum GwError {
    /// Request validation failed.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    /// Store entry or live kernel object not found.
    #[error("unable to find key {key}")]
    NotFound {
        /// The resource name or interface name that was looked up.
        key: String,
    },

    /// Failed to execute a shell command (spawn error).
    #[error("Failed to execute shell command '{command}': {source}")]
    ShellExec {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Shell command returned non-zero exit code.
    #[error("Shell command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// Kernel link operation failed.
    #[error("Netlink operation failed: {operation}: {message}")]
    Netlink {
        /// The operation that failed (e.g., "link_add", "link_by_name").
        operation: String,
        /// Error message.
        message: String,
    },

    /// Routing daemon operation failed.
    #[error("FRR operation failed: {operation}: {message}")]
    Frr {
        /// The operation that failed.
        operation: String,
        /// Error message.
        message: String,
    },

    /// Daemon configuration could not be loaded.
    #[error("Invalid configuration for {field}: {message}")]
    Config {
        /// The field or file that failed validation.
        field: String,
        /// Error message.
        message: String,
    },
}

impl GwError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a netlink error.
    pub fn netlink(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Netlink {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates an FRR error.
    pub fn frr(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Frr {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the status code for this error.
    pub fn code(&self) -> Code {
        match self {
            GwError::InvalidArgument { .. } | GwError::Config { .. } => Code::InvalidArgument,
            GwError::NotFound { .. } => Code::NotFound,
            GwError::ShellExec { .. }
            | GwError::ShellCommandFailed { .. }
            | GwError::Netlink { .. }
            | GwError::Frr { .. } => Code::Internal,
        }
    }

    /// Returns true if the caller is at fault (bad request or missing resource).
    pub fn is_client_error(&self) -> bool {
        matches!(self.code(), Code::InvalidArgument | Code::NotFound)
    }
}
