//! Error types and handling for fsync
//!
//! Every fallible operation in the workspace returns [`Error`]. Variants carry
//! the offending path where one is known so that log lines and the CLI report
//! can point at the exact file or directory.

use std::path::{Path, PathBuf};

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Low severity - operation can continue
    Low,
    /// Medium severity - operation should be retried
    Medium,
    /// High severity - operation should be aborted
    High,
    /// Critical severity - entire process should be terminated
    Critical,
}

/// Main error type for fsync operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found
        path: PathBuf,
    },

    /// Permission denied
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path to the file with permission issues
        path: PathBuf,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// A directory could not be listed
    #[error("Failed to enumerate '{path}': {message}")]
    Enumeration {
        /// Directory that could not be listed
        path: PathBuf,
        /// Underlying failure
        message: String,
    },

    /// Copying a single file failed
    #[error("Failed to copy '{from}' to '{to}': {message}")]
    Copy {
        /// Source file
        from: PathBuf,
        /// Destination file
        to: PathBuf,
        /// Underlying failure
        message: String,
    },

    /// A file stayed locked by another process for every retry attempt
    #[error("File '{path}' is still in use after {attempts} attempts")]
    Busy {
        /// Locked file
        path: PathBuf,
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// A resource was used after it had been disposed
    #[error("Cannot use {resource} after it has been disposed")]
    Disposed {
        /// Name of the disposed resource
        resource: String,
    },

    /// Broken internal invariant
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the violated invariant
        message: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors
    Io,
    /// Configuration errors
    Config,
    /// Directory listing errors
    Enumeration,
    /// Per-file copy errors
    Copy,
    /// Use after disposal
    Disposed,
    /// Internal invariant violations
    Internal,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::FileNotFound { .. } | Self::PermissionDenied { .. } => {
                ErrorKind::Io
            }
            Self::Config { .. } => ErrorKind::Config,
            Self::Enumeration { .. } => ErrorKind::Enumeration,
            Self::Copy { .. } | Self::Busy { .. } => ErrorKind::Copy,
            Self::Disposed { .. } => ErrorKind::Disposed,
            Self::Internal { .. } => ErrorKind::Internal,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io { .. } => ErrorSeverity::Medium,
            Self::FileNotFound { .. } | Self::PermissionDenied { .. } => ErrorSeverity::High,
            Self::Config { .. } => ErrorSeverity::High,
            Self::Enumeration { .. } => ErrorSeverity::High,
            Self::Copy { .. } | Self::Busy { .. } => ErrorSeverity::Medium,
            Self::Disposed { .. } => ErrorSeverity::High,
            Self::Internal { .. } => ErrorSeverity::Critical,
            Self::Other { .. } => ErrorSeverity::Medium,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io { message } => {
                message.contains("Interrupted")
                    || message.contains("WouldBlock")
                    || message.contains("TimedOut")
            }
            Self::Busy { .. } => true,
            Self::Copy { .. } | Self::Other { .. } => true,
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::Config { .. }
            | Self::Enumeration { .. }
            | Self::Disposed { .. }
            | Self::Internal { .. } => false,
        }
    }

    /// Check if this error should trigger a retry
    pub fn should_retry(&self) -> bool {
        self.is_recoverable() && self.severity() <= ErrorSeverity::Medium
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new enumeration error for a directory
    pub fn enumeration<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Enumeration {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new copy error
    pub fn copy<P: Into<PathBuf>, S: Into<String>>(from: P, to: P, message: S) -> Self {
        Self::Copy {
            from: from.into(),
            to: to.into(),
            message: message.into(),
        }
    }

    /// Create a new use-after-dispose error
    pub fn disposed<S: Into<String>>(resource: S) -> Self {
        Self::Disposed {
            resource: resource.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Convert an I/O error raised while touching `path`, keeping the path
    pub fn io_at(path: &Path, error: &std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                message: format!("'{}': {}", path.display(), error),
            },
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        let path = error
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let message = error
            .io_error()
            .map_or_else(|| error.to_string(), ToString::to_string);
        Self::Enumeration { path, message }
    }
}
