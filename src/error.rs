//! Error types for VaultCopy
//!
//! This module defines all error types used throughout the application.
//! Error messages are safe to surface: secret material never appears in
//! any variant, so Display output can be logged verbatim.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for VaultCopy operations
#[derive(Error, Debug)]
pub enum VaultCopyError {
    /// Named secret absent from the store
    #[error("Secret not found in store: '{0}'")]
    SecretNotFound(String),

    /// Caller lacks rights to read the secret
    #[error("Access denied reading secret '{0}'")]
    AccessDenied(String),

    /// Authentication against the remote endpoint failed
    #[error("Authentication failed for '{user}@{host}': {message}")]
    AuthenticationError {
        user: String,
        host: String,
        message: String,
    },

    /// Network-level connection failure (transient)
    #[error("Connection error to '{host}': {message}")]
    ConnectionError { host: String, message: String },

    /// Blocking operation exceeded its deadline
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    /// Remote transfer failure (retryable at request granularity)
    #[error("Remote transfer error: {0}")]
    RemoteTransferError(String),

    /// Bad paths or arguments; fatal, never retried
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// I/O error during local file operations
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Audit log write/rotate failure
    #[error("Audit log error: {0}")]
    LogError(String),
}

impl VaultCopyError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a connection error
    pub fn connection(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionError {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(
        user: impl Into<String>,
        host: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::AuthenticationError {
            user: user.into(),
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Check if this error is transient (the orchestrator may retry it).
    ///
    /// Timeouts follow the same retry path as connection errors.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError { .. } | Self::Timeout(_) | Self::RemoteTransferError(_)
        )
    }

    /// Check if this error is fatal for the whole run (no retry at any level)
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }
}

/// Result type alias for VaultCopy operations
pub type Result<T> = std::result::Result<T, VaultCopyError>;

impl From<std::io::Error> for VaultCopyError {
    fn from(err: std::io::Error) -> Self {
        VaultCopyError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| VaultCopyError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = VaultCopyError::io("/test/path", io_err);
        match err {
            VaultCopyError::Io { path, .. } => assert_eq!(path, PathBuf::from("/test/path")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_error_retryability() {
        assert!(VaultCopyError::Timeout(30).is_retryable());
        assert!(VaultCopyError::connection("host", "refused").is_retryable());
        assert!(VaultCopyError::RemoteTransferError("broken pipe".into()).is_retryable());

        assert!(VaultCopyError::SecretNotFound("svc".into()).is_fatal());
        assert!(VaultCopyError::auth("u", "h", "bad password").is_fatal());
        assert!(VaultCopyError::validation("missing source").is_fatal());
    }

    #[test]
    fn test_display_carries_no_credentials() {
        let err = VaultCopyError::auth("user1", "files.example.com", "access denied");
        let text = err.to_string();
        assert!(text.contains("user1@files.example.com"));
        assert!(text.contains("access denied"));
    }
}
