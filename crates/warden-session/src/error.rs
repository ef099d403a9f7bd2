// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session error types.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by session persistence and token refresh.
///
/// None of these escape [`SessionContext::validate`](crate::SessionContext::validate):
/// the state machine folds them into "still valid" or "expired".
#[derive(Debug, Error)]
pub enum SessionError {
    /// The snapshot store failed.
    #[error("Session storage error: {message}")]
    Storage {
        /// Error message.
        message: String,
        /// Underlying error.
        #[source]
        source: Option<std::io::Error>,
    },

    /// A persisted snapshot could not be decoded.
    #[error("Malformed session snapshot: {message}")]
    Malformed {
        /// Error message.
        message: String,
    },

    /// The identity provider refused or failed the refresh.
    #[error("Token refresh failed: {message}")]
    Refresh {
        /// Error message.
        message: String,
    },

    /// A collaborator call exceeded its budget.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The configured budget.
        timeout: Duration,
    },

    /// The operation requires an authenticated session.
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl SessionError {
    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a storage error with an IO source.
    pub fn storage_io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a malformed snapshot error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a refresh error.
    pub fn refresh(message: impl Into<String>) -> Self {
        Self::Refresh {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Returns `true` if retrying may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionError::Storage { .. } | SessionError::Timeout { .. } | SessionError::Refresh { .. }
        )
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(SessionError::refresh("network").is_transient());
        assert!(!SessionError::malformed("bad json").is_transient());
        assert!(!SessionError::NotAuthenticated.is_transient());
    }

    #[test]
    fn test_json_error_is_malformed() {
        let err: SessionError = serde_json::from_str::<u8>("{").unwrap_err().into();
        assert!(matches!(err, SessionError::Malformed { .. }));
    }
}
