// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit error types.

use thiserror::Error;

/// Errors that can occur while recording or reading role changes.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Failed to write a record.
    #[error("Failed to write audit record: {message}")]
    WriteFailed {
        /// Error message.
        message: String,
        /// Underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to query records.
    #[error("Failed to query audit records: {message}")]
    QueryFailed {
        /// Error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

impl AuditError {
    /// Creates a write failed error.
    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::WriteFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a write failed error with source.
    pub fn write_failed_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WriteFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a query failed error.
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed {
            message: message.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns the error type for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            AuditError::WriteFailed { .. } => "write_failed",
            AuditError::QueryFailed { .. } => "query_failed",
            AuditError::Io(_) => "io_error",
            AuditError::Serialization { .. } => "serialization_error",
        }
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type() {
        assert_eq!(AuditError::write_failed("disk full").error_type(), "write_failed");
        assert_eq!(AuditError::query_failed("x").error_type(), "query_failed");

        let err: AuditError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.error_type(), "serialization_error");
    }
}
