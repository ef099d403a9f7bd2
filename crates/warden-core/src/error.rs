// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for warden.
//!
//! # Error Hierarchy
//!
//! ```text
//! WardenError (root)
//! ├── RoleError      - Role registry construction and lookup
//! ├── IdentityError  - Identity resolution, override store and role administration
//! └── AuditError     - Role change log
//! ```
//!
//! Degraded dependencies (an unreachable override store) are represented by
//! [`IdentityError::StoreUnavailable`] and [`IdentityError::Timeout`]. Role
//! resolution swallows both and falls back to the static tier; only the
//! management operations surface them.

use std::time::Duration;

use thiserror::Error;

use crate::audit::AuditError;

/// Result type alias for role registry operations.
pub type RoleResult<T> = Result<T, RoleError>;

/// Result type alias for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

// =============================================================================
// WardenError - Root Error Type
// =============================================================================

/// The root error type for warden.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Role registry error.
    #[error("Role error: {0}")]
    Role(#[from] RoleError),

    /// Identity error.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Audit error.
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),
}

impl WardenError {
    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            WardenError::Role(_) => "role",
            WardenError::Identity(_) => "identity",
            WardenError::Audit(_) => "audit",
        }
    }
}

// =============================================================================
// RoleError
// =============================================================================

/// Role registry errors.
#[derive(Debug, Error)]
pub enum RoleError {
    /// The role key is not registered.
    #[error("Unknown role: {key}")]
    UnknownRole {
        /// The unknown role key.
        key: String,
    },

    /// The same role key was registered twice.
    #[error("Duplicate role: {key}")]
    DuplicateRole {
        /// The duplicated role key.
        key: String,
    },

    /// A permission grant is malformed.
    #[error("Invalid grant on role '{role}': {message}")]
    InvalidGrant {
        /// The role owning the grant.
        role: String,
        /// What is wrong with it.
        message: String,
    },
}

impl RoleError {
    /// Creates an unknown role error.
    pub fn unknown(key: impl Into<String>) -> Self {
        Self::UnknownRole { key: key.into() }
    }

    /// Creates an invalid grant error.
    pub fn invalid_grant(role: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidGrant {
            role: role.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// IdentityError
// =============================================================================

/// Identity resolution and role administration errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The email could not be normalised.
    #[error("Invalid email address: '{value}'")]
    InvalidEmail {
        /// The rejected value.
        value: String,
    },

    /// The backing store could not be reached.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Error message.
        message: String,
    },

    /// A store operation exceeded its time budget.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The configured budget.
        timeout: Duration,
    },

    /// The acting principal may not perform the change.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Why the change was refused.
        message: String,
    },

    /// The role key is not registered.
    #[error("Unknown role: {key}")]
    UnknownRole {
        /// The unknown role key.
        key: String,
    },

    /// No principal record exists for the email.
    #[error("Principal not found: {email}")]
    NotFound {
        /// The email that was looked up.
        email: String,
    },
}

impl IdentityError {
    /// Creates an invalid email error.
    pub fn invalid_email(value: impl Into<String>) -> Self {
        Self::InvalidEmail {
            value: value.into(),
        }
    }

    /// Creates a store unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
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

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates an unknown role error.
    pub fn unknown_role(key: impl Into<String>) -> Self {
        Self::UnknownRole { key: key.into() }
    }

    /// Creates a not found error.
    pub fn not_found(email: impl Into<String>) -> Self {
        Self::NotFound {
            email: email.into(),
        }
    }

    /// Returns `true` if the error means a dependency is degraded rather
    /// than the request being wrong.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            IdentityError::StoreUnavailable { .. } | IdentityError::Timeout { .. }
        )
    }

    /// Returns `true` if the error is a hierarchy/authority refusal.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, IdentityError::Forbidden { .. })
    }
}

impl From<RoleError> for IdentityError {
    fn from(err: RoleError) -> Self {
        match err {
            RoleError::UnknownRole { key } => IdentityError::UnknownRole { key },
            other => IdentityError::store_unavailable(other.to_string()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
