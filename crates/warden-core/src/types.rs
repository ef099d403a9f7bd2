// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity value types shared across warden.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, IdentityResult};

// =============================================================================
// Email
// =============================================================================

/// A normalised email address.
///
/// Normalisation trims surrounding whitespace and lower-cases the whole
/// address, so every lookup in every tier compares the same form.
///
/// # Examples
///
/// ```
/// use warden_core::types::Email;
///
/// let email = Email::parse("  Manager@TheQexle.com ").unwrap();
/// assert_eq!(email.as_str(), "manager@theqexle.com");
/// assert!(Email::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalises and validates an email address.
    pub fn parse(raw: &str) -> IdentityResult<Self> {
        let normalized = Self::normalize(raw);
        if normalized.is_empty() || !normalized.contains('@') {
            return Err(IdentityError::invalid_email(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the normalised form of `raw` without validating it.
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Returns the email as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the domain part.
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, d)| d).unwrap_or_default()
    }

    /// Consumes the email and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// RoleKey
// =============================================================================

/// Identifier of a role in the registry (e.g. `MANAGER`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleKey(String);

impl RoleKey {
    /// Creates a new role key.
    #[inline]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RoleKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RoleKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for RoleKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for RoleKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Tests
// =============================================================================
