// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token claim set and email extraction.
//!
//! Identity providers disagree on where they put the email address. Instead
//! of probing the payload ad hoc, [`EmailClaim`] names each convention and
//! [`TokenClaims::email`] tries them in a fixed order, returning the first
//! value that normalises to a valid [`Email`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use warden_core::Email;

/// Default email extraction order.
pub const DEFAULT_EMAIL_CLAIMS: &[EmailClaim] = &[
    EmailClaim::Email,
    EmailClaim::PreferredUsername,
    EmailClaim::Upn,
    EmailClaim::UniqueName,
    EmailClaim::Emails,
    EmailClaim::Subject,
];

// =============================================================================
// TokenClaims
// =============================================================================

/// Decoded bearer token payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Expiration time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Every other claim, including the email candidates.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// Returns the first email found using [`DEFAULT_EMAIL_CLAIMS`].
    pub fn email(&self) -> Option<Email> {
        self.email_with(DEFAULT_EMAIL_CLAIMS)
    }

    /// Returns the first email found trying `order` in sequence.
    pub fn email_with(&self, order: &[EmailClaim]) -> Option<Email> {
        order
            .iter()
            .filter_map(|claim| claim.extract(self))
            .find_map(|raw| Email::parse(&raw).ok())
    }

    /// Returns a string claim from the extra set.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Returns the display name claim, if it carries text.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }
}

// =============================================================================
// EmailClaim
// =============================================================================

/// One conventional location of the email address in a claim set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailClaim {
    /// `email` (OIDC standard).
    Email,
    /// `preferred_username` (often the UPN for Azure AD).
    PreferredUsername,
    /// `upn` (Azure AD v1).
    Upn,
    /// `unique_name` (Azure AD v1 legacy).
    UniqueName,
    /// First entry of `emails` (Azure AD B2C).
    Emails,
    /// `sub`, when it is itself an address.
    Subject,
}

impl EmailClaim {
    /// Returns the claim field name.
    pub fn field(&self) -> &'static str {
        match self {
            EmailClaim::Email => "email",
            EmailClaim::PreferredUsername => "preferred_username",
            EmailClaim::Upn => "upn",
            EmailClaim::UniqueName => "unique_name",
            EmailClaim::Emails => "emails",
            EmailClaim::Subject => "sub",
        }
    }

    /// Reads the raw candidate value, if present.
    pub fn extract(&self, claims: &TokenClaims) -> Option<String> {
        let raw = match self {
            EmailClaim::Subject => claims.sub.as_deref(),
            EmailClaim::Emails => claims
                .extra
                .get(self.field())
                .and_then(Value::as_array)
                .and_then(|list| list.first())
                .and_then(Value::as_str),
            _ => claims.get_str(self.field()),
        }?;

        let raw = raw.trim();
        (!raw.is_empty() && raw.contains('@')).then(|| raw.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
