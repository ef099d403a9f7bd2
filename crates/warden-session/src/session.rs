// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session snapshot types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{Email, PermissionGrant, RoleKey};

// =============================================================================
// SessionStatus
// =============================================================================

/// Derived state of a session context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No session.
    Anonymous,
    /// A login is in progress.
    Authenticating,
    /// Authenticated and outside the refresh window.
    Valid,
    /// Authenticated, inside the refresh window.
    NearExpiry,
    /// Authenticated but past expiry (or without one).
    Expired,
}

impl SessionStatus {
    /// Returns `true` for [`Valid`](Self::Valid) and [`NearExpiry`](Self::NearExpiry).
    pub fn is_usable(&self) -> bool {
        matches!(self, SessionStatus::Valid | SessionStatus::NearExpiry)
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// The authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPrincipal {
    /// Principal id.
    pub id: String,
    /// Normalised email.
    pub email: Email,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Tokens issued by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer token for API calls.
    #[serde(default)]
    pub access_token: Option<String>,
    /// OpenID Connect id token.
    #[serde(default)]
    pub id_token: Option<String>,
    /// Refresh material.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Client-held session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The principal.
    pub principal: SessionPrincipal,
    /// Role at login or last refresh.
    pub role: RoleKey,
    /// Display name of the role.
    pub role_display_name: String,
    /// Grants copied from the registry at login or last refresh.
    pub permissions: Vec<PermissionGrant>,
    /// Provider tokens.
    #[serde(default)]
    pub tokens: TokenSet,
    /// Absolute expiry. A session without one is never valid.
    pub expires_at: Option<DateTime<Utc>>,
    /// Last activity stamp.
    pub last_activity: DateTime<Utc>,
    /// Provider account correlation id.
    #[serde(default)]
    pub provider_account_id: Option<String>,
    /// `true` for local (demo) sessions.
    #[serde(default)]
    pub is_local: bool,
}

impl Session {
    /// Returns `true` if the session has no expiry or it has passed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => true,
        }
    }

    /// Time left until expiry, zero when expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at
            .and_then(|e| (e - now).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    /// Returns `true` if a refresh can be attempted.
    pub fn has_refresh_material(&self) -> bool {
        self.tokens
            .refresh_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

// =============================================================================
// LoginGrant
// =============================================================================

/// Outcome of a successful identity-provider login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    /// The principal.
    pub principal: SessionPrincipal,
    /// Role resolved for the principal.
    pub role: RoleKey,
    /// Issued tokens.
    pub tokens: TokenSet,
    /// Lifetime reported by the provider.
    pub expires_in: Option<Duration>,
    /// Provider account correlation id.
    pub provider_account_id: Option<String>,
    /// `true` for local (demo) logins.
    pub is_local: bool,
}

impl LoginGrant {
    /// Creates a provider grant.
    pub fn new(principal: SessionPrincipal, role: impl Into<RoleKey>, tokens: TokenSet) -> Self {
        Self {
            principal,
            role: role.into(),
            tokens,
            expires_in: None,
            provider_account_id: None,
            is_local: false,
        }
    }

    /// Creates a local (demo) grant without tokens.
    pub fn local(principal: SessionPrincipal, role: impl Into<RoleKey>) -> Self {
        Self {
            is_local: true,
            ..Self::new(principal, role, TokenSet::default())
        }
    }

    /// Sets the provider-reported lifetime.
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Sets the provider account id.
    pub fn with_provider_account(mut self, id: impl Into<String>) -> Self {
        self.provider_account_id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: Option<DateTime<Utc>>) -> Session {
        Session {
            principal: SessionPrincipal {
                id: "u-1".into(),
                email: Email::parse("a@x.com").unwrap(),
                name: None,
                image: None,
            },
            role: RoleKey::new("VIEWER"),
            role_display_name: "Viewer".into(),
            permissions: Vec::new(),
            tokens: TokenSet::default(),
            expires_at,
            last_activity: Utc::now(),
            provider_account_id: None,
            is_local: false,
        }
    }

    #[test]
    fn test_missing_expiry_counts_as_expired() {
        assert!(session(None).is_expired_at(Utc::now()));
    }

    #[test]
    fn test_remaining() {
        let now = Utc::now();
        let s = session(Some(now + chrono::Duration::minutes(4)));
        assert!(!s.is_expired_at(now));
        assert_eq!(s.remaining_at(now), Duration::from_secs(240));

        let s = session(Some(now - chrono::Duration::seconds(1)));
        assert_eq!(s.remaining_at(now), Duration::ZERO);
    }

    #[test]
    fn test_refresh_material() {
        let mut s = session(None);
        assert!(!s.has_refresh_material());
        s.tokens.refresh_token = Some(String::new());
        assert!(!s.has_refresh_material());
        s.tokens.refresh_token = Some("rt".into());
        assert!(s.has_refresh_material());
    }
}
