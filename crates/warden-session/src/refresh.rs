// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token refresh collaborator.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SessionResult;

/// Tokens returned by a successful refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshedTokens {
    /// New access token.
    pub access_token: Option<String>,
    /// New id token.
    pub id_token: Option<String>,
    /// Rotated refresh token; the old one is kept when absent.
    pub refresh_token: Option<String>,
    /// Lifetime of the new tokens.
    pub expires_in: Option<Duration>,
}

impl RefreshedTokens {
    /// Tokens carrying only a new access token.
    pub fn access(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Sets the lifetime.
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }
}

/// Exchanges refresh material with the identity provider.
///
/// Implementations should fail with
/// [`SessionError::Refresh`](crate::SessionError::Refresh) when the provider
/// rejects the material; the caller bounds every call with a timeout.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchanges `refresh_token` for new tokens.
    async fn refresh(&self, refresh_token: &str) -> SessionResult<RefreshedTokens>;
}
