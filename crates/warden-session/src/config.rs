// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Key under which the snapshot is persisted.
pub const DEFAULT_STORAGE_KEY: &str = "warden.session";

/// Timing parameters of the session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of a provider-issued session when the grant carries none.
    #[serde(with = "duration_secs")]
    pub token_lifetime: Duration,

    /// Lifetime of a local (demo) session.
    #[serde(with = "duration_secs")]
    pub local_lifetime: Duration,

    /// Window before expiry in which a proactive refresh is attempted.
    #[serde(with = "duration_secs")]
    pub refresh_lookahead: Duration,

    /// Expiry extension after a refresh that returns no lifetime.
    #[serde(with = "duration_secs")]
    pub refresh_lifetime: Duration,

    /// Time budget for one refresh call.
    #[serde(with = "duration_secs")]
    pub refresh_timeout: Duration,

    /// Snapshot key in the session store.
    pub storage_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_lifetime: Duration::from_secs(60 * 60),
            local_lifetime: Duration::from_secs(24 * 60 * 60),
            refresh_lookahead: Duration::from_secs(5 * 60),
            refresh_lifetime: Duration::from_secs(60 * 60),
            refresh_timeout: Duration::from_secs(10),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl SessionConfig {
    /// Sets the token lifetime.
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Sets the proactive refresh window.
    pub fn with_refresh_lookahead(mut self, lookahead: Duration) -> Self {
        self.refresh_lookahead = lookahead;
        self
    }

    /// Sets the refresh timeout.
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Sets the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
