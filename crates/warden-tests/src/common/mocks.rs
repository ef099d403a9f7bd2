// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Collaborators with scripted outcomes, injected latency and call
//! counters, for driving warden components through their failure paths.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use warden_core::{
    AuditError, AuditFilter, AuditLogger, AuditResult, Email, IdentityError, IdentityMapping,
    IdentityResult, InMemoryOverrideStore, OverrideStore, RoleChangeRecord,
};
use warden_session::{RefreshedTokens, SessionError, SessionResult, TokenRefresher};

// =============================================================================
// Mock Token Refresher
// =============================================================================

/// Scripted outcome of one refresh call.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// Succeed with these tokens.
    Tokens(RefreshedTokens),
    /// Fail as if the provider rejected the refresh token.
    Reject,
}

/// A token refresher that replays scripted outcomes.
///
/// When the script runs out every further call is rejected.
#[derive(Debug, Default)]
pub struct MockTokenRefresher {
    script: Mutex<VecDeque<RefreshOutcome>>,
    latency: Mutex<Duration>,
    calls: AtomicU64,
    seen_tokens: Mutex<Vec<String>>,
}

impl MockTokenRefresher {
    /// Creates a refresher with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a refresher that succeeds `times` times with `expires_in`.
    pub fn succeeding(times: usize, expires_in: Duration) -> Self {
        let script = (0..times)
            .map(|i| {
                RefreshOutcome::Tokens(
                    RefreshedTokens {
                        access_token: Some(format!("access-{}", i + 2)),
                        refresh_token: Some(format!("refresh-{}", i + 2)),
                        ..RefreshedTokens::default()
                    }
                    .with_expires_in(expires_in),
                )
            })
            .collect();
        Self {
            script: Mutex::new(script),
            ..Self::default()
        }
    }

    /// Creates a refresher that always rejects.
    pub fn rejecting() -> Self {
        Self::new()
    }

    /// Delays every call.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.lock().await = latency;
    }

    /// Appends an outcome to the script.
    pub async fn push(&self, outcome: RefreshOutcome) {
        self.script.lock().await.push_back(outcome);
    }

    /// Number of calls made.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens presented, in call order.
    pub async fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().await.clone()
    }
}

#[async_trait]
impl TokenRefresher for MockTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> SessionResult<RefreshedTokens> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens.lock().await.push(refresh_token.to_string());

        let latency = *self.latency.lock().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match self.script.lock().await.pop_front() {
            Some(RefreshOutcome::Tokens(tokens)) => Ok(tokens),
            Some(RefreshOutcome::Reject) | None => {
                Err(SessionError::refresh("refresh token rejected"))
            }
        }
    }
}

// =============================================================================
// Flaky Override Store
// =============================================================================

/// An override store wrapper with outage and latency injection.
#[derive(Debug, Default)]
pub struct FlakyOverrideStore {
    inner: InMemoryOverrideStore,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
    lookups: AtomicU64,
}

impl FlakyOverrideStore {
    /// Creates an empty, healthy store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `mappings`.
    pub fn with_mappings(mappings: impl IntoIterator<Item = IdentityMapping>) -> Self {
        Self {
            inner: InMemoryOverrideStore::with_mappings(mappings),
            ..Self::default()
        }
    }

    /// Makes every call fail with `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delays every call.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of `find` calls.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }

    async fn gate(&self) -> IdentityResult<()> {
        let latency = Duration::from_millis(self.latency_ms.load(Ordering::SeqCst));
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::store_unavailable("injected outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl OverrideStore for FlakyOverrideStore {
    async fn find(&self, email: &Email) -> IdentityResult<Option<IdentityMapping>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        self.inner.find(email).await
    }

    async fn upsert(&self, mapping: IdentityMapping) -> IdentityResult<()> {
        self.gate().await?;
        self.inner.upsert(mapping).await
    }

    async fn delete(&self, email: &Email) -> IdentityResult<bool> {
        self.gate().await?;
        self.inner.delete(email).await
    }

    async fn list(&self) -> IdentityResult<Vec<IdentityMapping>> {
        self.gate().await?;
        self.inner.list().await
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

// =============================================================================
// Failing Audit Logger
// =============================================================================

/// An audit logger whose writes always fail.
#[derive(Debug, Default)]
pub struct FailingAuditLogger {
    attempts: AtomicU64,
}

impl FailingAuditLogger {
    /// Creates the logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of write attempts.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuditLogger for FailingAuditLogger {
    async fn log(&self, _record: RoleChangeRecord) -> AuditResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuditError::write_failed("disk full"))
    }

    async fn query(&self, _filter: AuditFilter) -> AuditResult<Vec<RoleChangeRecord>> {
        Err(AuditError::query_failed("unavailable"))
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "failing"
    }
}
