// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The session state machine.
//!
//! ```text
//! Anonymous ──begin_login──▶ Authenticating ──complete_login──▶ Valid
//!     ▲                           │                               │ lookahead window
//!     │◀────────fail_login────────┘                               ▼
//!     │                                                       NearExpiry
//!     │◀──── validate(): expired and refresh failed ──── Expired ◀┘
//!     │◀──── logout(): from any state
//! ```
//!
//! One [`SessionContext`] holds one logical session. It is constructed at the
//! application boundary and passed explicitly to guards and handlers; clones
//! share the same state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use warden_core::{grants_allow, RoleRegistry};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::refresh::{RefreshedTokens, TokenRefresher};
use crate::session::{LoginGrant, Session, SessionStatus};
use crate::store::{MemorySessionStore, SessionStore};

#[derive(Debug, Clone)]
enum Phase {
    Anonymous,
    Authenticating,
    Authenticated(Session),
}

struct Inner {
    phase: Mutex<Phase>,
    config: SessionConfig,
    registry: Arc<RoleRegistry>,
    store: Arc<dyn SessionStore>,
    refresher: Option<Arc<dyn TokenRefresher>>,
    /// Serialises refresh calls.
    refresh_gate: tokio::sync::Mutex<()>,
    /// Set while a proactive refresh task is running.
    refresh_in_flight: AtomicBool,
}

// =============================================================================
// SessionContext
// =============================================================================

/// Explicitly constructed holder of one client session.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

impl SessionContext {
    /// Creates a context with an in-memory store and no refresher.
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self::builder(registry).build()
    }

    /// Creates a builder.
    pub fn builder(registry: Arc<RoleRegistry>) -> SessionContextBuilder {
        SessionContextBuilder::new(registry)
    }

    /// Returns the timing configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Returns the role registry.
    pub fn registry(&self) -> &Arc<RoleRegistry> {
        &self.inner.registry
    }

    // =========================================================================
    // Login / logout
    // =========================================================================

    /// Marks a login attempt as started. Only valid from `Anonymous`;
    /// returns `false` and leaves the state untouched otherwise.
    pub fn begin_login(&self) -> bool {
        let mut phase = self.inner.phase.lock();
        match *phase {
            Phase::Anonymous => {
                *phase = Phase::Authenticating;
                debug!("Login started");
                true
            }
            _ => false,
        }
    }

    /// Abandons a login attempt.
    pub fn fail_login(&self) {
        let mut phase = self.inner.phase.lock();
        if matches!(*phase, Phase::Authenticating) {
            *phase = Phase::Anonymous;
            debug!("Login failed");
        }
    }

    /// Establishes the session from a successful login.
    ///
    /// A role unknown to the registry is replaced by the default role. The
    /// expiry is `now + expires_in`, falling back to the configured token
    /// lifetime (or local lifetime for local grants).
    pub fn complete_login(&self, grant: LoginGrant) -> Session {
        let registry = &self.inner.registry;
        let config = &self.inner.config;

        let role = if registry.contains(grant.role.as_str()) {
            grant.role
        } else {
            warn!(role = %grant.role, "Login role is not registered, using default");
            registry.default_role().clone()
        };

        let lifetime = grant.expires_in.unwrap_or(if grant.is_local {
            config.local_lifetime
        } else {
            config.token_lifetime
        });
        let now = Utc::now();

        let session = Session {
            principal: grant.principal,
            role_display_name: registry.display_name(role.as_str()).to_string(),
            permissions: registry.permissions_of(role.as_str()).to_vec(),
            role,
            tokens: grant.tokens,
            expires_at: expiry_from(now, lifetime),
            last_activity: now,
            provider_account_id: grant.provider_account_id,
            is_local: grant.is_local,
        };

        let mut phase = self.inner.phase.lock();
        *phase = Phase::Authenticated(session.clone());
        self.persist(Some(&session));

        info!(
            email = %session.principal.email,
            role = %session.role,
            local = session.is_local,
            "Session established"
        );
        session
    }

    /// Clears the session and its persisted copy, from any state.
    pub fn logout(&self) {
        let mut phase = self.inner.phase.lock();
        if let Phase::Authenticated(ref session) = *phase {
            info!(email = %session.principal.email, "Logged out");
        }
        *phase = Phase::Anonymous;
        self.persist(None);
    }

    /// Stamps the last-activity time. Expiry is unaffected.
    pub fn update_activity(&self) -> bool {
        let mut phase = self.inner.phase.lock();
        match *phase {
            Phase::Authenticated(ref mut session) => {
                session.last_activity = Utc::now();
                self.persist(Some(&*session));
                true
            }
            _ => false,
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Returns a copy of the current session.
    pub fn current(&self) -> Option<Session> {
        match *self.inner.phase.lock() {
            Phase::Authenticated(ref session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Returns the current session or [`SessionError::NotAuthenticated`].
    pub fn require(&self) -> SessionResult<Session> {
        self.current().ok_or(SessionError::NotAuthenticated)
    }

    /// Returns the derived state at the current time.
    pub fn status(&self) -> SessionStatus {
        self.status_at(Utc::now())
    }

    /// Returns the derived state at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        match *self.inner.phase.lock() {
            Phase::Anonymous => SessionStatus::Anonymous,
            Phase::Authenticating => SessionStatus::Authenticating,
            Phase::Authenticated(ref session) => {
                if session.is_expired_at(now) {
                    SessionStatus::Expired
                } else if session.remaining_at(now) <= self.inner.config.refresh_lookahead {
                    SessionStatus::NearExpiry
                } else {
                    SessionStatus::Valid
                }
            }
        }
    }

    /// Checks the cached permission snapshot. The top role is allowed
    /// everything; without a session nothing is allowed.
    pub fn can(&self, resource: &str, action: &str) -> bool {
        match *self.inner.phase.lock() {
            Phase::Authenticated(ref session) => {
                self.inner.registry.is_top_role(session.role.as_str())
                    || grants_allow(&session.permissions, resource, action)
            }
            _ => false,
        }
    }

    // =========================================================================
    // Validity
    // =========================================================================

    /// Returns `true` if the session may be used.
    ///
    /// - no session, or a session without expiry: `false`
    /// - past expiry: the outcome of [`refresh`](Self::refresh); on failure
    ///   the session is cleared
    /// - inside the lookahead window: `true`, with a background refresh
    ///   started unless one is already running
    pub async fn validate(&self) -> bool {
        let now = Utc::now();
        let (expires_at, refreshable) = match *self.inner.phase.lock() {
            Phase::Authenticated(ref session) => {
                (session.expires_at, session.has_refresh_material())
            }
            _ => return false,
        };

        let Some(expires_at) = expires_at else {
            debug!("Session has no expiry, treating as invalid");
            return false;
        };

        if now >= expires_at {
            if self.refresh().await {
                return true;
            }
            warn!("Session expired and could not be refreshed");
            self.expire();
            return false;
        }

        let remaining = (expires_at - now).to_std().unwrap_or(Duration::ZERO);
        if remaining <= self.inner.config.refresh_lookahead && refreshable {
            self.spawn_proactive_refresh();
        }
        true
    }

    /// Exchanges the refresh token for new tokens and extends the expiry.
    ///
    /// Returns `false` without touching the session when there is no
    /// refresher or refresh material, or when the call fails or times out.
    /// Concurrent calls are serialised; a caller that waited behind a
    /// successful refresh returns `true` without calling the provider again.
    pub async fn refresh(&self) -> bool {
        let Some(refresher) = self.inner.refresher.clone() else {
            debug!("No token refresher configured");
            return false;
        };
        let Some(observed_expiry) = self.current().map(|s| s.expires_at) else {
            return false;
        };

        let _gate = self.inner.refresh_gate.lock().await;

        let refresh_token = match self.current() {
            None => return false,
            Some(session)
                if session.expires_at != observed_expiry
                    && !session.is_expired_at(Utc::now()) =>
            {
                debug!("Session refreshed concurrently");
                return true;
            }
            Some(session) => match session.tokens.refresh_token {
                Some(token) if !token.is_empty() => token,
                _ => {
                    debug!("No refresh material");
                    return false;
                }
            },
        };

        let timeout = self.inner.config.refresh_timeout;
        let result = match tokio::time::timeout(timeout, refresher.refresh(&refresh_token)).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::timeout("token refresh", timeout)),
        };

        match result {
            Ok(tokens) => self.apply_refresh(tokens),
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                false
            }
        }
    }

    /// Loads the persisted snapshot.
    ///
    /// Expired or malformed snapshots are erased and leave the context
    /// anonymous.
    pub fn restore(&self) -> SessionStatus {
        let key = &self.inner.config.storage_key;
        let raw = match self.inner.store.load(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.status(),
            Err(e) => {
                warn!(error = %e, "Failed to read session snapshot");
                if matches!(e, SessionError::Malformed { .. }) {
                    self.erase();
                }
                return self.status();
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if !session.is_expired_at(Utc::now()) => {
                info!(email = %session.principal.email, "Session restored");
                *self.inner.phase.lock() = Phase::Authenticated(session);
            }
            Ok(session) => {
                info!(email = %session.principal.email, "Persisted session expired, discarding");
                self.erase();
            }
            Err(e) => {
                warn!(error = %e, "Discarding malformed session snapshot");
                self.erase();
            }
        }
        self.status()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn spawn_proactive_refresh(&self) {
        if self.inner.refresher.is_none() {
            return;
        }
        if self
            .inner
            .refresh_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Proactive refresh already in flight");
            return;
        }

        debug!("Starting proactive refresh");
        let ctx = self.clone();
        tokio::spawn(async move {
            let refreshed = ctx.refresh().await;
            ctx.inner.refresh_in_flight.store(false, Ordering::Release);
            debug!(refreshed, "Proactive refresh finished");
        });
    }

    fn apply_refresh(&self, tokens: RefreshedTokens) -> bool {
        let registry = &self.inner.registry;
        let lifetime = tokens.expires_in.unwrap_or(self.inner.config.refresh_lifetime);

        let mut phase = self.inner.phase.lock();
        let Phase::Authenticated(ref mut session) = *phase else {
            debug!("Session ended during refresh, dropping tokens");
            return false;
        };

        if tokens.access_token.is_some() {
            session.tokens.access_token = tokens.access_token;
        }
        if tokens.id_token.is_some() {
            session.tokens.id_token = tokens.id_token;
        }
        if tokens.refresh_token.is_some() {
            session.tokens.refresh_token = tokens.refresh_token;
        }
        session.expires_at = expiry_from(Utc::now(), lifetime);
        if let Some(role) = registry.get_role(session.role.as_str()) {
            session.role_display_name = role.display_name.clone();
            session.permissions = role.permissions.clone();
        }
        self.persist(Some(&*session));

        info!(email = %session.principal.email, expires_at = ?session.expires_at, "Session refreshed");
        true
    }

    fn expire(&self) {
        let mut phase = self.inner.phase.lock();
        if let Phase::Authenticated(ref session) = *phase {
            if session.is_expired_at(Utc::now()) {
                info!(email = %session.principal.email, "Session expired");
                *phase = Phase::Anonymous;
                self.persist(None);
            }
        }
    }

    fn erase(&self) {
        if let Err(e) = self.inner.store.remove(&self.inner.config.storage_key) {
            warn!(error = %e, "Failed to erase session snapshot");
        }
    }

    /// Writes or erases the snapshot. Callers hold the phase lock so that
    /// snapshots land in mutation order.
    fn persist(&self, session: Option<&Session>) {
        let key = &self.inner.config.storage_key;
        let result = match session {
            Some(session) => serde_json::to_string(session)
                .map_err(SessionError::from)
                .and_then(|text| self.inner.store.save(key, &text)),
            None => self.inner.store.remove(key),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session snapshot");
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("status", &self.status())
            .field("has_refresher", &self.inner.refresher.is_some())
            .finish()
    }
}

fn expiry_from(now: DateTime<Utc>, lifetime: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(lifetime)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
}

// =============================================================================
// SessionContextBuilder
// =============================================================================

/// Builder for [`SessionContext`].
pub struct SessionContextBuilder {
    registry: Arc<RoleRegistry>,
    config: SessionConfig,
    store: Option<Arc<dyn SessionStore>>,
    refresher: Option<Arc<dyn TokenRefresher>>,
}

impl SessionContextBuilder {
    /// Creates a new builder.
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self {
            registry,
            config: SessionConfig::default(),
            store: None,
            refresher: None,
        }
    }

    /// Sets the timing configuration.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the snapshot store (default: in-memory).
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the token refresher.
    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Builds the context in the `Anonymous` state.
    pub fn build(self) -> SessionContext {
        SessionContext {
            inner: Arc::new(Inner {
                phase: Mutex::new(Phase::Anonymous),
                config: self.config,
                registry: self.registry,
                store: self
                    .store
                    .unwrap_or_else(|| Arc::new(MemorySessionStore::new())),
                refresher: self.refresher,
                refresh_gate: tokio::sync::Mutex::new(()),
                refresh_in_flight: AtomicBool::new(false),
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionPrincipal, TokenSet};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use warden_core::Email;

    #[derive(Clone, Copy)]
    enum Mode {
        Succeed,
        Fail,
        Pending,
        Delay(Duration),
    }

    struct MockRefresher {
        calls: AtomicUsize,
        mode: Mode,
    }

    impl MockRefresher {
        fn new(mode: Mode) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                mode,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenRefresher for MockRefresher {
        async fn refresh(&self, _refresh_token: &str) -> SessionResult<RefreshedTokens> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                Mode::Succeed => Ok(RefreshedTokens::access("fresh-access")),
                Mode::Fail => Err(SessionError::refresh("network down")),
                Mode::Pending => std::future::pending().await,
                Mode::Delay(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(RefreshedTokens::access("fresh-access"))
                }
            }
        }
    }

    fn principal() -> SessionPrincipal {
        SessionPrincipal {
            id: "user-1".into(),
            email: Email::parse("dev@demo.com").unwrap(),
            name: Some("Dev".into()),
            image: None,
        }
    }

    fn tokens() -> TokenSet {
        TokenSet {
            access_token: Some("access".into()),
            id_token: None,
            refresh_token: Some("refresh".into()),
        }
    }

    fn context(refresher: Option<Arc<MockRefresher>>, store: MemorySessionStore) -> SessionContext {
        let mut builder =
            SessionContext::builder(Arc::new(RoleRegistry::new())).store(Arc::new(store));
        if let Some(refresher) = refresher {
            builder = builder.refresher(refresher);
        }
        builder.build()
    }

    fn login(ctx: &SessionContext, expires_in: Duration) -> Session {
        ctx.complete_login(LoginGrant::new(principal(), "DEVELOPER", tokens()).with_expires_in(expires_in))
    }

    async fn wait_for_calls(refresher: &MockRefresher, expected: usize) {
        for _ in 0..100 {
            if refresher.calls() >= expected {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_login_lifecycle() {
        let store = MemorySessionStore::new();
        let ctx = context(None, store.clone());

        assert_eq!(ctx.status(), SessionStatus::Anonymous);
        assert!(!ctx.validate().await);

        assert!(ctx.begin_login());
        assert!(!ctx.begin_login());
        assert_eq!(ctx.status(), SessionStatus::Authenticating);
        ctx.fail_login();
        assert_eq!(ctx.status(), SessionStatus::Anonymous);

        ctx.begin_login();
        let session = ctx.complete_login(LoginGrant::new(principal(), "DEVELOPER", tokens()));
        assert_eq!(session.role_display_name, "Developer");
        assert_eq!(ctx.status(), SessionStatus::Valid);
        assert!(ctx.validate().await);
        assert!(store.contains(&ctx.config().storage_key));

        let remaining = session.remaining_at(Utc::now());
        assert!(remaining > Duration::from_secs(3590) && remaining <= Duration::from_secs(3600));

        ctx.logout();
        assert_eq!(ctx.status(), SessionStatus::Anonymous);
        assert!(!store.contains(&ctx.config().storage_key));
    }

    #[tokio::test]
    async fn test_local_login_lasts_a_day() {
        let ctx = context(None, MemorySessionStore::new());
        let session = ctx.complete_login(LoginGrant::local(principal(), "VIEWER"));

        assert!(session.is_local);
        assert!(session.remaining_at(Utc::now()) > Duration::from_secs(23 * 3600));
    }

    #[tokio::test]
    async fn test_unknown_login_role_becomes_default() {
        let ctx = context(None, MemorySessionStore::new());
        let session = ctx.complete_login(LoginGrant::new(principal(), "LEGACY", tokens()));

        assert_eq!(session.role.as_str(), "VIEWER");
        assert!(ctx.can("projects", "read"));
        assert!(!ctx.can("projects", "update"));
    }

    #[tokio::test]
    async fn test_update_activity_keeps_expiry() {
        let ctx = context(None, MemorySessionStore::new());
        assert!(!ctx.update_activity());

        let session = login(&ctx, Duration::from_secs(3600));
        assert!(ctx.update_activity());

        let after = ctx.current().unwrap();
        assert_eq!(after.expires_at, session.expires_at);
        assert!(after.last_activity >= session.last_activity);
    }

    #[tokio::test]
    async fn test_near_expiry_refreshes_once_in_background() {
        let refresher = MockRefresher::new(Mode::Pending);
        let ctx = context(Some(refresher.clone()), MemorySessionStore::new());
        login(&ctx, Duration::from_secs(4 * 60));

        assert_eq!(ctx.status(), SessionStatus::NearExpiry);
        assert!(ctx.validate().await);
        wait_for_calls(&refresher, 1).await;
        assert_eq!(refresher.calls(), 1);

        // Second check while the first refresh is still pending.
        assert!(ctx.validate().await);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(refresher.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_with_failed_refresh_clears_session() {
        let refresher = MockRefresher::new(Mode::Fail);
        let store = MemorySessionStore::new();
        let ctx = context(Some(refresher.clone()), store.clone());
        login(&ctx, Duration::ZERO);

        assert_eq!(ctx.status(), SessionStatus::Expired);
        assert!(!ctx.validate().await);
        assert_eq!(refresher.calls(), 1);
        assert_eq!(ctx.status(), SessionStatus::Anonymous);
        assert!(!store.contains(&ctx.config().storage_key));
    }

    #[tokio::test]
    async fn test_expired_with_successful_refresh() {
        let refresher = MockRefresher::new(Mode::Succeed);
        let ctx = context(Some(refresher.clone()), MemorySessionStore::new());
        login(&ctx, Duration::ZERO);

        assert!(ctx.validate().await);
        let session = ctx.current().unwrap();
        assert_eq!(session.tokens.access_token.as_deref(), Some("fresh-access"));
        assert_eq!(session.tokens.refresh_token.as_deref(), Some("refresh"));
        assert!(session.remaining_at(Utc::now()) > Duration::from_secs(3590));
    }

    #[tokio::test]
    async fn test_refresh_failure_does_not_clear() {
        let refresher = MockRefresher::new(Mode::Fail);
        let ctx = context(Some(refresher), MemorySessionStore::new());
        login(&ctx, Duration::from_secs(3600));

        assert!(!ctx.refresh().await);
        assert_eq!(ctx.status(), SessionStatus::Valid);
    }

    #[tokio::test]
    async fn test_refresh_requires_material() {
        let refresher = MockRefresher::new(Mode::Succeed);
        let ctx = context(Some(refresher.clone()), MemorySessionStore::new());
        ctx.complete_login(LoginGrant::local(principal(), "DEVELOPER"));

        assert!(!ctx.refresh().await);
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_times_out() {
        let refresher = MockRefresher::new(Mode::Pending);
        let ctx = SessionContext::builder(Arc::new(RoleRegistry::new()))
            .config(SessionConfig::default().with_refresh_timeout(Duration::from_millis(100)))
            .refresher(refresher.clone())
            .build();
        login(&ctx, Duration::from_secs(3600));

        assert!(!ctx.refresh().await);
        assert_eq!(refresher.calls(), 1);
        assert!(ctx.current().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_refreshes_call_provider_once() {
        let refresher = MockRefresher::new(Mode::Delay(Duration::from_millis(50)));
        let ctx = context(Some(refresher.clone()), MemorySessionStore::new());
        login(&ctx, Duration::ZERO);

        let (a, b) = tokio::join!(ctx.validate(), ctx.validate());
        assert!(a && b);
        assert_eq!(refresher.calls(), 1);
    }

    #[tokio::test]
    async fn test_restore_round_trip() {
        let store = MemorySessionStore::new();
        let original = {
            let ctx = context(None, store.clone());
            login(&ctx, Duration::from_secs(3600))
        };

        let ctx = context(None, store);
        assert_eq!(ctx.restore(), SessionStatus::Valid);
        assert_eq!(ctx.current().unwrap(), original);
        assert!(ctx.validate().await);
    }

    #[tokio::test]
    async fn test_restore_discards_expired_and_malformed() {
        let store = MemorySessionStore::new();
        {
            let ctx = context(None, store.clone());
            login(&ctx, Duration::ZERO);
        }
        let ctx = context(None, store.clone());
        assert_eq!(ctx.restore(), SessionStatus::Anonymous);
        assert!(!store.contains(&ctx.config().storage_key));

        store.put_raw(&ctx.config().storage_key, "{\"principal\": 42");
        assert_eq!(ctx.restore(), SessionStatus::Anonymous);
        assert!(!store.contains(&ctx.config().storage_key));
    }

    #[tokio::test]
    async fn test_can_uses_snapshot_and_top_role() {
        let ctx = context(None, MemorySessionStore::new());
        assert!(!ctx.can("projects", "read"));

        login(&ctx, Duration::from_secs(3600));
        assert!(ctx.can("tasks", "create"));
        assert!(!ctx.can("users", "delete"));

        ctx.complete_login(LoginGrant::new(principal(), "SUPER_ADMIN", tokens()));
        assert!(ctx.can("anything", "at-all"));
    }
}
