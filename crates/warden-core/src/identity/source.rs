// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Email-to-role resolution as a chain of sources.
//!
//! Sources are consulted in priority order. The first one that yields a role
//! known to the registry wins. A source that errors or yields an unknown role
//! is skipped with a warning, so login never depends on any single source.
//! When nothing matches, the registry's default role applies.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::store::OverrideStore;
use crate::error::{IdentityError, IdentityResult};
use crate::role::RoleRegistry;
use crate::types::{Email, RoleKey};

/// Default time budget for one override store lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

// =============================================================================
// ResolutionTier / Resolution
// =============================================================================

/// Which tier produced a resolved role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    /// The audited override store.
    Override,
    /// The static mapping table.
    Static,
    /// No mapping; the configured default role.
    Default,
}

impl ResolutionTier {
    /// Returns the tier name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTier::Override => "override",
            ResolutionTier::Static => "static",
            ResolutionTier::Default => "default",
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved role together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The resolved role; always known to the registry.
    pub role: RoleKey,
    /// The tier that produced it.
    pub tier: ResolutionTier,
}

// =============================================================================
// RoleSource
// =============================================================================

/// One tier of the resolver chain.
#[async_trait]
pub trait RoleSource: Send + Sync {
    /// Looks up the role mapped to `email`, `Ok(None)` if unmapped.
    async fn lookup(&self, email: &Email) -> IdentityResult<Option<RoleKey>>;

    /// Returns the tier this source represents.
    fn tier(&self) -> ResolutionTier;
}

/// Resolves through the audited override store with a bounded timeout.
pub struct OverrideRoleSource {
    store: Arc<dyn OverrideStore>,
    timeout: Duration,
}

impl OverrideRoleSource {
    /// Creates a source over `store` with the default lookup timeout.
    pub fn new(store: Arc<dyn OverrideStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Sets the lookup timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for OverrideRoleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideRoleSource")
            .field("store", &self.store.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl RoleSource for OverrideRoleSource {
    async fn lookup(&self, email: &Email) -> IdentityResult<Option<RoleKey>> {
        let found = tokio::time::timeout(self.timeout, self.store.find(email))
            .await
            .map_err(|_| IdentityError::timeout("override lookup", self.timeout))??;
        Ok(found.map(|m| m.role))
    }

    fn tier(&self) -> ResolutionTier {
        ResolutionTier::Override
    }
}

/// Resolves through a fixed table compiled into configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleSource {
    mappings: HashMap<String, RoleKey>,
}

impl StaticRoleSource {
    /// Creates a source from `(email, role)` pairs; emails are normalised.
    pub fn new<I, E, R>(mappings: I) -> Self
    where
        I: IntoIterator<Item = (E, R)>,
        E: AsRef<str>,
        R: Into<RoleKey>,
    {
        Self {
            mappings: mappings
                .into_iter()
                .map(|(email, role)| (Email::normalize(email.as_ref()), role.into()))
                .collect(),
        }
    }

    /// Returns the number of mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[async_trait]
impl RoleSource for StaticRoleSource {
    async fn lookup(&self, email: &Email) -> IdentityResult<Option<RoleKey>> {
        Ok(self.mappings.get(email.as_str()).cloned())
    }

    fn tier(&self) -> ResolutionTier {
        ResolutionTier::Static
    }
}

// =============================================================================
// RoleResolver
// =============================================================================

/// Ordered chain of role sources with a default fallback.
#[derive(Clone)]
pub struct RoleResolver {
    registry: Arc<RoleRegistry>,
    sources: Vec<Arc<dyn RoleSource>>,
}

impl RoleResolver {
    /// Creates a resolver with no sources; everything resolves to the
    /// default role until sources are added.
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self {
            registry,
            sources: Vec::new(),
        }
    }

    /// Appends a source with lower priority than the ones already added.
    pub fn with_source(mut self, source: impl RoleSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Appends a shared source.
    pub fn with_shared_source(mut self, source: Arc<dyn RoleSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Arc<RoleRegistry> {
        &self.registry
    }

    /// Resolves the role for an already-normalised email. Never fails.
    pub async fn resolve(&self, email: &Email) -> Resolution {
        self.resolve_sources(email, None).await
    }

    /// Resolves `email` while ignoring every source of `tier`: the role the
    /// principal would hold if that tier had no entry for it.
    pub async fn resolve_below(&self, email: &Email, tier: ResolutionTier) -> Resolution {
        self.resolve_sources(email, Some(tier)).await
    }

    async fn resolve_sources(&self, email: &Email, skip: Option<ResolutionTier>) -> Resolution {
        for source in &self.sources {
            let tier = source.tier();
            if skip == Some(tier) {
                continue;
            }
            match source.lookup(email).await {
                Ok(Some(role)) if self.registry.contains(role.as_str()) => {
                    debug!(email = %email, role = %role, tier = %tier, "Role resolved");
                    return Resolution { role, tier };
                }
                Ok(Some(role)) => {
                    warn!(
                        email = %email,
                        role = %role,
                        tier = %tier,
                        "Mapped role is not registered, skipping"
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        email = %email,
                        tier = %tier,
                        error = %e,
                        "Role source unavailable, falling back"
                    );
                }
            }
        }

        let role = self.registry.default_role().clone();
        debug!(email = %email, role = %role, "No mapping, using default role");
        Resolution {
            role,
            tier: ResolutionTier::Default,
        }
    }

    /// Normalises `raw` and resolves it.
    pub async fn resolve_raw(&self, raw: &str) -> IdentityResult<Resolution> {
        let email = Email::parse(raw)?;
        Ok(self.resolve(&email).await)
    }
}

impl fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tiers: Vec<ResolutionTier> = self.sources.iter().map(|s| s.tier()).collect();
        f.debug_struct("RoleResolver")
            .field("sources", &tiers)
            .field("default_role", self.registry.default_role())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::store::{IdentityMapping, InMemoryOverrideStore};

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    struct SlowStore;

    #[async_trait]
    impl OverrideStore for SlowStore {
        async fn find(&self, _email: &Email) -> IdentityResult<Option<IdentityMapping>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }
        async fn upsert(&self, _mapping: IdentityMapping) -> IdentityResult<()> {
            Ok(())
        }
        async fn delete(&self, _email: &Email) -> IdentityResult<bool> {
            Ok(false)
        }
        async fn list(&self) -> IdentityResult<Vec<IdentityMapping>> {
            Ok(Vec::new())
        }
    }

    fn resolver(store: InMemoryOverrideStore) -> RoleResolver {
        RoleResolver::new(Arc::new(RoleRegistry::new()))
            .with_source(OverrideRoleSource::new(Arc::new(store)))
            .with_source(StaticRoleSource::new([("manager@theqexle.com", "MANAGER")]))
    }

    #[tokio::test]
    async fn test_override_wins_over_static() {
        let store = InMemoryOverrideStore::with_mappings([IdentityMapping::new(
            email("manager@theqexle.com"),
            "DEVELOPER",
            "demoted",
            "admin@theqexle.com",
        )]);

        let resolution = resolver(store).resolve(&email("manager@theqexle.com")).await;
        assert_eq!(resolution.role.as_str(), "DEVELOPER");
        assert_eq!(resolution.tier, ResolutionTier::Override);
    }

    #[tokio::test]
    async fn test_resolve_below_skips_tier() {
        let store = InMemoryOverrideStore::with_mappings([IdentityMapping::new(
            email("manager@theqexle.com"),
            "DEVELOPER",
            "demoted",
            "admin@theqexle.com",
        )]);
        let resolver = resolver(store);
        let who = email("manager@theqexle.com");

        let below = resolver.resolve_below(&who, ResolutionTier::Override).await;
        assert_eq!(below.role.as_str(), "MANAGER");
        assert_eq!(below.tier, ResolutionTier::Static);
        assert_eq!(resolver.resolve(&who).await.role.as_str(), "DEVELOPER");
    }

    #[tokio::test]
    async fn test_static_and_default_tiers() {
        let resolver = resolver(InMemoryOverrideStore::new());

        let resolved = resolver.resolve_raw(" Manager@TheQexle.com ").await.unwrap();
        assert_eq!(resolved.role.as_str(), "MANAGER");
        assert_eq!(resolved.tier, ResolutionTier::Static);

        let resolved = resolver.resolve(&email("nobody@demo.com")).await;
        assert_eq!(resolved.role.as_str(), "VIEWER");
        assert_eq!(resolved.tier, ResolutionTier::Default);
    }

    #[tokio::test]
    async fn test_outage_falls_back_to_static() {
        let store = InMemoryOverrideStore::with_mappings([IdentityMapping::new(
            email("manager@theqexle.com"),
            "DEVELOPER",
            "demoted",
            "admin@theqexle.com",
        )]);
        store.set_available(false);

        let resolution = resolver(store).resolve(&email("manager@theqexle.com")).await;
        assert_eq!(resolution.role.as_str(), "MANAGER");
        assert_eq!(resolution.tier, ResolutionTier::Static);
    }

    #[tokio::test]
    async fn test_unknown_role_is_skipped() {
        let store = InMemoryOverrideStore::with_mappings([IdentityMapping::new(
            email("stale@demo.com"),
            "LEGACY_ROLE",
            "old data",
            "system",
        )]);

        let resolution = resolver(store).resolve(&email("stale@demo.com")).await;
        assert_eq!(resolution.role.as_str(), "VIEWER");
        assert_eq!(resolution.tier, ResolutionTier::Default);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out() {
        let resolver = RoleResolver::new(Arc::new(RoleRegistry::new()))
            .with_source(
                OverrideRoleSource::new(Arc::new(SlowStore)).with_timeout(Duration::from_millis(50)),
            )
            .with_source(StaticRoleSource::new([("dev@demo.com", "DEVELOPER")]));

        let resolution = resolver.resolve(&email("dev@demo.com")).await;
        assert_eq!(resolution.role.as_str(), "DEVELOPER");
    }
}
