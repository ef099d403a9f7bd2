// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity service: role resolution, principal records and role
//! administration.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::principal::{InMemoryPrincipalStore, PrincipalRecord, PrincipalStore, ProfileData};
use super::source::{
    OverrideRoleSource, Resolution, ResolutionTier, RoleResolver, StaticRoleSource,
    DEFAULT_LOOKUP_TIMEOUT,
};
use super::store::{IdentityMapping, InMemoryOverrideStore, OverrideStore};
use crate::audit::{AuditFilter, AuditLogger, AuditResult, InMemoryAuditLogger, RoleChangeRecord};
use crate::error::{IdentityError, IdentityResult};
use crate::role::RoleRegistry;
use crate::types::{Email, RoleKey};

// =============================================================================
// Actor
// =============================================================================

/// The principal performing an administrative operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor email.
    pub email: Email,
    /// Actor role at the time of the request.
    pub role: RoleKey,
}

impl Actor {
    /// Creates an actor.
    pub fn new(email: Email, role: impl Into<RoleKey>) -> Self {
        Self {
            email,
            role: role.into(),
        }
    }
}

// =============================================================================
// IdentityService
// =============================================================================

/// Resolves principals to roles and administers role assignments.
///
/// Holds no per-request state; every call re-reads the stores.
#[derive(Clone)]
pub struct IdentityService {
    registry: Arc<RoleRegistry>,
    resolver: RoleResolver,
    overrides: Arc<dyn OverrideStore>,
    principals: Arc<dyn PrincipalStore>,
    audit: Arc<dyn AuditLogger>,
    store_timeout: Duration,
}

impl IdentityService {
    /// Creates a builder.
    pub fn builder(registry: Arc<RoleRegistry>) -> IdentityServiceBuilder {
        IdentityServiceBuilder::new(registry)
    }

    /// Returns the role registry.
    pub fn registry(&self) -> &Arc<RoleRegistry> {
        &self.registry
    }

    /// Returns the resolver chain.
    pub fn resolver(&self) -> &RoleResolver {
        &self.resolver
    }

    /// Returns the audit logger.
    pub fn audit_logger(&self) -> &Arc<dyn AuditLogger> {
        &self.audit
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolves the role for `email`. Never fails; degraded sources fall
    /// through to the next tier.
    pub async fn resolve_role(&self, email: &Email) -> Resolution {
        self.resolver.resolve(email).await
    }

    /// Returns the stored record for `email`.
    pub async fn principal(&self, email: &Email) -> IdentityResult<Option<PrincipalRecord>> {
        self.bounded("principal lookup", self.principals.get(email))
            .await
    }

    /// Idempotent upsert of the principal record for `email`.
    ///
    /// The first call creates the record with the resolved role and emits an
    /// initial Role Change Record. Later calls update the stored role only if
    /// resolution now yields something different, emitting an automatic
    /// record. Every call refreshes `last_active_at`.
    pub async fn get_or_create_principal_record(
        &self,
        email: &Email,
        profile: &ProfileData,
    ) -> IdentityResult<PrincipalRecord> {
        let resolution = self.resolve_role(email).await;
        let fresh = PrincipalRecord::new(email.clone(), resolution.role.clone(), profile);
        let existing = self
            .bounded(
                "principal insert",
                self.principals.insert_if_absent(fresh.clone()),
            )
            .await?;

        let record = match existing {
            None => {
                let record = fresh;
                info!(email = %email, role = %record.role, tier = %resolution.tier, "Principal created");

                let delta = self.delta(None, &record.role);
                self.record_change(
                    RoleChangeRecord::initial_assignment(email.clone(), record.role.clone())
                        .with_hierarchy_delta(delta),
                )
                .await;
                record
            }
            Some(mut record) => {
                let drifted = record.role != resolution.role;
                let previous = std::mem::replace(&mut record.role, resolution.role.clone());
                if profile.name.is_some() {
                    record.name = profile.name.clone();
                }
                if profile.image.is_some() {
                    record.image = profile.image.clone();
                }
                record.last_active_at = chrono::Utc::now();
                self.save_principal(record.clone()).await?;

                if drifted {
                    info!(
                        email = %email,
                        from = %previous,
                        to = %record.role,
                        "Principal role updated from mapping"
                    );
                    let delta = self.delta(Some(&previous), &record.role);
                    self.record_change(
                        RoleChangeRecord::automatic(email.clone(), previous, record.role.clone())
                            .with_hierarchy_delta(delta),
                    )
                    .await;
                } else {
                    debug!(email = %email, role = %record.role, "Principal seen");
                }
                record
            }
        };

        Ok(record)
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// Roles `acting_role` may hand out, most privileged first.
    ///
    /// The top role may assign any role; any other role only those with a
    /// strictly lower rank.
    pub fn list_assignable_roles(&self, acting_role: &str) -> Vec<RoleKey> {
        let roles = self.registry.roles_by_rank();
        if self.registry.is_top_role(acting_role) {
            return roles.into_iter().map(|r| r.key.clone()).collect();
        }

        let acting_rank = self.registry.rank_of(acting_role);
        roles
            .into_iter()
            .filter(|r| r.hierarchy < acting_rank)
            .map(|r| r.key.clone())
            .collect()
    }

    /// Changes the role of an existing principal.
    ///
    /// Non-top actors may neither hand out a role ranked at or above their
    /// own nor touch a principal ranked at or above their own. The change is
    /// written to the override store so it persists over static mappings.
    pub async fn assign_role(
        &self,
        actor: &Actor,
        target: &Email,
        new_role: &str,
        reason: &str,
    ) -> IdentityResult<PrincipalRecord> {
        if !self.registry.contains(new_role) {
            return Err(IdentityError::unknown_role(new_role));
        }

        let mut record = self
            .principal(target)
            .await?
            .ok_or_else(|| IdentityError::not_found(target.as_str()))?;

        let standing = self.standing(target, None, Some(&record)).await;
        self.check_authority(actor, new_role, Some(&standing))?;

        if record.role.as_str() == new_role {
            debug!(email = %target, role = new_role, "Role unchanged, nothing to do");
            return Ok(record);
        }

        self.write_mapping(actor, target, new_role, reason).await?;

        let previous = std::mem::replace(&mut record.role, RoleKey::new(new_role));
        self.save_principal(record.clone()).await?;

        info!(
            email = %target,
            from = %previous,
            to = new_role,
            actor = %actor.email,
            "Role assigned"
        );
        let delta = self.delta(Some(&previous), &record.role);
        self.record_change(
            RoleChangeRecord::manual(
                target.clone(),
                previous,
                record.role.clone(),
                actor.email.as_str(),
                reason,
            )
            .with_hierarchy_delta(delta),
        )
        .await;

        Ok(record)
    }

    /// Creates or replaces the override mapping for `email`.
    pub async fn set_mapping(
        &self,
        actor: &Actor,
        email: &Email,
        role: &str,
        reason: &str,
    ) -> IdentityResult<IdentityMapping> {
        if !self.registry.contains(role) {
            return Err(IdentityError::unknown_role(role));
        }

        let existing = self.find_mapping(email).await?;
        if !self.registry.is_top_role(actor.role.as_str()) {
            let stored = self.principal(email).await?;
            let standing = self
                .standing(email, existing.as_ref(), stored.as_ref())
                .await;
            self.check_authority(actor, role, Some(&standing))?;
        }

        let mapping = self.write_mapping(actor, email, role, reason).await?;
        info!(email = %email, role, actor = %actor.email, "Override mapping set");
        Ok(mapping)
    }

    /// Removes the override mapping for `email`; returns `true` if one existed.
    pub async fn remove_mapping(&self, actor: &Actor, email: &Email) -> IdentityResult<bool> {
        let Some(existing) = self.find_mapping(email).await? else {
            return Ok(false);
        };
        let actor_role = actor.role.as_str();
        if !self.registry.is_top_role(actor_role) {
            let stored = self.principal(email).await?;
            let standing = self.standing(email, Some(&existing), stored.as_ref()).await;
            self.check_target(actor, &standing)?;

            // Removing the override hands the principal back to the lower tiers.
            let fallback = self
                .resolver
                .resolve_below(email, ResolutionTier::Override)
                .await;
            if self.registry.rank_of(fallback.role.as_str()) >= self.registry.rank_of(actor_role) {
                warn!(
                    actor = %actor.email,
                    actor_role = %actor.role,
                    fallback = %fallback.role,
                    "Mapping removal refused"
                );
                return Err(IdentityError::forbidden(format!(
                    "{} may not remove a mapping that restores {} to {}",
                    actor.role, email, fallback.role
                )));
            }
        }

        let removed = self
            .bounded("override delete", self.overrides.delete(email))
            .await?;
        if removed {
            info!(email = %email, actor = %actor.email, "Override mapping removed");
        }
        Ok(removed)
    }

    /// Lists all override mappings.
    pub async fn list_mappings(&self) -> IdentityResult<Vec<IdentityMapping>> {
        self.bounded("override list", self.overrides.list()).await
    }

    /// Queries the role change log.
    pub async fn role_changes(&self, filter: AuditFilter) -> AuditResult<Vec<RoleChangeRecord>> {
        self.audit.query(filter).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_authority(
        &self,
        actor: &Actor,
        new_role: &str,
        current_role: Option<&RoleKey>,
    ) -> IdentityResult<()> {
        if self.registry.is_top_role(actor.role.as_str()) {
            return Ok(());
        }

        let actor_rank = self.registry.rank_of(actor.role.as_str());
        if self.registry.rank_of(new_role) >= actor_rank {
            warn!(actor = %actor.email, actor_role = %actor.role, new_role, "Role assignment refused");
            return Err(IdentityError::forbidden(format!(
                "{} may not assign {}",
                actor.role, new_role
            )));
        }
        match current_role {
            Some(current_role) => self.check_target(actor, current_role),
            None => Ok(()),
        }
    }

    /// Refuses a non-top actor touching a principal ranked at or above it.
    fn check_target(&self, actor: &Actor, current_role: &RoleKey) -> IdentityResult<()> {
        if self.registry.is_top_role(actor.role.as_str()) {
            return Ok(());
        }
        if self.registry.rank_of(current_role.as_str()) >= self.registry.rank_of(actor.role.as_str())
        {
            warn!(
                actor = %actor.email,
                actor_role = %actor.role,
                target_role = %current_role,
                "Role assignment refused"
            );
            return Err(IdentityError::forbidden(format!(
                "{} may not modify a principal with role {}",
                actor.role, current_role
            )));
        }
        Ok(())
    }

    /// The highest-ranked role a principal currently holds across the
    /// override mapping, the resolver chain and its stored record.
    async fn standing(
        &self,
        email: &Email,
        mapping: Option<&IdentityMapping>,
        stored: Option<&PrincipalRecord>,
    ) -> RoleKey {
        let resolved = self.resolve_role(email).await.role;
        [mapping.map(|m| &m.role), stored.map(|r| &r.role)]
            .into_iter()
            .flatten()
            .fold(resolved, |highest, role| {
                if self.registry.rank_of(role.as_str()) > self.registry.rank_of(highest.as_str()) {
                    role.clone()
                } else {
                    highest
                }
            })
    }

    async fn find_mapping(&self, email: &Email) -> IdentityResult<Option<IdentityMapping>> {
        self.bounded("override lookup", self.overrides.find(email))
            .await
    }

    async fn write_mapping(
        &self,
        actor: &Actor,
        email: &Email,
        role: &str,
        reason: &str,
    ) -> IdentityResult<IdentityMapping> {
        let mapping = match self.find_mapping(email).await? {
            Some(existing) => existing.updated(role, reason, actor.email.as_str()),
            None => IdentityMapping::new(email.clone(), role, reason, actor.email.as_str()),
        };
        self.bounded("override upsert", self.overrides.upsert(mapping.clone()))
            .await?;
        Ok(mapping)
    }

    async fn save_principal(&self, record: PrincipalRecord) -> IdentityResult<()> {
        self.bounded("principal save", self.principals.save(record))
            .await
    }

    async fn record_change(&self, record: RoleChangeRecord) {
        if let Err(e) = self.audit.log(record).await {
            warn!(logger = self.audit.name(), error = %e, "Failed to record role change");
        }
    }

    fn delta(&self, from: Option<&RoleKey>, to: &RoleKey) -> i64 {
        let from_rank = from.map(|r| self.registry.rank_of(r.as_str())).unwrap_or(0);
        i64::from(self.registry.rank_of(to.as_str())) - i64::from(from_rank)
    }

    async fn bounded<T, F>(&self, operation: &str, fut: F) -> IdentityResult<T>
    where
        F: Future<Output = IdentityResult<T>>,
    {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| IdentityError::timeout(operation, self.store_timeout))?
    }
}

impl fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityService")
            .field("resolver", &self.resolver)
            .field("overrides", &self.overrides.name())
            .field("audit", &self.audit.name())
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

// =============================================================================
// IdentityServiceBuilder
// =============================================================================

/// Builder for [`IdentityService`].
///
/// The resolver chain is assembled as override store first, then the static
/// table, then the registry default.
pub struct IdentityServiceBuilder {
    registry: Arc<RoleRegistry>,
    overrides: Option<Arc<dyn OverrideStore>>,
    principals: Option<Arc<dyn PrincipalStore>>,
    audit: Option<Arc<dyn AuditLogger>>,
    static_mappings: Vec<(String, RoleKey)>,
    store_timeout: Duration,
}

impl IdentityServiceBuilder {
    /// Creates a new builder.
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self {
            registry,
            overrides: None,
            principals: None,
            audit: None,
            static_mappings: Vec::new(),
            store_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Sets the override store (default: in-memory).
    pub fn override_store(mut self, store: Arc<dyn OverrideStore>) -> Self {
        self.overrides = Some(store);
        self
    }

    /// Sets the principal store (default: in-memory).
    pub fn principal_store(mut self, store: Arc<dyn PrincipalStore>) -> Self {
        self.principals = Some(store);
        self
    }

    /// Sets the audit logger (default: in-memory).
    pub fn audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit = Some(logger);
        self
    }

    /// Adds a static mapping.
    pub fn static_mapping(mut self, email: impl AsRef<str>, role: impl Into<RoleKey>) -> Self {
        self.static_mappings
            .push((email.as_ref().to_string(), role.into()));
        self
    }

    /// Adds several static mappings.
    pub fn static_mappings<I, E, R>(mut self, mappings: I) -> Self
    where
        I: IntoIterator<Item = (E, R)>,
        E: AsRef<str>,
        R: Into<RoleKey>,
    {
        self.static_mappings.extend(
            mappings
                .into_iter()
                .map(|(e, r)| (e.as_ref().to_string(), r.into())),
        );
        self
    }

    /// Sets the time budget for every store call.
    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Builds the service.
    pub fn build(self) -> IdentityService {
        let overrides = self
            .overrides
            .unwrap_or_else(|| Arc::new(InMemoryOverrideStore::new()));
        let principals = self
            .principals
            .unwrap_or_else(|| Arc::new(InMemoryPrincipalStore::new()));
        let audit = self
            .audit
            .unwrap_or_else(|| Arc::new(InMemoryAuditLogger::new()));

        let resolver = RoleResolver::new(self.registry.clone())
            .with_source(
                OverrideRoleSource::new(overrides.clone()).with_timeout(self.store_timeout),
            )
            .with_source(StaticRoleSource::new(self.static_mappings));

        IdentityService {
            registry: self.registry,
            resolver,
            overrides,
            principals,
            audit,
            store_timeout: self.store_timeout,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
