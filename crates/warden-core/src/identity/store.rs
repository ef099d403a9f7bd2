// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audited override store for email-to-role mappings.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, IdentityResult};
use crate::types::{Email, RoleKey};

// =============================================================================
// IdentityMapping
// =============================================================================

/// A persisted email-to-role mapping with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMapping {
    /// Normalised email.
    pub email: Email,
    /// Mapped role.
    pub role: RoleKey,
    /// Why the mapping exists.
    pub reason: String,
    /// Who created it.
    pub created_by: String,
    /// Who changed it last.
    pub last_modified_by: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change time.
    pub updated_at: DateTime<Utc>,
}

impl IdentityMapping {
    /// Creates a mapping stamped with the current time.
    pub fn new(
        email: Email,
        role: impl Into<RoleKey>,
        reason: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let actor = actor.into();
        Self {
            email,
            role: role.into(),
            reason: reason.into(),
            created_by: actor.clone(),
            last_modified_by: actor,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy updated to a new role, keeping creation provenance.
    pub fn updated(
        &self,
        role: impl Into<RoleKey>,
        reason: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            email: self.email.clone(),
            role: role.into(),
            reason: reason.into(),
            created_by: self.created_by.clone(),
            last_modified_by: actor.into(),
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }
}

// =============================================================================
// OverrideStore
// =============================================================================

/// Mutable, audited mapping store that takes precedence over static
/// configuration.
///
/// Implementations report outages as [`IdentityError::StoreUnavailable`].
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// Finds the mapping for a normalised email.
    async fn find(&self, email: &Email) -> IdentityResult<Option<IdentityMapping>>;

    /// Inserts or replaces a mapping.
    async fn upsert(&self, mapping: IdentityMapping) -> IdentityResult<()>;

    /// Deletes a mapping; returns `true` if one existed.
    async fn delete(&self, email: &Email) -> IdentityResult<bool>;

    /// Lists all mappings ordered by email.
    async fn list(&self) -> IdentityResult<Vec<IdentityMapping>>;

    /// Returns the store name for identification.
    fn name(&self) -> &str {
        "override_store"
    }
}

// =============================================================================
// InMemoryOverrideStore
// =============================================================================

/// In-memory override store.
///
/// [`set_available`](Self::set_available) switches the store into an outage
/// mode where every call fails with `StoreUnavailable`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOverrideStore {
    mappings: Arc<DashMap<Email, IdentityMapping>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryOverrideStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with mappings.
    pub fn with_mappings(mappings: impl IntoIterator<Item = IdentityMapping>) -> Self {
        let store = Self::new();
        for mapping in mappings {
            store.mappings.insert(mapping.email.clone(), mapping);
        }
        store
    }

    /// Toggles availability.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Returns the number of mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns `true` if the store holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    fn check_available(&self) -> IdentityResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::store_unavailable("override store is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl OverrideStore for InMemoryOverrideStore {
    async fn find(&self, email: &Email) -> IdentityResult<Option<IdentityMapping>> {
        self.check_available()?;
        Ok(self.mappings.get(email).map(|m| m.value().clone()))
    }

    async fn upsert(&self, mapping: IdentityMapping) -> IdentityResult<()> {
        self.check_available()?;
        self.mappings.insert(mapping.email.clone(), mapping);
        Ok(())
    }

    async fn delete(&self, email: &Email) -> IdentityResult<bool> {
        self.check_available()?;
        Ok(self.mappings.remove(email).is_some())
    }

    async fn list(&self) -> IdentityResult<Vec<IdentityMapping>> {
        self.check_available()?;
        let mut all: Vec<IdentityMapping> =
            self.mappings.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(all)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// Tests
// =============================================================================
