// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Durable principal records.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IdentityResult;
use crate::types::{Email, RoleKey};

/// Profile fields supplied by the identity provider at login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileData {
    /// Display name.
    pub name: Option<String>,
    /// Avatar URL.
    pub image: Option<String>,
}

impl ProfileData {
    /// Profile with a display name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            image: None,
        }
    }
}

/// The stored view of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRecord {
    /// Stable id.
    pub id: Uuid,
    /// Normalised email.
    pub email: Email,
    /// Display name.
    pub name: Option<String>,
    /// Avatar URL.
    pub image: Option<String>,
    /// Current role.
    pub role: RoleKey,
    /// First sight.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every login.
    pub last_active_at: DateTime<Utc>,
}

impl PrincipalRecord {
    /// Creates a record for a first-seen principal.
    pub fn new(email: Email, role: RoleKey, profile: &ProfileData) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email,
            name: profile.name.clone(),
            image: profile.image.clone(),
            role,
            created_at: now,
            last_active_at: now,
        }
    }

    /// Returns the display name, falling back to the email's local part.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self
                .email
                .as_str()
                .split_once('@')
                .map(|(local, _)| local)
                .unwrap_or(self.email.as_str()),
        }
    }
}

/// Durable storage for principal records.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Returns the record for `email`.
    async fn get(&self, email: &Email) -> IdentityResult<Option<PrincipalRecord>>;

    /// Inserts or replaces a record.
    async fn save(&self, record: PrincipalRecord) -> IdentityResult<()>;

    /// Inserts `record` only if no record exists for its email.
    ///
    /// Returns the record that was already stored, or `None` if `record`
    /// was inserted.
    async fn insert_if_absent(
        &self,
        record: PrincipalRecord,
    ) -> IdentityResult<Option<PrincipalRecord>>;

    /// Lists all records ordered by email.
    async fn list(&self) -> IdentityResult<Vec<PrincipalRecord>>;
}

/// In-memory principal store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPrincipalStore {
    records: Arc<DashMap<Email, PrincipalRecord>>,
}

impl InMemoryPrincipalStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn get(&self, email: &Email) -> IdentityResult<Option<PrincipalRecord>> {
        Ok(self.records.get(email).map(|r| r.value().clone()))
    }

    async fn save(&self, record: PrincipalRecord) -> IdentityResult<()> {
        self.records.insert(record.email.clone(), record);
        Ok(())
    }

    async fn insert_if_absent(
        &self,
        record: PrincipalRecord,
    ) -> IdentityResult<Option<PrincipalRecord>> {
        match self.records.entry(record.email.clone()) {
            Entry::Occupied(existing) => Ok(Some(existing.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(None)
            }
        }
    }

    async fn list(&self) -> IdentityResult<Vec<PrincipalRecord>> {
        let mut all: Vec<PrincipalRecord> =
            self.records.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(all)
    }
}
