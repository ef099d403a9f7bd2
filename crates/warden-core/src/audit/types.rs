// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role change records and query filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Email, RoleKey};

/// Actor recorded for changes made by the resolver rather than a person.
pub const SYSTEM_ACTOR: &str = "system";

// =============================================================================
// RoleChangeRecord
// =============================================================================

/// Append-only entry describing one change of a principal's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChangeRecord {
    /// Unique record id (time ordered).
    pub id: Uuid,
    /// When the change happened.
    pub timestamp: DateTime<Utc>,
    /// Principal whose role changed.
    pub email: Email,
    /// Who made the change; [`SYSTEM_ACTOR`] for automatic changes.
    pub changed_by: String,
    /// Previous role, `None` on first assignment.
    pub from_role: Option<RoleKey>,
    /// New role.
    pub to_role: RoleKey,
    /// Free-form reason.
    pub reason: String,
    /// `true` when produced by email-mapping resolution.
    pub is_automatic: bool,
    /// `rank(to_role) - rank(from_role)`; unknown or absent roles rank zero.
    pub hierarchy_delta: i64,
}

impl RoleChangeRecord {
    /// Creates a record.
    pub fn new(
        email: Email,
        from_role: Option<RoleKey>,
        to_role: RoleKey,
        changed_by: impl Into<String>,
        reason: impl Into<String>,
        is_automatic: bool,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            email,
            changed_by: changed_by.into(),
            from_role,
            to_role,
            reason: reason.into(),
            is_automatic,
            hierarchy_delta: 0,
        }
    }

    /// First role given to a newly seen principal.
    pub fn initial_assignment(email: Email, to_role: RoleKey) -> Self {
        Self::new(
            email,
            None,
            to_role,
            SYSTEM_ACTOR,
            "Initial role assignment",
            true,
        )
    }

    /// Drift detected between the stored role and the resolved one.
    pub fn automatic(email: Email, from_role: RoleKey, to_role: RoleKey) -> Self {
        Self::new(
            email,
            Some(from_role),
            to_role,
            SYSTEM_ACTOR,
            "Role updated from email mapping",
            true,
        )
    }

    /// Change made by an administrator.
    pub fn manual(
        email: Email,
        from_role: RoleKey,
        to_role: RoleKey,
        changed_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(email, Some(from_role), to_role, changed_by, reason, false)
    }

    /// Sets the hierarchy delta.
    pub fn with_hierarchy_delta(mut self, delta: i64) -> Self {
        self.hierarchy_delta = delta;
        self
    }

    /// Returns `true` if the change raised the principal's rank.
    pub fn is_promotion(&self) -> bool {
        self.hierarchy_delta > 0
    }
}

// =============================================================================
// AuditFilter
// =============================================================================

/// Filter for querying role change records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    /// Filter by target principal.
    pub email: Option<String>,
    /// Filter by actor.
    pub changed_by: Option<String>,
    /// Filter by automatic flag.
    pub is_automatic: Option<bool>,
    /// Start time (inclusive).
    pub from: Option<DateTime<Utc>>,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Newest first.
    #[serde(default)]
    pub descending: bool,
}

impl AuditFilter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by target principal (normalised before comparison).
    pub fn email(mut self, email: impl AsRef<str>) -> Self {
        self.email = Some(Email::normalize(email.as_ref()));
        self
    }

    /// Filters by actor.
    pub fn changed_by(mut self, actor: impl Into<String>) -> Self {
        self.changed_by = Some(actor.into());
        self
    }

    /// Filters by automatic flag.
    pub fn automatic(mut self, is_automatic: bool) -> Self {
        self.is_automatic = Some(is_automatic);
        self
    }

    /// Only records at or after `from`.
    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets descending order.
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    /// Checks if a record matches this filter.
    pub fn matches(&self, record: &RoleChangeRecord) -> bool {
        if let Some(ref email) = self.email {
            if record.email.as_str() != email {
                return false;
            }
        }

        if let Some(ref actor) = self.changed_by {
            if &record.changed_by != actor {
                return false;
            }
        }

        if let Some(is_automatic) = self.is_automatic {
            if record.is_automatic != is_automatic {
                return false;
            }
        }

        if let Some(from) = self.from {
            if record.timestamp < from {
                return false;
            }
        }

        true
    }

    /// Sorts and truncates matched records.
    pub(crate) fn finish(&self, mut records: Vec<RoleChangeRecord>) -> Vec<RoleChangeRecord> {
        if self.descending {
            records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        } else {
            records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        }

        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
        records
    }
}

// =============================================================================
// Tests
// =============================================================================
