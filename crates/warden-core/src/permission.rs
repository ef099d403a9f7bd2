// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission evaluation.
//!
//! A role is allowed to perform `action` on `resource` when at least one of
//! its grants matches both. The top role is the single exception: it is
//! identified by key and allowed everything without looking at grants.

use std::sync::Arc;

use tracing::trace;

use crate::role::{PermissionGrant, RoleRegistry};

/// Conventional action names.
pub mod actions {
    /// Read a resource.
    pub const READ: &str = "read";
    /// Create a resource.
    pub const CREATE: &str = "create";
    /// Update a resource.
    pub const UPDATE: &str = "update";
    /// Delete a resource.
    pub const DELETE: &str = "delete";
    /// Export a resource.
    pub const EXPORT: &str = "export";
    /// Write (upload) content.
    pub const WRITE: &str = "write";

    /// Returns all conventional actions.
    pub fn all() -> &'static [&'static str] {
        &[READ, CREATE, UPDATE, DELETE, EXPORT, WRITE]
    }
}

/// Returns `true` if any grant allows `action` on `resource`.
pub fn grants_allow(grants: &[PermissionGrant], resource: &str, action: &str) -> bool {
    grants.iter().any(|g| g.allows(resource, action))
}

// =============================================================================
// PermissionEvaluator
// =============================================================================

/// Evaluates `(role, resource, action)` triples against the role registry.
///
/// Cheap to clone; evaluation is pure and never fails.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    registry: Arc<RoleRegistry>,
}

impl PermissionEvaluator {
    /// Creates an evaluator over the given registry.
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Arc<RoleRegistry> {
        &self.registry
    }

    /// Returns `true` if `role` may perform `action` on `resource`.
    pub fn has_permission(&self, role: &str, resource: &str, action: &str) -> bool {
        if self.registry.is_top_role(role) {
            return true;
        }

        let allowed = match self.registry.get_role(role) {
            Some(config) => grants_allow(&config.permissions, resource, action),
            None => false,
        };

        trace!(role, resource, action, allowed, "Permission evaluated");
        allowed
    }

    /// Evaluates against a cached grant snapshot instead of the registry's
    /// current table. The top-role bypass still applies.
    pub fn check_snapshot(
        &self,
        role: &str,
        grants: &[PermissionGrant],
        resource: &str,
        action: &str,
    ) -> bool {
        self.registry.is_top_role(role) || grants_allow(grants, resource, action)
    }

    /// `read` on `resource`.
    #[inline]
    pub fn can_read(&self, role: &str, resource: &str) -> bool {
        self.has_permission(role, resource, actions::READ)
    }

    /// `create` on `resource`.
    #[inline]
    pub fn can_create(&self, role: &str, resource: &str) -> bool {
        self.has_permission(role, resource, actions::CREATE)
    }

    /// `update` on `resource`.
    #[inline]
    pub fn can_update(&self, role: &str, resource: &str) -> bool {
        self.has_permission(role, resource, actions::UPDATE)
    }

    /// `delete` on `resource`.
    #[inline]
    pub fn can_delete(&self, role: &str, resource: &str) -> bool {
        self.has_permission(role, resource, actions::DELETE)
    }

    /// `export` on `resource`.
    #[inline]
    pub fn can_export(&self, role: &str, resource: &str) -> bool {
        self.has_permission(role, resource, actions::EXPORT)
    }
}

impl Default for PermissionEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(RoleRegistry::new()))
    }
}

// =============================================================================
// Tests
// =============================================================================
