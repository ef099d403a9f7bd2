// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;
use warden_core::{grants_allow, Actor, Email, PermissionGrant, PrincipalRecord, RoleKey, RoleRegistry};

/// Resolved principal attached to an authenticated request.
///
/// Built fresh on every request from the principal record the identity
/// service returned, so it always reflects the persisted role.
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    /// Principal email.
    pub email: Email,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Resolved role.
    pub role: RoleKey,
    /// Display name of the role.
    pub role_display_name: String,
    /// Whether the role is the registry's top role.
    pub is_top_role: bool,
    /// Grants of the role at resolution time.
    pub permissions: Arc<Vec<PermissionGrant>>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates a context for `record` using `registry` for role details.
    pub fn from_record(record: &PrincipalRecord, registry: &RoleRegistry) -> Self {
        let role = record.role.as_str();
        Self {
            email: record.email.clone(),
            name: record.name.clone(),
            image: record.image.clone(),
            role: record.role.clone(),
            role_display_name: registry.display_name(role).to_string(),
            is_top_role: registry.is_top_role(role),
            permissions: Arc::new(registry.permissions_of(role).to_vec()),
            request_id: Uuid::now_v7(),
        }
    }

    /// Checks the cached grants. The top role always passes.
    pub fn can(&self, resource: &str, action: &str) -> bool {
        self.is_top_role || grants_allow(&self.permissions, resource, action)
    }

    /// Returns the principal as an administrative actor.
    pub fn actor(&self) -> Actor {
        Actor::new(self.email.clone(), self.role.clone())
    }
}
