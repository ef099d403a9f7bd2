// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use serde::{Deserialize, Serialize};
use warden_core::{PermissionGrant, RoleConfig, RoleRegistry};

use crate::auth::AuthContext;

// =============================================================================
// Health
// =============================================================================

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when served.
    pub status: String,
    /// Crate version.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

// =============================================================================
// Principal
// =============================================================================

/// The caller's own principal, role and permission snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    /// Principal email.
    pub email: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Role key.
    pub role: String,
    /// Role display name.
    pub role_display_name: String,
    /// Whether the role bypasses permission checks.
    pub is_top_role: bool,
    /// Grants of the role.
    pub permissions: Vec<PermissionGrant>,
}

impl From<&AuthContext> for MeResponse {
    fn from(ctx: &AuthContext) -> Self {
        Self {
            email: ctx.email.to_string(),
            name: ctx.name.clone(),
            image: ctx.image.clone(),
            role: ctx.role.to_string(),
            role_display_name: ctx.role_display_name.clone(),
            is_top_role: ctx.is_top_role,
            permissions: ctx.permissions.as_ref().clone(),
        }
    }
}

// =============================================================================
// Roles
// =============================================================================

/// One row of the role table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSummary {
    /// Role key.
    pub key: String,
    /// Display name.
    pub display_name: String,
    /// Hierarchy rank.
    pub hierarchy: u32,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Grants.
    pub permissions: Vec<PermissionGrant>,
    /// Whether this is the top role.
    pub is_top_role: bool,
    /// Whether this is the default role.
    pub is_default: bool,
}

impl RoleSummary {
    /// Builds a summary for `role`.
    pub fn new(role: &RoleConfig, registry: &RoleRegistry) -> Self {
        Self {
            key: role.key.to_string(),
            display_name: role.display_name.clone(),
            hierarchy: role.hierarchy,
            description: role.description.clone(),
            permissions: role.permissions.clone(),
            is_top_role: registry.is_top_role(role.key.as_str()),
            is_default: registry.default_role() == &role.key,
        }
    }
}
