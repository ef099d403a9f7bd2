// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role table and role administration handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use warden_core::{AuditFilter, PrincipalRecord, RoleChangeRecord};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, EmailPath, ValidatedJson};
use crate::response::RoleSummary;
use crate::state::AppState;

/// Hard cap on change log page size.
const MAX_CHANGES: usize = 500;

// =============================================================================
// Role Table
// =============================================================================

/// GET /api/roles
///
/// Returns every role, most privileged first.
pub async fn list_roles(State(state): State<AppState>) -> Json<Vec<RoleSummary>> {
    let registry = state.registry();
    Json(
        registry
            .roles_by_rank()
            .into_iter()
            .map(|role| RoleSummary::new(role, registry))
            .collect(),
    )
}

/// GET /api/roles/assignable
///
/// Returns the roles the caller may hand out.
pub async fn assignable_roles(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Json<Vec<RoleSummary>> {
    let registry = state.registry();
    let roles = state
        .identity()
        .list_assignable_roles(ctx.role.as_str())
        .into_iter()
        .filter_map(|key| registry.get_role(key.as_str()))
        .map(|role| RoleSummary::new(role, registry))
        .collect();
    Json(roles)
}

// =============================================================================
// Assignment
// =============================================================================

/// Body of a role assignment.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    /// New role key.
    pub role: String,
    /// Why the change is made.
    #[serde(default)]
    pub reason: Option<String>,
}

/// PUT /api/users/{email}/role
///
/// Changes the role of an existing principal.
pub async fn assign_role(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    EmailPath(target): EmailPath,
    ValidatedJson(request): ValidatedJson<AssignRoleRequest>,
) -> ApiResult<Json<PrincipalRecord>> {
    let role = request.role.trim();
    if role.is_empty() {
        return Err(ApiError::bad_request("role must not be empty"));
    }
    let reason = request.reason.as_deref().unwrap_or("Role changed via API");

    let record = state
        .identity()
        .assign_role(&ctx.actor(), &target, role, reason)
        .await?;
    Ok(Json(record))
}

// =============================================================================
// Change Log
// =============================================================================

/// Query parameters of the change log.
#[derive(Debug, Default, Deserialize)]
pub struct ChangeLogQuery {
    /// Target principal.
    pub email: Option<String>,
    /// Actor.
    pub changed_by: Option<String>,
    /// Automatic flag.
    pub automatic: Option<bool>,
    /// Maximum number of records.
    pub limit: Option<usize>,
}

impl ChangeLogQuery {
    fn into_filter(self) -> AuditFilter {
        let mut filter = AuditFilter::new()
            .descending()
            .limit(self.limit.unwrap_or(100).min(MAX_CHANGES));
        if let Some(email) = self.email {
            filter = filter.email(email);
        }
        if let Some(actor) = self.changed_by {
            filter = filter.changed_by(actor);
        }
        if let Some(automatic) = self.automatic {
            filter = filter.automatic(automatic);
        }
        filter
    }
}

/// GET /api/roles/changes
///
/// Returns role change records, newest first.
pub async fn role_changes(
    State(state): State<AppState>,
    Query(query): Query<ChangeLogQuery>,
) -> ApiResult<Json<Vec<RoleChangeRecord>>> {
    let records = state.identity().role_changes(query.into_filter()).await?;
    Ok(Json(records))
}
