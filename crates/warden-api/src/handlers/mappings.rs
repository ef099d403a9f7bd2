// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Override mapping handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use warden_core::IdentityMapping;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, EmailPath, ValidatedJson};
use crate::state::AppState;

/// Body of a mapping upsert.
#[derive(Debug, Deserialize)]
pub struct MappingRequest {
    /// Role key.
    pub role: String,
    /// Why the mapping exists.
    #[serde(default)]
    pub reason: Option<String>,
}

/// GET /api/mappings
pub async fn list_mappings(State(state): State<AppState>) -> ApiResult<Json<Vec<IdentityMapping>>> {
    let mut mappings = state.identity().list_mappings().await?;
    mappings.sort_by(|a, b| a.email.cmp(&b.email));
    Ok(Json(mappings))
}

/// PUT /api/mappings/{email}
pub async fn put_mapping(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    EmailPath(email): EmailPath,
    ValidatedJson(request): ValidatedJson<MappingRequest>,
) -> ApiResult<Json<IdentityMapping>> {
    let role = request.role.trim();
    if role.is_empty() {
        return Err(ApiError::bad_request("role must not be empty"));
    }
    let reason = request.reason.as_deref().unwrap_or("Mapping set via API");

    let mapping = state
        .identity()
        .set_mapping(&ctx.actor(), &email, role, reason)
        .await?;
    Ok(Json(mapping))
}

/// DELETE /api/mappings/{email}
///
/// 204 when a mapping was removed, 404 when none existed.
pub async fn delete_mapping(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    EmailPath(email): EmailPath,
) -> ApiResult<StatusCode> {
    if state.identity().remove_mapping(&ctx.actor(), &email).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Mapping for {}", email)))
    }
}
