// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::Json;

use crate::extractors::Auth;
use crate::response::MeResponse;

/// GET /api/auth/me
///
/// Returns the caller's principal, role and permission snapshot.
pub async fn current_principal(Auth(ctx): Auth) -> Json<MeResponse> {
    Json(MeResponse::from(&ctx))
}
