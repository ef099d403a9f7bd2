// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: Liveness
//! - [`current_principal`]: The caller's own principal
//! - [`list_roles`], [`assignable_roles`], [`assign_role`], [`role_changes`]: Roles
//! - [`list_mappings`], [`put_mapping`], [`delete_mapping`]: Override mappings

mod auth;
mod health;
mod mappings;
mod roles;

pub use auth::*;
pub use health::*;
pub use mappings::*;
pub use roles::*;
