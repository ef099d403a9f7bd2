// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-core
//!
//! Core access-control model for the warden project-management backend.
//!
//! This crate provides the pieces every other warden crate builds on:
//!
//! - **Role**: The static role registry (display names, hierarchy ranks, grants)
//! - **Permission**: Resource/action evaluation with wildcard grants and the
//!   top-role bypass
//! - **Identity**: Email-to-role resolution over a prioritised chain of
//!   sources, principal records and role administration
//! - **Audit**: Append-only role change records
//! - **Error**: Unified error hierarchy
//!
//! ## Example
//!
//! ```rust
//! use warden_core::{PermissionEvaluator, RoleRegistry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(RoleRegistry::new());
//! let evaluator = PermissionEvaluator::new(registry);
//!
//! assert!(evaluator.has_permission("SUPER_ADMIN", "anything", "delete"));
//! assert!(evaluator.can_read("DEVELOPER", "projects"));
//! assert!(!evaluator.can_delete("DEVELOPER", "projects"));
//! assert!(!evaluator.can_read("NO_SUCH_ROLE", "projects"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod types;

pub mod permission;
pub mod role;

pub mod audit;
pub mod identity;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{IdentityError, IdentityResult, RoleError, RoleResult, WardenError};
pub use types::{Email, RoleKey};

pub use permission::{actions, grants_allow, PermissionEvaluator};
pub use role::{
    HierarchyOrdering, PermissionGrant, RoleConfig, RoleRegistry, RoleRegistryBuilder,
    DEFAULT_ROLE, DEFAULT_TOP_ROLE, WILDCARD,
};

pub use audit::{
    AuditError, AuditFilter, AuditLogger, AuditResult, InMemoryAuditLogger, JsonLinesAuditLogger,
    NoOpAuditLogger, RoleChangeRecord, SYSTEM_ACTOR,
};
pub use identity::{
    Actor, IdentityMapping, IdentityService, IdentityServiceBuilder, InMemoryOverrideStore,
    InMemoryPrincipalStore, OverrideRoleSource, OverrideStore, PrincipalRecord, PrincipalStore,
    ProfileData, Resolution, ResolutionTier, RoleResolver, RoleSource, StaticRoleSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
