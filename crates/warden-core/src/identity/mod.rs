// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity resolution.
//!
//! - [`RoleResolver`]: ordered chain of [`RoleSource`]s with a default fallback
//! - [`OverrideStore`]: audited, mutable mapping store (highest priority)
//! - [`StaticRoleSource`]: mappings compiled into configuration
//! - [`IdentityService`]: principal records and role administration

mod principal;
mod service;
mod source;
mod store;

pub use principal::{InMemoryPrincipalStore, PrincipalRecord, PrincipalStore, ProfileData};
pub use service::{Actor, IdentityService, IdentityServiceBuilder};
pub use source::{
    OverrideRoleSource, Resolution, ResolutionTier, RoleResolver, RoleSource, StaticRoleSource,
    DEFAULT_LOOKUP_TIMEOUT,
};
pub use store::{IdentityMapping, InMemoryOverrideStore, OverrideStore};
