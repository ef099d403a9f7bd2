// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-api
//!
//! HTTP access guard and role administration API.
//!
//! Every protected request goes through the same steps: decode the bearer
//! claims, resolve the principal through the identity service, then check
//! the route's declared `(resource, action)`. A missing or unusable
//! credential is answered with 401, a failed permission check with 403.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{AuthContext, ClaimsDecoder, EmailClaim, TokenClaims, TokenConfig};
pub use config::{ApiConfig, CorsConfig};
pub use error::{ApiError, ApiResult};
pub use middleware::{AuthLayer, RequirePermissionLayer};
pub use server::ApiServer;
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
