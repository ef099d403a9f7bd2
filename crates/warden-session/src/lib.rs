// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-session
//!
//! Client-held session lifecycle and navigation guarding.
//!
//! - [`SessionContext`]: the session state machine (login, activity,
//!   validation with proactive and reactive refresh, logout, persistence)
//! - [`SessionStore`]: keyed snapshot storage ([`MemorySessionStore`],
//!   [`FileSessionStore`])
//! - [`TokenRefresher`]: identity-provider refresh collaborator
//! - [`RouteGuard`]: per-navigation enforcement with superseding
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use warden_core::{Email, RoleRegistry};
//! use warden_session::{LoginGrant, SessionContext, SessionPrincipal, SessionStatus};
//!
//! let ctx = SessionContext::new(Arc::new(RoleRegistry::new()));
//! ctx.begin_login();
//! ctx.complete_login(LoginGrant::local(
//!     SessionPrincipal {
//!         id: "demo".into(),
//!         email: Email::parse("demo@example.com").unwrap(),
//!         name: None,
//!         image: None,
//!     },
//!     "DEVELOPER",
//! ));
//!
//! assert_eq!(ctx.status(), SessionStatus::Valid);
//! assert!(ctx.can("tasks", "create"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod refresh;
pub mod session;
pub mod store;

pub use config::{SessionConfig, DEFAULT_STORAGE_KEY};
pub use context::{SessionContext, SessionContextBuilder};
pub use error::{SessionError, SessionResult};
pub use guard::{
    AccessDenied, HierarchyRule, NavigationTicket, Requirement, RouteDecision, RouteGuard,
    RouteRule, DEFAULT_LOGIN_PATH,
};
pub use refresh::{RefreshedTokens, TokenRefresher};
pub use session::{LoginGrant, Session, SessionPrincipal, SessionStatus, TokenSet};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
