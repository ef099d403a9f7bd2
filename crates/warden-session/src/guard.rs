// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Navigation guard.
//!
//! For each navigation the guard:
//!
//! 1. allows exempt paths outright;
//! 2. redirects to login when the session does not validate;
//! 3. denies when the route table entry is not covered by the cached
//!    permission snapshot;
//! 4. denies when a hierarchy rule demands a higher rank.
//!
//! Every navigation takes a ticket from a monotonic sequence. A check whose
//! ticket is no longer the latest by the time its async work completes
//! reports [`RouteDecision::Superseded`] instead of a redirect or denial.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use warden_core::{RoleKey, RoleRegistry};

use crate::context::SessionContext;

/// Default login route.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

// =============================================================================
// Rules
// =============================================================================

/// Maps a route (and everything below it) to a required permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Route path, e.g. `/projects`.
    pub path: String,
    /// Required resource.
    pub resource: String,
    /// Required action.
    pub action: String,
}

impl RouteRule {
    /// Creates a rule.
    pub fn new(
        path: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            resource: resource.into(),
            action: action.into(),
        }
    }
}

/// Requires a minimum role rank for a route and everything below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyRule {
    /// Route path.
    pub path: String,
    /// Lowest role allowed.
    pub min_role: RoleKey,
}

impl HierarchyRule {
    /// Creates a rule.
    pub fn new(path: impl Into<String>, min_role: impl Into<RoleKey>) -> Self {
        Self {
            path: path.into(),
            min_role: min_role.into(),
        }
    }
}

/// Drops the query string and fragment from a navigation target.
fn pathname(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// Returns `true` if `path` is `rule` or lies below it.
fn covers(rule: &str, path: &str) -> bool {
    let rule = rule.trim_end_matches('/');
    if rule.is_empty() {
        return true;
    }
    path == rule || path.strip_prefix(rule).is_some_and(|rest| rest.starts_with('/'))
}

// =============================================================================
// Decisions
// =============================================================================

/// What a denial was missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// A resource/action permission.
    Permission {
        /// Required resource.
        resource: String,
        /// Required action.
        action: String,
    },
    /// A minimum role rank.
    MinimumRole {
        /// Lowest role allowed.
        role: RoleKey,
    },
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Permission { resource, action } => write!(f, "{}:{}", resource, action),
            Requirement::MinimumRole { role } => write!(f, "role {} or higher", role),
        }
    }
}

/// Access-denied signal for a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDenied {
    /// The denied route.
    pub path: String,
    /// The principal's role.
    pub role: RoleKey,
    /// What was missing.
    pub requirement: Requirement,
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.requirement {
            Requirement::Permission { resource, action } => write!(
                f,
                "Role {} may not {} {} (route {})",
                self.role, action, resource, self.path
            ),
            Requirement::MinimumRole { role } => write!(
                f,
                "Route {} requires {} or higher, current role is {}",
                self.path, role, self.role
            ),
        }
    }
}

/// Outcome of a navigation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Proceed.
    Allow,
    /// The session is not valid; go to the login route.
    RedirectToLogin {
        /// Login route.
        login_path: String,
        /// Route to return to after login.
        return_to: String,
    },
    /// Authenticated but not permitted. Rendered as an error, never a
    /// silent redirect.
    Denied(AccessDenied),
    /// A newer navigation started; this result must not be applied.
    Superseded,
}

impl RouteDecision {
    /// Returns `true` for [`RouteDecision::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, RouteDecision::Allow)
    }
}

/// Identifies one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NavigationTicket(u64);

// =============================================================================
// RouteGuard
// =============================================================================

/// Navigation guard over a static route table.
pub struct RouteGuard {
    registry: Arc<RoleRegistry>,
    exempt: HashSet<String>,
    routes: Vec<RouteRule>,
    hierarchy: Vec<HierarchyRule>,
    login_path: String,
    navigation: AtomicU64,
}

impl RouteGuard {
    /// Creates a guard with no rules and the default login path.
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self {
            registry,
            exempt: HashSet::new(),
            routes: Vec::new(),
            hierarchy: Vec::new(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            navigation: AtomicU64::new(0),
        }
    }

    /// Adds exempt paths; a trailing `*` makes a prefix match.
    pub fn with_exempt_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exempt.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Adds the conventional exempt paths (login, OAuth callback, debug).
    pub fn with_default_exempt_paths(self) -> Self {
        let login = self.login_path.clone();
        self.with_exempt_paths([login.as_str(), "/auth/*", "/api/auth/*", "/debug/*"])
    }

    /// Adds a route rule.
    pub fn with_route(mut self, rule: RouteRule) -> Self {
        self.routes.push(rule);
        self
    }

    /// Adds route rules.
    pub fn with_routes(mut self, rules: impl IntoIterator<Item = RouteRule>) -> Self {
        self.routes.extend(rules);
        self
    }

    /// Adds a hierarchy rule.
    pub fn with_hierarchy_rule(mut self, rule: HierarchyRule) -> Self {
        self.hierarchy.push(rule);
        self
    }

    /// Sets the login route.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Returns the login route.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Returns `true` if `path` skips enforcement.
    pub fn is_exempt(&self, path: &str) -> bool {
        let path = pathname(path);
        if self.exempt.contains(path) {
            return true;
        }
        self.exempt.iter().any(|p| {
            p.strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }

    /// Returns the most specific route rule covering `path`. Any query
    /// string or fragment is ignored.
    pub fn route_for(&self, path: &str) -> Option<&RouteRule> {
        let path = pathname(path);
        self.routes
            .iter()
            .filter(|r| covers(&r.path, path))
            .max_by_key(|r| r.path.trim_end_matches('/').len())
    }

    /// Returns the most specific hierarchy rule covering `path`.
    pub fn hierarchy_rule_for(&self, path: &str) -> Option<&HierarchyRule> {
        let path = pathname(path);
        self.hierarchy
            .iter()
            .filter(|r| covers(&r.path, path))
            .max_by_key(|r| r.path.trim_end_matches('/').len())
    }

    /// Starts a navigation, superseding all earlier ones.
    pub fn begin_navigation(&self) -> NavigationTicket {
        NavigationTicket(self.navigation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Returns `true` if no navigation started after `ticket`.
    pub fn is_current(&self, ticket: NavigationTicket) -> bool {
        self.navigation.load(Ordering::Acquire) == ticket.0
    }

    /// Checks a navigation to `path` as the latest navigation.
    pub async fn check(&self, session: &SessionContext, path: &str) -> RouteDecision {
        let ticket = self.begin_navigation();
        self.check_with_ticket(ticket, session, path).await
    }

    /// Checks a navigation previously started with
    /// [`begin_navigation`](Self::begin_navigation).
    pub async fn check_with_ticket(
        &self,
        ticket: NavigationTicket,
        session: &SessionContext,
        path: &str,
    ) -> RouteDecision {
        if self.is_exempt(path) {
            return RouteDecision::Allow;
        }

        let valid = session.validate().await;
        if !self.is_current(ticket) {
            debug!(path, "Navigation superseded");
            return RouteDecision::Superseded;
        }

        let snapshot = match session.current() {
            Some(snapshot) if valid => snapshot,
            _ => {
                debug!(path, "Session not valid, redirecting to login");
                return RouteDecision::RedirectToLogin {
                    login_path: self.login_path.clone(),
                    return_to: path.to_string(),
                };
            }
        };
        session.update_activity();

        if let Some(rule) = self.route_for(path) {
            if !session.can(&rule.resource, &rule.action) {
                let denied = AccessDenied {
                    path: path.to_string(),
                    role: snapshot.role.clone(),
                    requirement: Requirement::Permission {
                        resource: rule.resource.clone(),
                        action: rule.action.clone(),
                    },
                };
                warn!(path, role = %snapshot.role, requirement = %denied.requirement, "Navigation denied");
                return RouteDecision::Denied(denied);
            }
        }

        if let Some(rule) = self.hierarchy_rule_for(path) {
            let role = snapshot.role.as_str();
            if !self.registry.is_top_role(role)
                && self.registry.rank_of(role) < self.registry.rank_of(rule.min_role.as_str())
            {
                let denied = AccessDenied {
                    path: path.to_string(),
                    role: snapshot.role.clone(),
                    requirement: Requirement::MinimumRole {
                        role: rule.min_role.clone(),
                    },
                };
                warn!(path, role, requirement = %denied.requirement, "Navigation denied");
                return RouteDecision::Denied(denied);
            }
        }

        RouteDecision::Allow
    }
}

impl fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGuard")
            .field("exempt", &self.exempt.len())
            .field("routes", &self.routes.len())
            .field("hierarchy", &self.hierarchy.len())
            .field("login_path", &self.login_path)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{LoginGrant, SessionPrincipal, TokenSet};
    use std::time::Duration;
    use warden_core::Email;

    fn guard(registry: Arc<RoleRegistry>) -> RouteGuard {
        RouteGuard::new(registry)
            .with_default_exempt_paths()
            .with_routes([
                RouteRule::new("/projects", "projects", "read"),
                RouteRule::new("/projects/new", "projects", "create"),
                RouteRule::new("/users", "users", "read"),
            ])
            .with_hierarchy_rule(HierarchyRule::new("/settings", "MANAGER"))
    }

    fn signed_in(role: &str) -> (Arc<RoleRegistry>, SessionContext) {
        let registry = Arc::new(RoleRegistry::new());
        let ctx = SessionContext::new(registry.clone());
        ctx.complete_login(
            LoginGrant::new(
                SessionPrincipal {
                    id: "1".into(),
                    email: Email::parse("someone@demo.com").unwrap(),
                    name: None,
                    image: None,
                },
                role,
                TokenSet::default(),
            )
            .with_expires_in(Duration::from_secs(3600)),
        );
        (registry, ctx)
    }

    #[test]
    fn test_route_matching() {
        let guard = guard(Arc::new(RoleRegistry::new()));

        assert_eq!(guard.route_for("/projects").unwrap().action, "read");
        assert_eq!(guard.route_for("/projects/42").unwrap().action, "read");
        assert_eq!(guard.route_for("/projects/new").unwrap().action, "create");
        assert!(guard.route_for("/projectsX").is_none());
        assert!(guard.route_for("/dashboard").is_none());

        assert!(guard.is_exempt("/login"));
        assert!(guard.is_exempt("/auth/callback/azure"));
        assert!(!guard.is_exempt("/projects"));
    }

    #[test]
    fn test_route_matching_ignores_query_and_fragment() {
        let guard = guard(Arc::new(RoleRegistry::new()));

        assert_eq!(guard.route_for("/projects/new?from=board").unwrap().action, "create");
        assert_eq!(guard.route_for("/projects#top").unwrap().action, "read");
        assert!(guard.hierarchy_rule_for("/settings?tab=x").is_some());
        assert!(guard.is_exempt("/login?next=%2Fprojects"));
    }

    #[tokio::test]
    async fn test_hierarchy_rule_with_query_string() {
        let (registry, lead) = signed_in("TEAM_LEAD");
        let guard = guard(registry);

        match guard.check(&lead, "/settings?tab=x").await {
            RouteDecision::Denied(denied) => assert_eq!(denied.path, "/settings?tab=x"),
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_anonymous_is_redirected() {
        let registry = Arc::new(RoleRegistry::new());
        let guard = guard(registry.clone());
        let ctx = SessionContext::new(registry);

        assert_eq!(
            guard.check(&ctx, "/projects").await,
            RouteDecision::RedirectToLogin {
                login_path: "/login".into(),
                return_to: "/projects".into(),
            }
        );
        assert!(guard.check(&ctx, "/login").await.is_allowed());
    }

    #[tokio::test]
    async fn test_permission_denial_names_requirement() {
        let (registry, ctx) = signed_in("VIEWER");
        let guard = guard(registry);

        assert!(guard.check(&ctx, "/projects/7").await.is_allowed());
        assert!(guard.check(&ctx, "/dashboard").await.is_allowed());

        match guard.check(&ctx, "/projects/new").await {
            RouteDecision::Denied(denied) => {
                assert_eq!(
                    denied.requirement,
                    Requirement::Permission {
                        resource: "projects".into(),
                        action: "create".into(),
                    }
                );
                assert!(denied.to_string().contains("create projects"));
            }
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hierarchy_rule() {
        let (registry, lead) = signed_in("TEAM_LEAD");
        let guard = guard(registry);
        assert!(matches!(
            guard.check(&lead, "/settings/general").await,
            RouteDecision::Denied(AccessDenied {
                requirement: Requirement::MinimumRole { .. },
                ..
            })
        ));

        let (_, manager) = signed_in("MANAGER");
        assert!(guard.check(&manager, "/settings").await.is_allowed());

        let (_, root) = signed_in("SUPER_ADMIN");
        assert!(guard.check(&root, "/users").await.is_allowed());
    }

    #[tokio::test]
    async fn test_stale_navigation_is_superseded() {
        let registry = Arc::new(RoleRegistry::new());
        let guard = guard(registry.clone());
        let ctx = SessionContext::new(registry);

        let first = guard.begin_navigation();
        let second = guard.begin_navigation();

        assert_eq!(
            guard.check_with_ticket(first, &ctx, "/projects").await,
            RouteDecision::Superseded
        );
        assert!(matches!(
            guard.check_with_ticket(second, &ctx, "/projects").await,
            RouteDecision::RedirectToLogin { .. }
        ));
    }
}
