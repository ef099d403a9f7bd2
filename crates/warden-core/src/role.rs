// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role registry: the static table of roles, their ranks and their grants.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{RoleError, RoleResult};
use crate::permission::actions;
use crate::types::RoleKey;

/// Matcher that accepts any resource or any action.
pub const WILDCARD: &str = "*";

// =============================================================================
// PermissionGrant
// =============================================================================

/// A resource matcher paired with the actions allowed on it.
///
/// Both the resource and each action may be [`WILDCARD`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Resource name or `"*"`.
    pub resource: String,
    /// Allowed actions; `"*"` allows every action.
    pub actions: Vec<String>,
}

impl PermissionGrant {
    /// Creates a grant for a resource.
    pub fn new<I, S>(resource: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resource: resource.into(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// A grant matching every resource and every action.
    pub fn all() -> Self {
        Self::new(WILDCARD, [WILDCARD])
    }

    /// Returns `true` if the grant applies to `resource`.
    #[inline]
    pub fn matches_resource(&self, resource: &str) -> bool {
        self.resource == WILDCARD || self.resource == resource
    }

    /// Returns `true` if the grant includes `action`.
    #[inline]
    pub fn matches_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == WILDCARD || a == action)
    }

    /// Returns `true` if the grant allows `action` on `resource`.
    pub fn allows(&self, resource: &str, action: &str) -> bool {
        self.matches_resource(resource) && self.matches_action(action)
    }

    fn validate(&self, role: &str) -> RoleResult<()> {
        if self.resource.trim().is_empty() {
            return Err(RoleError::invalid_grant(role, "resource must not be empty"));
        }
        if self.actions.is_empty() {
            return Err(RoleError::invalid_grant(
                role,
                format!("grant on '{}' has no actions", self.resource),
            ));
        }
        if self.actions.iter().any(|a| a.trim().is_empty()) {
            return Err(RoleError::invalid_grant(
                role,
                format!("grant on '{}' has an empty action", self.resource),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// RoleConfig
// =============================================================================

/// Metadata for a single role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Role key.
    pub key: RoleKey,
    /// Human readable name.
    pub display_name: String,
    /// Hierarchy rank; higher is more privileged.
    pub hierarchy: u32,
    /// Ordered permission grants.
    #[serde(default)]
    pub permissions: Vec<PermissionGrant>,
    /// Description of the role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RoleConfig {
    /// Creates a role without grants.
    pub fn new(key: impl Into<RoleKey>, display_name: impl Into<String>, hierarchy: u32) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            hierarchy,
            permissions: Vec::new(),
            description: None,
        }
    }

    /// Adds a grant.
    pub fn grant<I, S>(mut self, resource: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.push(PermissionGrant::new(resource, actions));
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =============================================================================
// HierarchyOrdering
// =============================================================================

/// Result of comparing two roles by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyOrdering {
    /// The first role outranks the second.
    Higher,
    /// Both roles have the same rank.
    Equal,
    /// The second role outranks the first.
    Lower,
}

impl HierarchyOrdering {
    /// Returns `true` only for [`HierarchyOrdering::Higher`]; ties are not higher.
    pub fn is_higher(self) -> bool {
        self == HierarchyOrdering::Higher
    }
}

impl From<Ordering> for HierarchyOrdering {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Greater => HierarchyOrdering::Higher,
            Ordering::Equal => HierarchyOrdering::Equal,
            Ordering::Less => HierarchyOrdering::Lower,
        }
    }
}

// =============================================================================
// RoleRegistry
// =============================================================================

/// Single source of truth for role metadata.
///
/// Created once at startup and shared by reference count; the table is
/// immutable afterwards. Unknown role keys are never an error at lookup time:
/// they have rank zero and no grants.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: Arc<HashMap<RoleKey, RoleConfig>>,
    top_role: RoleKey,
    default_role: RoleKey,
}

impl RoleRegistry {
    /// Creates the registry with the built-in project-management roles.
    pub fn new() -> Self {
        let mut roles = HashMap::new();
        for role in default_roles() {
            roles.insert(role.key.clone(), role);
        }
        Self {
            roles: Arc::new(roles),
            top_role: RoleKey::new(DEFAULT_TOP_ROLE),
            default_role: RoleKey::new(DEFAULT_ROLE),
        }
    }

    /// Creates a registry builder.
    pub fn builder() -> RoleRegistryBuilder {
        RoleRegistryBuilder::new()
    }

    /// Returns the role metadata, or `None` for an unknown key.
    pub fn get_role(&self, key: &str) -> Option<&RoleConfig> {
        self.roles.get(key)
    }

    /// Returns `true` if the key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.roles.contains_key(key)
    }

    /// Returns the rank of a role; unknown roles rank zero.
    pub fn rank_of(&self, key: &str) -> u32 {
        self.get_role(key).map(|r| r.hierarchy).unwrap_or(0)
    }

    /// Compares two roles by rank.
    pub fn compare_hierarchy(&self, a: &str, b: &str) -> HierarchyOrdering {
        self.rank_of(a).cmp(&self.rank_of(b)).into()
    }

    /// Returns the role that bypasses every permission check.
    pub fn top_role(&self) -> &RoleKey {
        &self.top_role
    }

    /// Returns `true` if `key` is the top role.
    pub fn is_top_role(&self, key: &str) -> bool {
        self.top_role.as_str() == key
    }

    /// Returns the role assigned when no mapping exists.
    pub fn default_role(&self) -> &RoleKey {
        &self.default_role
    }

    /// Returns the display name of a role, falling back to the key.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.get_role(key)
            .map(|r| r.display_name.as_str())
            .unwrap_or(key)
    }

    /// Returns the grants of a role; empty for unknown roles.
    pub fn permissions_of(&self, key: &str) -> &[PermissionGrant] {
        self.get_role(key)
            .map(|r| r.permissions.as_slice())
            .unwrap_or(&[])
    }

    /// Returns all roles, most privileged first.
    pub fn roles_by_rank(&self) -> Vec<&RoleConfig> {
        let mut roles: Vec<&RoleConfig> = self.roles.values().collect();
        roles.sort_by(|a, b| b.hierarchy.cmp(&a.hierarchy).then_with(|| a.key.cmp(&b.key)));
        roles
    }

    /// Returns the number of registered roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns `true` if no roles are registered.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// RoleRegistryBuilder
// =============================================================================

/// Builder for constructing role registries.
#[derive(Debug, Default)]
pub struct RoleRegistryBuilder {
    roles: Vec<RoleConfig>,
    top_role: Option<RoleKey>,
    default_role: Option<RoleKey>,
}

impl RoleRegistryBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the built-in roles.
    pub fn with_default_roles(mut self) -> Self {
        self.roles.extend(default_roles());
        self
    }

    /// Adds a role.
    pub fn add_role(mut self, role: RoleConfig) -> Self {
        self.roles.push(role);
        self
    }

    /// Adds several roles.
    pub fn add_roles(mut self, roles: impl IntoIterator<Item = RoleConfig>) -> Self {
        self.roles.extend(roles);
        self
    }

    /// Sets the top role.
    pub fn top_role(mut self, key: impl Into<RoleKey>) -> Self {
        self.top_role = Some(key.into());
        self
    }

    /// Sets the default role.
    pub fn default_role(mut self, key: impl Into<RoleKey>) -> Self {
        self.default_role = Some(key.into());
        self
    }

    /// Builds the registry, checking that the table is coherent.
    pub fn build(self) -> RoleResult<RoleRegistry> {
        let mut roles = HashMap::with_capacity(self.roles.len());
        for role in self.roles {
            if role.key.as_str().trim().is_empty() {
                return Err(RoleError::invalid_grant("", "role key must not be empty"));
            }
            for grant in &role.permissions {
                grant.validate(role.key.as_str())?;
            }
            if roles.contains_key(&role.key) {
                return Err(RoleError::DuplicateRole {
                    key: role.key.into_inner(),
                });
            }
            roles.insert(role.key.clone(), role);
        }

        let top_role = self
            .top_role
            .unwrap_or_else(|| RoleKey::new(DEFAULT_TOP_ROLE));
        let default_role = self
            .default_role
            .unwrap_or_else(|| RoleKey::new(DEFAULT_ROLE));

        if !roles.contains_key(&top_role) {
            return Err(RoleError::unknown(top_role.into_inner()));
        }
        if !roles.contains_key(&default_role) {
            return Err(RoleError::unknown(default_role.into_inner()));
        }

        Ok(RoleRegistry {
            roles: Arc::new(roles),
            top_role,
            default_role,
        })
    }
}

// =============================================================================
// Built-in roles
// =============================================================================

/// Key of the built-in top role.
pub const DEFAULT_TOP_ROLE: &str = "SUPER_ADMIN";

/// Key of the built-in default role.
pub const DEFAULT_ROLE: &str = "VIEWER";

/// Returns the built-in role table.
pub fn default_roles() -> Vec<RoleConfig> {
    use actions::{CREATE, DELETE, EXPORT, READ, UPDATE, WRITE};

    vec![
        RoleConfig::new(DEFAULT_TOP_ROLE, "Super Administrator", 100)
            .grant(WILDCARD, [WILDCARD])
            .with_description("Unrestricted access to every resource"),
        RoleConfig::new("ADMIN", "Administrator", 90)
            .grant("projects", [WILDCARD])
            .grant("tasks", [WILDCARD])
            .grant("users", [WILDCARD])
            .grant("reports", [WILDCARD])
            .grant("files", [WILDCARD])
            .grant("roles", [READ])
            .grant("audit", [READ])
            .grant("settings", [READ, UPDATE])
            .with_description("Manages users, projects and settings"),
        RoleConfig::new("MANAGER", "Project Manager", 80)
            .grant("projects", [READ, CREATE, UPDATE, EXPORT])
            .grant("tasks", [WILDCARD])
            .grant("users", [READ, UPDATE])
            .grant("roles", [READ])
            .grant("reports", [READ, EXPORT])
            .grant("files", [READ, WRITE, DELETE])
            .grant("settings", [READ])
            .with_description("Runs projects and their teams"),
        RoleConfig::new("TEAM_LEAD", "Team Lead", 70)
            .grant("projects", [READ, UPDATE])
            .grant("tasks", [WILDCARD])
            .grant("users", [READ, UPDATE])
            .grant("reports", [READ])
            .grant("files", [READ, WRITE])
            .with_description("Leads a delivery team"),
        RoleConfig::new("DEVELOPER", "Developer", 60)
            .grant("projects", [READ])
            .grant("tasks", [READ, CREATE, UPDATE])
            .grant("reports", [READ])
            .grant("files", [READ, WRITE])
            .with_description("Works on assigned tasks"),
        RoleConfig::new(DEFAULT_ROLE, "Viewer", 10)
            .grant("projects", [READ])
            .grant("tasks", [READ])
            .with_description("Read-only access"),
    ]
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = RoleRegistry::new();

        assert_eq!(registry.len(), 6);
        assert!(registry.is_top_role("SUPER_ADMIN"));
        assert!(!registry.is_top_role("ADMIN"));
        assert_eq!(registry.default_role().as_str(), "VIEWER");
        assert_eq!(registry.display_name("MANAGER"), "Project Manager");
        assert_eq!(registry.display_name("GHOST"), "GHOST");
    }

    #[test]
    fn test_compare_hierarchy() {
        let registry = RoleRegistry::new();

        assert_eq!(
            registry.compare_hierarchy("ADMIN", "MANAGER"),
            HierarchyOrdering::Higher
        );
        assert_eq!(
            registry.compare_hierarchy("DEVELOPER", "TEAM_LEAD"),
            HierarchyOrdering::Lower
        );
        assert_eq!(
            registry.compare_hierarchy("VIEWER", "VIEWER"),
            HierarchyOrdering::Equal
        );
        // Unknown roles rank zero.
        assert_eq!(
            registry.compare_hierarchy("GHOST", "VIEWER"),
            HierarchyOrdering::Lower
        );
        assert_eq!(registry.rank_of("GHOST"), 0);
    }

    #[test]
    fn test_ties_are_not_higher() {
        let registry = RoleRegistry::builder()
            .add_role(RoleConfig::new("A", "A", 50))
            .add_role(RoleConfig::new("B", "B", 50))
            .top_role("A")
            .default_role("B")
            .build()
            .unwrap();

        assert!(!registry.compare_hierarchy("A", "B").is_higher());
        assert!(!registry.compare_hierarchy("B", "A").is_higher());
    }

    #[test]
    fn test_roles_by_rank() {
        let registry = RoleRegistry::new();
        let keys: Vec<&str> = registry
            .roles_by_rank()
            .iter()
            .map(|r| r.key.as_str())
            .collect();

        assert_eq!(
            keys,
            vec!["SUPER_ADMIN", "ADMIN", "MANAGER", "TEAM_LEAD", "DEVELOPER", "VIEWER"]
        );
    }

    #[test]
    fn test_builder_rejects_unknown_top_role() {
        let result = RoleRegistry::builder()
            .add_role(RoleConfig::new("ONLY", "Only", 1))
            .default_role("ONLY")
            .build();

        assert!(matches!(result, Err(RoleError::UnknownRole { key }) if key == "SUPER_ADMIN"));
    }

    #[test]
    fn test_builder_rejects_duplicates_and_bad_grants() {
        let duplicate = RoleRegistry::builder()
            .with_default_roles()
            .add_role(RoleConfig::new("VIEWER", "Viewer again", 5))
            .build();
        assert!(matches!(duplicate, Err(RoleError::DuplicateRole { .. })));

        let empty_actions = RoleRegistry::builder()
            .with_default_roles()
            .add_role(RoleConfig::new("BROKEN", "Broken", 5).grant("projects", Vec::<String>::new()))
            .build();
        assert!(matches!(empty_actions, Err(RoleError::InvalidGrant { .. })));
    }

    #[test]
    fn test_grant_matching() {
        let grant = PermissionGrant::new("projects", ["read", "update"]);
        assert!(grant.allows("projects", "read"));
        assert!(grant.allows("projects", "update"));
        assert!(!grant.allows("projects", "delete"));
        assert!(!grant.allows("tasks", "read"));

        let all = PermissionGrant::all();
        assert!(all.allows("anything", "whatever"));
    }
}
