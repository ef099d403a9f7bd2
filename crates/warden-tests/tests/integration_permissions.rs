// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Permission Integration Tests
//!
//! - `test_matrix_*`: The built-in role table
//! - `test_wildcard_*`: Wildcard grant semantics
//! - `test_bypass_*`: The top-role bypass
//! - `test_hierarchy_*`: Rank comparison

use std::sync::Arc;

use warden_core::{
    HierarchyOrdering, PermissionEvaluator, RoleConfig, RoleRegistry, WILDCARD,
};
use warden_tests::prelude::*;

fn evaluator() -> PermissionEvaluator {
    init_test_logging();
    PermissionEvaluator::new(IdentityFixtures::registry())
}

// =============================================================================
// Built-in Matrix
// =============================================================================

#[test]
fn test_matrix_viewer_is_read_only() {
    let eval = evaluator();

    assert!(eval.has_permission("VIEWER", "projects", "read"));
    assert!(eval.has_permission("VIEWER", "tasks", "read"));
    assert!(!eval.has_permission("VIEWER", "projects", "create"));
    assert!(!eval.has_permission("VIEWER", "users", "read"));
    assert!(!eval.has_permission("VIEWER", "reports", "read"));
}

#[test]
fn test_matrix_developer_and_lead() {
    let eval = evaluator();

    assert!(eval.has_permission("DEVELOPER", "tasks", "create"));
    assert!(!eval.has_permission("DEVELOPER", "tasks", "delete"));
    assert!(!eval.has_permission("DEVELOPER", "projects", "delete"));

    assert!(eval.has_permission("TEAM_LEAD", "tasks", "delete"));
    assert!(eval.has_permission("TEAM_LEAD", "users", "update"));
    assert!(!eval.has_permission("TEAM_LEAD", "projects", "create"));
}

#[test]
fn test_matrix_manager_and_admin() {
    let eval = evaluator();

    assert!(eval.has_permission("MANAGER", "projects", "export"));
    assert!(!eval.has_permission("MANAGER", "projects", "delete"));
    assert!(!eval.has_permission("MANAGER", "audit", "read"));

    assert!(eval.has_permission("ADMIN", "projects", "delete"));
    assert!(eval.has_permission("ADMIN", "audit", "read"));
    assert!(!eval.has_permission("ADMIN", "settings", "delete"));
}

#[test]
fn test_matrix_unknown_inputs_deny() {
    let eval = evaluator();

    assert!(!eval.has_permission("GHOST", "projects", "read"));
    assert!(!eval.has_permission("", "projects", "read"));
    assert!(!eval.has_permission("ADMIN", "spaceships", "read"));
    // keys are case-sensitive
    assert!(!eval.has_permission("viewer", "projects", "read"));
}

// =============================================================================
// Wildcards
// =============================================================================

#[test]
fn test_wildcard_action_covers_any_action() {
    let eval = evaluator();
    assert!(eval.has_permission("ADMIN", "tasks", "archive"));
    assert!(eval.has_permission("MANAGER", "tasks", "reassign"));
}

#[test]
fn test_wildcard_resource_in_custom_role() {
    let registry = RoleRegistry::builder()
        .with_default_roles()
        .add_role(RoleConfig::new("AUDITOR", "Auditor", 50).grant(WILDCARD, ["read"]))
        .build()
        .unwrap();
    let eval = PermissionEvaluator::new(Arc::new(registry));

    assert!(eval.has_permission("AUDITOR", "projects", "read"));
    assert!(eval.has_permission("AUDITOR", "audit", "read"));
    assert!(!eval.has_permission("AUDITOR", "projects", "update"));
}

// =============================================================================
// Top-role Bypass
// =============================================================================

#[test]
fn test_bypass_top_role_allows_everything() {
    let eval = evaluator();
    assert!(eval.has_permission("SUPER_ADMIN", "anything", "at-all"));
}

#[test]
fn test_bypass_follows_identity_not_rank() {
    // A role outranking the top role gains nothing from its rank.
    let registry = RoleRegistry::builder()
        .with_default_roles()
        .add_role(RoleConfig::new("ROBOT", "Robot", 1_000).grant("tasks", ["read"]))
        .build()
        .unwrap();
    let eval = PermissionEvaluator::new(Arc::new(registry));

    assert!(!eval.has_permission("ROBOT", "projects", "delete"));
    assert!(eval.has_permission("SUPER_ADMIN", "projects", "delete"));
}

#[test]
fn test_bypass_applies_to_snapshots() {
    let eval = evaluator();
    assert!(eval.check_snapshot("SUPER_ADMIN", &[], "users", "delete"));
    assert!(!eval.check_snapshot("ADMIN", &[], "users", "delete"));
}

// =============================================================================
// Hierarchy
// =============================================================================

#[test]
fn test_hierarchy_ranks_are_ordered() {
    let registry = IdentityFixtures::registry();
    let keys: Vec<&str> = registry
        .roles_by_rank()
        .iter()
        .map(|r| r.key.as_str())
        .collect();

    assert_eq!(
        keys,
        ["SUPER_ADMIN", "ADMIN", "MANAGER", "TEAM_LEAD", "DEVELOPER", "VIEWER"]
    );
}

#[test]
fn test_hierarchy_comparison() {
    let registry = IdentityFixtures::registry();

    assert_eq!(registry.compare_hierarchy("ADMIN", "MANAGER"), HierarchyOrdering::Higher);
    assert_eq!(registry.compare_hierarchy("VIEWER", "DEVELOPER"), HierarchyOrdering::Lower);
    assert_eq!(registry.compare_hierarchy("ADMIN", "ADMIN"), HierarchyOrdering::Equal);
    // unknown roles rank zero
    assert!(registry.compare_hierarchy("VIEWER", "GHOST").is_higher());
}
