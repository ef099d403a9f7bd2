// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Configuration Integration Tests
//!
//! - `test_load_*`: Loading documents in every supported format
//! - `test_build_*`: Runtime objects built from a loaded configuration
//! - `test_invalid_*`: Validation failures

use std::io::Write;

use tempfile::NamedTempFile;
use warden_config::{AuditBackend, ConfigError, ConfigFormat, ConfigLoader, LogFormat, LogLevel};
use warden_core::{Email, ResolutionTier};
use warden_session::{RouteDecision, SessionContext, SessionStatus};
use warden_tests::prelude::*;

fn write_temp(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn validation_field(err: ConfigError) -> String {
    match err {
        ConfigError::Validation { field, .. } => field,
        other => panic!("expected validation error, got {other}"),
    }
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_team_yaml() {
    init_test_logging();
    let file = write_temp(ConfigFixtures::team_yaml(), ".yaml");

    let config = ConfigLoader::new().load(file.path()).unwrap();

    assert_eq!(config.roles.top_role, "SUPER_ADMIN");
    assert_eq!(config.roles.definitions.len(), 6);
    assert_eq!(config.mappings.len(), 3);
    // the raw spelling is kept; resolution normalises it
    assert_eq!(config.mappings[1].email, "Manager@TheQexle.com");
    assert_eq!(config.routes.exempt, ["/public/*"]);
    assert!(!config.routes.rules.is_empty());
    assert_eq!(config.identity.lookup_timeout_ms, 250);
    assert_eq!(config.audit.backend, AuditBackend::Memory);
    assert_eq!(config.api.port, 8181);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert!(config.warnings().is_empty());
}

#[test]
fn test_load_toml() {
    init_test_logging();
    let file = write_temp(
        r#"
[roles]
default_role = "DEVELOPER"

[[mappings]]
email = "owner@theqexle.com"
role = "SUPER_ADMIN"

[api]
port = 9090
token_secret = "s3cret"

[logging]
level = "warn"
format = "json"
"#,
        ".toml",
    );

    let config = ConfigLoader::new().with_env_vars(false).load(file.path()).unwrap();

    assert_eq!(config.roles.default_role, "DEVELOPER");
    assert_eq!(config.mappings[0].role, "SUPER_ADMIN");
    assert_eq!(config.api.port, 9090);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_load_json_string() {
    init_test_logging();
    let config = ConfigLoader::new()
        .with_env_vars(false)
        .load_from_str(
            r#"{ "mappings": [ { "email": "lead@theqexle.com", "role": "TEAM_LEAD" } ],
                 "audit": { "backend": "none" } }"#,
            ConfigFormat::Json,
        )
        .unwrap();

    assert_eq!(config.mappings.len(), 1);
    assert_eq!(config.audit.backend, AuditBackend::None);
    assert!(config
        .warnings()
        .iter()
        .any(|w| w.starts_with("audit.backend")));
}

#[test]
fn test_load_custom_role_table() {
    init_test_logging();
    let yaml = r#"
roles:
  top_role: OWNER
  default_role: GUEST
  definitions:
    - key: OWNER
      display_name: Owner
      hierarchy: 100
    - key: EDITOR
      display_name: Editor
      hierarchy: 50
      permissions:
        - resource: documents
          actions: [read, update]
    - key: GUEST
      display_name: Guest
      hierarchy: 1
      permissions:
        - resource: documents
          actions: [read]
routes:
  rules:
    - path: /documents
      resource: documents
      action: read
  hierarchy: []
"#;

    let config = ConfigLoader::new()
        .with_env_vars(false)
        .load_from_str(yaml, ConfigFormat::Yaml)
        .unwrap();
    let registry = config.build_registry().unwrap();

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.top_role().as_str(), "OWNER");
    assert_eq!(registry.default_role().as_str(), "GUEST");
    assert_eq!(registry.display_name("EDITOR"), "Editor");
}

#[test]
fn test_load_missing_file() {
    let err = ConfigLoader::new()
        .load("/definitely/not/here/warden.yaml")
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}

#[test]
fn test_load_relative_audit_path() {
    init_test_logging();
    let dir = temp_test_dir("warden-config");
    let path = dir.path().join("warden.yaml");
    std::fs::write(
        &path,
        "audit:\n  backend: jsonl\n  path: logs/role-changes.jsonl\n",
    )
    .unwrap();

    let config = ConfigLoader::new().with_env_vars(false).load(&path).unwrap();
    assert_eq!(config.audit.path, dir.path().join("logs/role-changes.jsonl"));

    config.build_audit_logger().unwrap();
    assert!(dir.path().join("logs/role-changes.jsonl").exists());
}

// =============================================================================
// Runtime Construction
// =============================================================================

#[tokio::test]
async fn test_build_identity_service_from_yaml() {
    init_test_logging();
    let config = ConfigLoader::new()
        .load_from_str(ConfigFixtures::team_yaml(), ConfigFormat::Yaml)
        .unwrap();
    let registry = config.build_registry().unwrap();
    let identity = config.build_identity_service(registry).unwrap();

    let resolution = identity.resolve_role(&EmailFixtures::manager()).await;
    assert_eq!(resolution.role.as_str(), "MANAGER");
    assert_eq!(resolution.tier, ResolutionTier::Static);

    let stranger = Email::parse("stranger@demo.com").unwrap();
    let resolution = identity.resolve_role(&stranger).await;
    assert_eq!(resolution.role.as_str(), "VIEWER");

    identity
        .get_or_create_principal_record(&stranger, &IdentityFixtures::anonymous_profile())
        .await
        .unwrap();
    let changes = identity
        .role_changes(warden_core::AuditFilter::new())
        .await
        .unwrap();
    assert_eq!(changes.len(), 1);
}

#[tokio::test]
async fn test_build_route_guard_from_yaml() {
    init_test_logging();
    let config = ConfigLoader::new()
        .load_from_str(ConfigFixtures::team_yaml(), ConfigFormat::Yaml)
        .unwrap();
    let registry = config.build_registry().unwrap();
    let guard = config.build_route_guard(registry.clone());

    let anonymous = SessionContext::new(registry.clone());
    assert!(guard.check(&anonymous, "/public/pricing").await.is_allowed());
    assert!(guard.check(&anonymous, "/auth/callback").await.is_allowed());
    assert!(matches!(
        guard.check(&anonymous, "/projects").await,
        RouteDecision::RedirectToLogin { .. }
    ));

    let viewer = SessionContext::builder(registry)
        .config(config.session.clone())
        .build();
    viewer.complete_login(SessionFixtures::local_grant(&EmailFixtures::newcomer(), "VIEWER"));
    assert!(guard.check(&viewer, "/projects").await.is_allowed());
    assert!(matches!(
        guard.check(&viewer, "/projects/new").await,
        RouteDecision::Denied(_)
    ));
    assert!(matches!(
        guard.check(&viewer, "/settings").await,
        RouteDecision::Denied(_)
    ));
}

#[tokio::test]
async fn test_build_session_context_uses_configured_store() {
    init_test_logging();
    let dir = temp_test_dir("warden-config");
    let path = dir.path().join("warden.yaml");
    std::fs::write(
        &path,
        "session:\n  token_lifetime: 1800\n  storage_key: ops-console\nsession_store:\n  dir: sessions\n",
    )
    .unwrap();

    let config = ConfigLoader::new().with_env_vars(false).load(&path).unwrap();
    assert_eq!(config.session_store.dir, Some(dir.path().join("sessions")));
    let registry = config.build_registry().unwrap();

    let first = config.build_session_context(registry.clone(), None).unwrap();
    assert_eq!(first.config().token_lifetime.as_secs(), 1800);
    first.complete_login(SessionFixtures::provider_grant(&EmailFixtures::manager(), "MANAGER"));
    assert!(dir.path().join("sessions/ops-console.json").exists());

    let second = config.build_session_context(registry, None).unwrap();
    assert_eq!(second.restore(), SessionStatus::Valid);
    assert_eq!(second.require().unwrap().role.as_str(), "MANAGER");
}

#[tokio::test]
async fn test_build_session_context_defaults_to_memory() {
    init_test_logging();
    let config = ConfigLoader::new()
        .with_env_vars(false)
        .load_from_str("session:\n  token_lifetime: 900\n", ConfigFormat::Yaml)
        .unwrap();
    assert!(config.session_store.dir.is_none());
    let registry = config.build_registry().unwrap();

    let first = config.build_session_context(registry.clone(), None).unwrap();
    first.complete_login(SessionFixtures::provider_grant(&EmailFixtures::lead(), "TEAM_LEAD"));
    assert_eq!(first.status(), SessionStatus::Valid);

    let second = config.build_session_context(registry, None).unwrap();
    assert_eq!(second.restore(), SessionStatus::Anonymous);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_invalid_mapping_role() {
    let err = ConfigLoader::new()
        .with_env_vars(false)
        .load_from_str(
            "mappings:\n  - email: dev@theqexle.com\n    role: WIZARD\n",
            ConfigFormat::Yaml,
        )
        .unwrap_err();
    assert_eq!(validation_field(err), "mappings[0].role");
}

#[test]
fn test_invalid_mapping_email() {
    let err = ConfigLoader::new()
        .with_env_vars(false)
        .load_from_str(
            "mappings:\n  - email: not-an-email\n    role: VIEWER\n",
            ConfigFormat::Yaml,
        )
        .unwrap_err();
    assert_eq!(validation_field(err), "mappings[0].email");
}

#[test]
fn test_invalid_default_role() {
    let err = ConfigLoader::new()
        .with_env_vars(false)
        .load_from_str("roles:\n  default_role: NOBODY\n", ConfigFormat::Yaml)
        .unwrap_err();
    assert_eq!(validation_field(err), "roles.default_role");
}

#[test]
fn test_invalid_syntax_is_a_parse_error() {
    let err = ConfigLoader::new()
        .with_env_vars(false)
        .load_from_str("roles: [unterminated", ConfigFormat::Yaml)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_invalid_file_loads_unvalidated() {
    let file = write_temp("roles:\n  top_role: NOBODY\n", ".yaml");
    let loader = ConfigLoader::new().with_env_vars(false);

    let config = loader.load_unvalidated(file.path()).unwrap();
    assert_eq!(config.roles.top_role, "NOBODY");
    assert!(loader.load(file.path()).unwrap_err().is_validation());
}
