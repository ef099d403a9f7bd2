// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built test data for consistent and reproducible testing. The
//! directory below mirrors a small delivery team.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use warden_core::{Email, IdentityService, ProfileData, RoleRegistry};
use warden_session::{LoginGrant, SessionPrincipal, TokenSet};

// =============================================================================
// Email Fixtures
// =============================================================================

/// Fixture providing the team's identities.
pub struct EmailFixtures;

impl EmailFixtures {
    /// Has no mapping anywhere; resolves to the default role.
    pub fn newcomer() -> Email {
        Self::parse("sarah.johnson@demo.com")
    }

    /// Statically mapped to SUPER_ADMIN.
    pub fn owner() -> Email {
        Self::parse("owner@theqexle.com")
    }

    /// Statically mapped to ADMIN.
    pub fn admin() -> Email {
        Self::parse("admin@theqexle.com")
    }

    /// Statically mapped to MANAGER.
    pub fn manager() -> Email {
        Self::parse("manager@theqexle.com")
    }

    /// Statically mapped to TEAM_LEAD.
    pub fn lead() -> Email {
        Self::parse("lead@theqexle.com")
    }

    /// Statically mapped to DEVELOPER.
    pub fn developer() -> Email {
        Self::parse("dev@theqexle.com")
    }

    /// Static `(email, role)` pairs for the team.
    pub fn static_table() -> Vec<(Email, &'static str)> {
        vec![
            (Self::owner(), "SUPER_ADMIN"),
            (Self::admin(), "ADMIN"),
            (Self::manager(), "MANAGER"),
            (Self::lead(), "TEAM_LEAD"),
            (Self::developer(), "DEVELOPER"),
        ]
    }

    fn parse(raw: &str) -> Email {
        Email::parse(raw).expect("fixture email must parse")
    }
}

// =============================================================================
// Identity Fixtures
// =============================================================================

/// Fixture providing registries and identity services.
pub struct IdentityFixtures;

impl IdentityFixtures {
    /// The built-in role table.
    pub fn registry() -> Arc<RoleRegistry> {
        Arc::new(RoleRegistry::new())
    }

    /// An identity service with the team's static table and in-memory stores.
    pub fn service() -> IdentityService {
        IdentityService::builder(Self::registry())
            .static_mappings(
                EmailFixtures::static_table()
                    .into_iter()
                    .map(|(email, role)| (email.into_inner(), role)),
            )
            .build()
    }

    /// A profile with a display name.
    pub fn profile(name: &str) -> ProfileData {
        ProfileData::named(name)
    }

    /// An empty profile.
    pub fn anonymous_profile() -> ProfileData {
        ProfileData::default()
    }
}

// =============================================================================
// Session Fixtures
// =============================================================================

/// Fixture providing login grants.
pub struct SessionFixtures;

impl SessionFixtures {
    /// A session principal for `email`.
    pub fn principal(email: &Email) -> SessionPrincipal {
        SessionPrincipal {
            id: format!("user-{}", email.as_str().split('@').next().unwrap_or("x")),
            email: email.clone(),
            name: None,
            image: None,
        }
    }

    /// A provider-backed grant carrying refresh material.
    pub fn provider_grant(email: &Email, role: &str) -> LoginGrant {
        LoginGrant::new(
            Self::principal(email),
            role,
            TokenSet {
                access_token: Some("access-1".into()),
                id_token: Some("id-1".into()),
                refresh_token: Some("refresh-1".into()),
            },
        )
        .with_provider_account("provider-account-1")
    }

    /// A credentials grant without refresh material.
    pub fn local_grant(email: &Email, role: &str) -> LoginGrant {
        LoginGrant::local(Self::principal(email), role)
    }
}

// =============================================================================
// Token Fixtures
// =============================================================================

/// Fixture producing bearer tokens.
pub struct TokenFixtures;

impl TokenFixtures {
    /// Secret used by [`TokenFixtures::signed`].
    pub const SECRET: &'static str = "integration-test-secret";

    /// An HS256 token carrying `claims`.
    ///
    /// `exp` is added one hour ahead unless `claims` already has one.
    pub fn signed(claims: serde_json::Value) -> String {
        let mut claims = claims;
        if let Some(map) = claims.as_object_mut() {
            map.entry("exp")
                .or_insert_with(|| serde_json::json!(Utc::now().timestamp() + 3600));
        }
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(Self::SECRET.as_bytes()),
        )
        .expect("fixture token must encode")
    }

    /// A token whose `email` claim is `email`.
    pub fn for_email(email: &Email) -> String {
        Self::signed(serde_json::json!({ "email": email.as_str(), "name": "Test User" }))
    }

    /// An `Authorization` header value for `email`.
    pub fn bearer(email: &Email) -> String {
        format!("Bearer {}", Self::for_email(email))
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// Fixture providing configuration documents.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// A complete YAML document for the team.
    pub fn team_yaml() -> &'static str {
        r#"
roles:
  top_role: SUPER_ADMIN
  default_role: VIEWER

mappings:
  - email: owner@theqexle.com
    role: SUPER_ADMIN
  - email: Manager@TheQexle.com
    role: MANAGER
  - email: dev@theqexle.com
    role: DEVELOPER

routes:
  login_path: /login
  exempt:
    - /public/*

session:
  token_lifetime: 3600
  refresh_lookahead: 300

identity:
  lookup_timeout_ms: 250

audit:
  backend: memory
  max_entries: 100

api:
  port: ${WARDEN_TEST_PORT:8181}
  token_secret: integration-test-secret

logging:
  level: debug
  format: compact
"#
    }
}
