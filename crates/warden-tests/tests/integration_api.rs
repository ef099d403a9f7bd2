// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # API Integration Tests
//!
//! - `test_auth_*`: Credential handling (401)
//! - `test_permission_*`: Route permission checks (403)
//! - `test_roles_*`: Role table and assignment endpoints
//! - `test_mappings_*`: Override mapping endpoints

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use warden_api::{ApiConfig, ApiServer, AppState, TokenConfig};
use warden_core::Email;
use warden_tests::prelude::*;

fn router() -> Router {
    init_test_logging();
    let config = ApiConfig::default().with_token(TokenConfig {
        secret: Some(TokenFixtures::SECRET.to_string()),
        ..TokenConfig::default()
    });
    let state = AppState::builder(IdentityFixtures::service())
        .config(config)
        .build();
    ApiServer::new(state).router()
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    caller: Option<&Email>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(email) = caller {
        builder = builder.header(header::AUTHORIZATION, TokenFixtures::bearer(email));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(router: &Router, uri: &str, caller: &Email) -> (StatusCode, Value) {
    send(router, Method::GET, uri, Some(caller), None).await
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_auth_health_is_public() {
    let router = router();
    let (status, body) = send(&router, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_auth_missing_token_is_401() {
    let router = router();
    let (status, body) = send(&router, Method::GET, "/api/auth/me", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_wrong_signature_is_401() {
    let router = router();
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({ "email": "owner@theqexle.com", "exp": chrono::Utc::now().timestamp() + 60 }),
        &jsonwebtoken::EncodingKey::from_secret(b"not-the-secret"),
    )
    .unwrap();
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", forged))
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_expired_token_is_401() {
    let router = router();
    let token = TokenFixtures::signed(json!({
        "email": "dev@theqexle.com",
        "exp": chrono::Utc::now().timestamp() - 3600,
    }));
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_me_reports_resolved_role() {
    let router = router();
    let (status, body) = get(&router, "/api/auth/me", &EmailFixtures::manager()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "manager@theqexle.com");
    assert_eq!(body["role"], "MANAGER");
    assert_eq!(body["role_display_name"], "Manager");
    assert_eq!(body["is_top_role"], false);
    assert!(body["permissions"].as_array().is_some_and(|p| !p.is_empty()));
}

#[tokio::test]
async fn test_auth_unknown_caller_gets_default_role() {
    let router = router();
    let (status, body) = get(&router, "/api/auth/me", &EmailFixtures::newcomer()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "VIEWER");
}

// =============================================================================
// Permissions
// =============================================================================

#[tokio::test]
async fn test_permission_denied_is_403_with_details() {
    let router = router();
    let (status, body) = get(&router, "/api/roles", &EmailFixtures::newcomer()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(body["error"]["details"]["resource"], "roles");
    assert_eq!(body["error"]["details"]["action"], "read");
}

#[tokio::test]
async fn test_permission_audit_log_needs_audit_read() {
    let router = router();

    let (status, _) = get(&router, "/api/roles/changes", &EmailFixtures::manager()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get(&router, "/api/roles/changes", &EmailFixtures::admin()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_permission_top_role_passes_everything() {
    let router = router();
    for uri in ["/api/roles", "/api/roles/changes", "/api/mappings"] {
        let (status, _) = get(&router, uri, &EmailFixtures::owner()).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}

// =============================================================================
// Roles
// =============================================================================

#[tokio::test]
async fn test_roles_table_is_ranked() {
    let router = router();
    let (status, body) = get(&router, "/api/roles", &EmailFixtures::developer()).await;

    assert_eq!(status, StatusCode::OK);
    let roles = body.as_array().unwrap();
    assert_eq!(roles.len(), 6);
    assert_eq!(roles[0]["key"], "SUPER_ADMIN");
    assert_eq!(roles[0]["is_top_role"], true);
    assert_eq!(roles[5]["key"], "VIEWER");
    assert_eq!(roles[5]["is_default"], true);
}

#[tokio::test]
async fn test_roles_assignable_below_caller() {
    let router = router();
    let (status, body) = get(&router, "/api/roles/assignable", &EmailFixtures::lead()).await;

    assert_eq!(status, StatusCode::OK);
    let keys: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["key"].as_str())
        .collect();
    assert_eq!(keys, ["DEVELOPER", "VIEWER"]);
}

#[tokio::test]
async fn test_roles_assign_and_audit() {
    let router = router();
    let newcomer = EmailFixtures::newcomer();

    // first contact creates the principal
    get(&router, "/api/auth/me", &newcomer).await;

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/users/sarah.johnson@demo.com/role",
        Some(&EmailFixtures::manager()),
        Some(json!({ "role": "DEVELOPER", "reason": "joined engineering" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "DEVELOPER");

    let (_, me) = get(&router, "/api/auth/me", &newcomer).await;
    assert_eq!(me["role"], "DEVELOPER");

    let (status, changes) = get(
        &router,
        "/api/roles/changes?email=Sarah.Johnson@demo.com&automatic=false",
        &EmailFixtures::admin(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let changes = changes.as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["changed_by"], "manager@theqexle.com");
    assert_eq!(changes[0]["from_role"], "VIEWER");
    assert_eq!(changes[0]["to_role"], "DEVELOPER");
    assert_eq!(changes[0]["reason"], "joined engineering");
}

#[tokio::test]
async fn test_roles_assign_above_own_rank_is_403() {
    let router = router();
    get(&router, "/api/auth/me", &EmailFixtures::newcomer()).await;

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/users/sarah.johnson@demo.com/role",
        Some(&EmailFixtures::manager()),
        Some(json!({ "role": "ADMIN" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_roles_assign_errors() {
    let router = router();
    let owner = EmailFixtures::owner();

    let (status, _) = send(
        &router,
        Method::PUT,
        "/api/users/stranger@demo.com/role",
        Some(&owner),
        Some(json!({ "role": "DEVELOPER" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        Method::PUT,
        "/api/users/stranger@demo.com/role",
        Some(&owner),
        Some(json!({ "role": "CHIEF_WIZARD" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &router,
        Method::PUT,
        "/api/users/not-an-email/role",
        Some(&owner),
        Some(json!({ "role": "DEVELOPER" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_roles_assign_needs_users_update() {
    let router = router();
    let (status, _) = send(
        &router,
        Method::PUT,
        "/api/users/dev@theqexle.com/role",
        Some(&EmailFixtures::developer()),
        Some(json!({ "role": "VIEWER" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Mappings
// =============================================================================

#[tokio::test]
async fn test_mappings_crud() {
    let router = router();
    let admin = EmailFixtures::admin();

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/mappings/contractor@demo.com",
        Some(&admin),
        Some(json!({ "role": "TEAM_LEAD", "reason": "contract" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "TEAM_LEAD");
    assert_eq!(body["created_by"], "admin@theqexle.com");

    let (status, body) = get(&router, "/api/mappings", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let contractor = Email::parse("contractor@demo.com").unwrap();
    let (_, me) = get(&router, "/api/auth/me", &contractor).await;
    assert_eq!(me["role"], "TEAM_LEAD");

    let (status, _) = send(
        &router,
        Method::DELETE,
        "/api/mappings/contractor@demo.com",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &router,
        Method::DELETE,
        "/api/mappings/contractor@demo.com",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mappings_hierarchy_applies() {
    let router = router();

    let (status, _) = send(
        &router,
        Method::PUT,
        "/api/mappings/contractor@demo.com",
        Some(&EmailFixtures::manager()),
        Some(json!({ "role": "MANAGER" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // admin@ is statically mapped to ADMIN.
    let (status, _) = send(
        &router,
        Method::PUT,
        "/api/mappings/admin@theqexle.com",
        Some(&EmailFixtures::manager()),
        Some(json!({ "role": "VIEWER" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, me) = get(&router, "/api/auth/me", &EmailFixtures::admin()).await;
    assert_eq!(me["role"], "ADMIN");

    let (status, _) = get(&router, "/api/mappings", &EmailFixtures::developer()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_mappings_reject_empty_role() {
    let router = router();
    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/mappings/contractor@demo.com",
        Some(&EmailFixtures::owner()),
        Some(json!({ "role": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
