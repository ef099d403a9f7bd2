// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::{ApiConfig, CorsConfig};
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{AuthLayer, RequirePermissionLayer};
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let state = &self.state;
        let require = |resource: &str, action: &str| {
            RequirePermissionLayer::new(state.evaluator.clone(), resource, action)
        };

        let auth = AuthLayer::new(state.decoder.clone(), state.identity.clone())
            .with_public_paths(self.config.public_paths.iter().cloned());

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer(&self.config.cors))
            .layer(auth);

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/auth/me", get(handlers::current_principal))
            .route(
                "/api/roles",
                get(handlers::list_roles).route_layer(require("roles", "read")),
            )
            .route("/api/roles/assignable", get(handlers::assignable_roles))
            .route(
                "/api/roles/changes",
                get(handlers::role_changes).route_layer(require("audit", "read")),
            )
            .route(
                "/api/users/{email}/role",
                put(handlers::assign_role).route_layer(require("users", "update")),
            )
            .route(
                "/api/mappings",
                get(handlers::list_mappings).route_layer(require("users", "read")),
            )
            .route(
                "/api/mappings/{email}",
                put(handlers::put_mapping)
                    .delete(handlers::delete_mapping)
                    .route_layer(require("users", "update")),
            )
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server until `shutdown_signal` resolves.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!(%addr, "Starting API server");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");
        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn create_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origin = if cors.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(cors.max_age))
}

// =============================================================================
// Tests
// =============================================================================
