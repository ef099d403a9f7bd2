// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-route permission enforcement.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use warden_core::PermissionEvaluator;

use crate::auth::AuthContext;
use crate::error::ApiError;

// =============================================================================
// RequirePermissionLayer
// =============================================================================

/// Layer declaring the `(resource, action)` a route requires.
///
/// Must sit inside [`AuthLayer`](super::AuthLayer): a request without an
/// [`AuthContext`] is rejected with 401, a context whose role lacks the grant
/// with 403.
#[derive(Clone)]
pub struct RequirePermissionLayer {
    evaluator: PermissionEvaluator,
    requirement: Arc<(String, String)>,
}

impl RequirePermissionLayer {
    /// Creates a layer requiring `action` on `resource`.
    pub fn new(
        evaluator: PermissionEvaluator,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            evaluator,
            requirement: Arc::new((resource.into(), action.into())),
        }
    }

    /// Returns the required resource.
    pub fn resource(&self) -> &str {
        &self.requirement.0
    }

    /// Returns the required action.
    pub fn action(&self) -> &str {
        &self.requirement.1
    }
}

impl<S> Layer<S> for RequirePermissionLayer {
    type Service = RequirePermission<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequirePermission {
            inner,
            evaluator: self.evaluator.clone(),
            requirement: self.requirement.clone(),
        }
    }
}

// =============================================================================
// RequirePermission
// =============================================================================

/// Middleware produced by [`RequirePermissionLayer`].
#[derive(Clone)]
pub struct RequirePermission<S> {
    inner: S,
    evaluator: PermissionEvaluator,
    requirement: Arc<(String, String)>,
}

impl<S> Service<Request<Body>> for RequirePermission<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let decision = self.authorize(&req);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match decision {
                Ok(()) => inner.call(req).await,
                Err(e) => Ok(e.into_response()),
            }
        })
    }
}

impl<S> RequirePermission<S> {
    fn authorize<B>(&self, req: &Request<B>) -> Result<(), ApiError> {
        let (resource, action) = (self.requirement.0.as_str(), self.requirement.1.as_str());

        let Some(ctx) = req.extensions().get::<AuthContext>() else {
            tracing::warn!(resource, action, "No auth context found, denying access");
            return Err(ApiError::unauthorized("Authentication required"));
        };

        if self.evaluator.has_permission(ctx.role.as_str(), resource, action) {
            return Ok(());
        }

        tracing::warn!(
            email = %ctx.email,
            role = %ctx.role,
            resource,
            action,
            "Permission denied"
        );
        Err(ApiError::permission_denied(ctx.role.as_str(), resource, action))
    }
}

// =============================================================================
// Tests
// =============================================================================
