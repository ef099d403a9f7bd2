// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer authentication middleware.
//!
//! Decodes the bearer credential, extracts the email, and resolves the
//! principal through the [`IdentityService`] so the role attached to the
//! request is always the persisted one.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use warden_core::{IdentityService, ProfileData};

use crate::auth::{AuthContext, ClaimsDecoder};
use crate::error::ApiError;

/// Paths left open by [`AuthLayer::with_default_public_paths`].
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &["/health"];

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer that authenticates every non-public request.
#[derive(Clone)]
pub struct AuthLayer {
    decoder: Arc<ClaimsDecoder>,
    identity: IdentityService,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(decoder: Arc<ClaimsDecoder>, identity: IdentityService) -> Self {
        Self {
            decoder,
            identity,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Adds public paths that don't require authentication.
    ///
    /// A trailing `*` turns the entry into a prefix match.
    pub fn with_public_paths(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Creates with [`DEFAULT_PUBLIC_PATHS`].
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()))
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            decoder: self.decoder.clone(),
            identity: self.identity.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware produced by [`AuthLayer`].
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    decoder: Arc<ClaimsDecoder>,
    identity: IdentityService,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        self.public_paths.iter().any(|public| {
            public
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let decoder = self.decoder.clone();
        let identity = self.identity.clone();
        let is_public = self.is_public_path(req.uri().path());
        let token = extract_bearer_token(&req);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if is_public {
                return inner.call(req).await;
            }

            match authenticate(&decoder, &identity, token).await {
                Ok(ctx) => {
                    tracing::debug!(
                        email = %ctx.email,
                        role = %ctx.role,
                        request_id = %ctx.request_id,
                        "Request authenticated"
                    );
                    req.extensions_mut().insert(ctx);
                    inner.call(req).await
                }
                Err(e) => Ok(e.into_response()),
            }
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

async fn authenticate(
    decoder: &ClaimsDecoder,
    identity: &IdentityService,
    token: Option<String>,
) -> Result<AuthContext, ApiError> {
    let token = token.ok_or_else(|| {
        tracing::debug!("No authorization token provided");
        ApiError::unauthorized("No authorization token provided")
    })?;

    let claims = decoder.decode(&token).inspect_err(|e| {
        tracing::debug!(error = %e, "Token decoding failed");
    })?;

    let email = claims
        .email()
        .ok_or_else(|| ApiError::unauthorized("Token carries no email claim"))?;

    let profile = ProfileData {
        name: claims.display_name().map(str::to_string),
        image: claims.picture.clone(),
    };
    let record = identity
        .get_or_create_principal_record(&email, &profile)
        .await?;

    Ok(AuthContext::from_record(&record, identity.registry()))
}

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Tests
// =============================================================================
