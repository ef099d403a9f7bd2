// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use warden_core::{IdentityService, PermissionEvaluator, RoleRegistry};

use crate::auth::ClaimsDecoder;
use crate::config::ApiConfig;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Identity resolution and role administration.
    pub identity: IdentityService,
    /// Permission evaluator over the identity service's registry.
    pub evaluator: PermissionEvaluator,
    /// Bearer token decoder.
    pub decoder: Arc<ClaimsDecoder>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder(identity: IdentityService) -> AppStateBuilder {
        AppStateBuilder::new(identity)
    }

    /// Returns the identity service.
    pub fn identity(&self) -> &IdentityService {
        &self.identity
    }

    /// Returns the role registry.
    pub fn registry(&self) -> &Arc<RoleRegistry> {
        self.identity.registry()
    }

    /// Returns the permission evaluator.
    pub fn evaluator(&self) -> &PermissionEvaluator {
        &self.evaluator
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing [`AppState`].
pub struct AppStateBuilder {
    identity: IdentityService,
    config: Option<ApiConfig>,
    decoder: Option<Arc<ClaimsDecoder>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new(identity: IdentityService) -> Self {
        Self {
            identity,
            config: None,
            decoder: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token decoder. Defaults to one built from the configuration.
    pub fn decoder(mut self, decoder: Arc<ClaimsDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Builds the AppState.
    pub fn build(self) -> AppState {
        let config = self.config.unwrap_or_default();
        let decoder = self
            .decoder
            .unwrap_or_else(|| Arc::new(ClaimsDecoder::from_config(&config.token)));
        let evaluator = PermissionEvaluator::new(self.identity.registry().clone());

        AppState {
            config: Arc::new(config),
            identity: self.identity,
            evaluator,
            decoder,
        }
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for IdentityService {
    fn from_ref(state: &AppState) -> Self {
        state.identity.clone()
    }
}

impl axum::extract::FromRef<AppState> for PermissionEvaluator {
    fn from_ref(state: &AppState) -> Self {
        state.evaluator.clone()
    }
}
