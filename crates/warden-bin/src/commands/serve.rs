// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `serve` command.

use std::sync::Arc;

use tracing::info;
use warden_api::{ApiConfig, ApiServer, AppState, ClaimsDecoder, CorsConfig, TokenConfig};
use warden_config::WardenConfig;

use crate::cli::ServeArgs;
use crate::error::{BinError, BinResult};
use crate::shutdown::shutdown_signal;

/// Runs the HTTP access guard until a shutdown signal arrives.
pub async fn serve(config: WardenConfig, args: ServeArgs) -> BinResult<()> {
    let mut api = api_config(&config)?;
    if let Some(host) = args.host {
        api = api.with_host(host);
    }
    if let Some(port) = args.port {
        api = api.with_port(port);
    }

    let registry = config.build_registry()?;
    let identity = config.build_identity_service(registry.clone())?;
    let decoder = Arc::new(ClaimsDecoder::from_config(&api.token));

    info!(
        roles = registry.len(),
        mappings = config.mappings.len(),
        verifies_signature = decoder.verifies_signature(),
        "Starting warden"
    );

    let state = AppState::builder(identity)
        .config(api)
        .decoder(decoder)
        .build();

    ApiServer::new(state)
        .run_with_shutdown(shutdown_signal())
        .await
        .map_err(|e| BinError::from(e).with_context("API server failed"))
}

/// Maps the `api` section onto the server configuration.
pub fn api_config(config: &WardenConfig) -> BinResult<ApiConfig> {
    let settings = &config.api;
    let host = settings.host_addr()?;

    Ok(ApiConfig {
        host,
        port: settings.port,
        public_paths: settings.public_paths.clone(),
        cors: CorsConfig {
            allowed_origins: settings.allowed_origins.clone(),
            ..CorsConfig::default()
        },
        token: TokenConfig {
            secret: settings.token_secret.clone(),
            issuer: settings.token_issuer.clone(),
            ..TokenConfig::default()
        },
    })
}
