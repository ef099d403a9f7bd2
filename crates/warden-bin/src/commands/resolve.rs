// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `resolve` command.

use warden_core::{Email, Resolution};
use warden_config::WardenConfig;

use crate::cli::{OutputFormat, ResolveArgs};
use crate::error::{BinError, BinResult};

/// Resolves an email through the configured resolver chain.
pub async fn resolve(config: &WardenConfig, args: ResolveArgs) -> BinResult<()> {
    let email = Email::parse(&args.email).map_err(|e| BinError::input(e.to_string()))?;

    let registry = config.build_registry()?;
    let identity = config.build_identity_service(registry.clone())?;
    let resolution = identity.resolve_role(&email).await;

    println!("{}", render(&email, &resolution, registry.display_name(resolution.role.as_str()), args.format)?);
    Ok(())
}

fn render(
    email: &Email,
    resolution: &Resolution,
    display_name: &str,
    format: OutputFormat,
) -> BinResult<String> {
    match format {
        OutputFormat::Text => Ok(format!(
            "{} -> {} ({}) via {}",
            email, resolution.role, display_name, resolution.tier
        )),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "email": email,
                "role": resolution.role,
                "display_name": display_name,
                "tier": resolution.tier,
            });
            serde_json::to_string_pretty(&output).map_err(|e| BinError::runtime(e.to_string()))
        }
    }
}
