// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `check` command.

use tracing::debug;
use warden_core::PermissionEvaluator;
use warden_config::WardenConfig;

use crate::cli::CheckArgs;
use crate::error::{BinError, BinResult};

/// Prints `allow` or `deny` for one `(role, resource, action)` triple.
///
/// A denial is returned as [`BinError::Denied`] so scripts can branch on
/// the exit status.
pub fn check(config: &WardenConfig, args: CheckArgs) -> BinResult<()> {
    let registry = config.build_registry()?;
    let known = registry.contains(&args.role);
    let evaluator = PermissionEvaluator::new(registry);

    let allowed = evaluator.has_permission(&args.role, &args.resource, &args.action);
    debug!(role = %args.role, resource = %args.resource, action = %args.action, allowed, "Permission check");

    if allowed {
        println!("allow");
        return Ok(());
    }

    println!("deny");
    let reason = if known {
        format!("Role {} may not {} {}", args.role, args.action, args.resource)
    } else {
        format!("Unknown role '{}'", args.role)
    };
    Err(BinError::denied(reason))
}
