// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `roles` command.

use warden_api::response::RoleSummary;
use warden_core::RoleRegistry;
use warden_config::WardenConfig;

use crate::cli::{OutputFormat, RolesArgs};
use crate::error::{BinError, BinResult};

/// Prints the role table, highest rank first.
pub fn roles(config: &WardenConfig, args: RolesArgs) -> BinResult<()> {
    let registry = config.build_registry()?;
    println!("{}", render(&registry, &args)?);
    Ok(())
}

fn render(registry: &RoleRegistry, args: &RolesArgs) -> BinResult<String> {
    let roles = registry.roles_by_rank();

    match args.format {
        OutputFormat::Json => {
            let summaries: Vec<RoleSummary> = roles
                .iter()
                .map(|role| RoleSummary::new(role, registry))
                .collect();
            serde_json::to_string_pretty(&summaries).map_err(|e| BinError::runtime(e.to_string()))
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for role in roles {
                let mut marks = Vec::new();
                if registry.is_top_role(role.key.as_str()) {
                    marks.push("top");
                }
                if registry.default_role() == &role.key {
                    marks.push("default");
                }
                let marks = if marks.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", marks.join(", "))
                };

                out.push_str(&format!(
                    "{:>4}  {:<12} {}{}\n",
                    role.hierarchy,
                    role.key.as_str(),
                    role.display_name,
                    marks
                ));

                if args.grants {
                    for grant in &role.permissions {
                        out.push_str(&format!(
                            "        {}: {}\n",
                            grant.resource,
                            grant.actions.join(", ")
                        ));
                    }
                }
            }
            Ok(out.trim_end().to_string())
        }
    }
}
