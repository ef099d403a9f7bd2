// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use warden_config::{ConfigLoader, WardenConfig};

use crate::cli::{Cli, LogFormat, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::logging::init_logging;

/// Loads and validates the configuration, then prints a summary.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    init_logging(
        cli.log_level.as_deref().unwrap_or("warn"),
        cli.log_format.unwrap_or(LogFormat::Text),
    );

    let source = cli
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(built-in defaults)".to_string());

    let config = match &cli.config {
        Some(path) => ConfigLoader::new().load_unvalidated(path)?,
        None => WardenConfig::default(),
    };
    config.validate().map_err(|e| {
        BinError::config(format!("Configuration validation failed: {}", e))
    })?;

    let warnings = config.warnings();
    println!("{}", render(&config, &source, &warnings, &args)?);

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

fn render(
    config: &WardenConfig,
    source: &str,
    warnings: &[String],
    args: &ValidateArgs,
) -> BinResult<String> {
    match args.format {
        OutputFormat::Text => {
            let mut lines = vec![
                format!("✓ Configuration is valid: {}", source),
                String::new(),
                "Summary:".to_string(),
                format!("  Roles:        {}", config.roles.definitions.len()),
                format!("  Top role:     {}", config.roles.top_role),
                format!("  Default role: {}", config.roles.default_role),
                format!("  Mappings:     {}", config.mappings.len()),
                format!(
                    "  Routes:       {} rules, {} hierarchy rules",
                    config.routes.rules.len(),
                    config.routes.hierarchy.len()
                ),
                format!("  Audit:        {:?}", config.audit.backend),
                format!("  API:          {}:{}", config.api.host, config.api.port),
            ];

            if !warnings.is_empty() {
                lines.push(String::new());
                lines.push("Warnings:".to_string());
                lines.extend(warnings.iter().map(|w| format!("  ⚠ {}", w)));
            }

            if args.show_config {
                lines.push(String::new());
                lines.push("Parsed configuration:".to_string());
                lines.push(
                    serde_json::to_string_pretty(config)
                        .map_err(|e| BinError::runtime(e.to_string()))?,
                );
            }
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "source": source,
                "summary": {
                    "role_count": config.roles.definitions.len(),
                    "top_role": config.roles.top_role,
                    "default_role": config.roles.default_role,
                    "mapping_count": config.mappings.len(),
                    "route_rule_count": config.routes.rules.len(),
                    "hierarchy_rule_count": config.routes.hierarchy.len(),
                    "audit_backend": config.audit.backend,
                    "api_host": config.api.host,
                    "api_port": config.api.port,
                },
                "warnings": warnings,
                "config": if args.show_config { Some(config) } else { None },
            });
            serde_json::to_string_pretty(&output).map_err(|e| BinError::runtime(e.to_string()))
        }
    }
}
