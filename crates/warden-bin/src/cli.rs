// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `serve`: Run the HTTP access guard (default)
//! - `check`: Evaluate one `(role, resource, action)` triple
//! - `resolve`: Resolve the role of an email
//! - `roles`: Print the role table
//! - `validate`: Validate the configuration file
//! - `version`: Show version information

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use warden_config::{LogLevel, LoggingConfig};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// warden - role-based access control and session guard
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    author = "Sylvex <contact@sylvex.io>",
    version = warden_core::VERSION,
    about = "Role-based access control and session guard",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path; built-in defaults when omitted
    #[arg(short, long, env = "WARDEN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP access guard
    ///
    /// This is the default command when no subcommand is specified.
    Serve(ServeArgs),

    /// Check whether a role may perform an action on a resource
    ///
    /// Prints `allow` or `deny`. A denial exits non-zero.
    Check(CheckArgs),

    /// Resolve the role of an email and report which tier produced it
    Resolve(ResolveArgs),

    /// Print the role table ordered by rank
    Roles(RolesArgs),

    /// Validate the configuration file
    Validate(ValidateArgs),

    /// Show version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `serve` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Bind address; overrides `api.host`
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Bind port; overrides `api.port`
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Role key
    pub role: String,

    /// Resource name
    pub resource: String,

    /// Action name
    pub action: String,
}

/// Arguments for the `resolve` command.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Email address
    pub email: String,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `roles` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RolesArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Also list every grant
    #[arg(long)]
    pub grants: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<warden_config::LogFormat> for LogFormat {
    fn from(format: warden_config::LogFormat) -> Self {
        match format {
            warden_config::LogFormat::Text => LogFormat::Text,
            warden_config::LogFormat::Json => LogFormat::Json,
            warden_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Serve` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Serve(ServeArgs::default()))
    }

    /// Get the effective log level: `--quiet`, then `--log-level`, then the config.
    pub fn effective_log_level(&self, logging: &LoggingConfig) -> String {
        if self.quiet {
            return LogLevel::Warn.as_str().to_string();
        }
        self.log_level
            .clone()
            .unwrap_or_else(|| logging.level.as_str().to_string())
    }

    /// Get the effective log format: `--log-format`, then the config.
    pub fn effective_log_format(&self, logging: &LoggingConfig) -> LogFormat {
        self.log_format.unwrap_or_else(|| logging.format.into())
    }
}

// =============================================================================
// Tests
// =============================================================================
