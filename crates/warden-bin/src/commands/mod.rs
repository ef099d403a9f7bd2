// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `serve`: Run the HTTP access guard
//! - `check`: Evaluate a permission
//! - `resolve`: Resolve an email's role
//! - `roles`: Print the role table
//! - `validate`: Validate configuration file
//! - `version`: Show version information

mod check;
mod resolve;
mod roles;
mod serve;
mod validate;
mod version;

pub use check::check;
pub use resolve::resolve;
pub use roles::roles;
pub use serve::{api_config, serve};
pub use validate::validate;
pub use version::version;

use warden_config::{ConfigLoader, WardenConfig};

use crate::cli::{Cli, Commands};
use crate::error::BinResult;
use crate::logging::init_logging;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Serve(args) => {
            let config = prepare(&cli)?;
            serve::serve(config, args).await
        }
        Commands::Check(args) => {
            let config = prepare(&cli)?;
            check::check(&config, args)
        }
        Commands::Resolve(args) => {
            let config = prepare(&cli)?;
            resolve::resolve(&config, args).await
        }
        Commands::Roles(args) => {
            let config = prepare(&cli)?;
            roles::roles(&config, args)
        }
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(),
    }
}

/// Loads the configuration and installs logging from it.
fn prepare(cli: &Cli) -> BinResult<WardenConfig> {
    let config = ConfigLoader::new().load_or_default(cli.config.as_deref())?;
    init_logging(
        &cli.effective_log_level(&config.logging),
        cli.effective_log_format(&config.logging),
    );
    Ok(config)
}
