// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-bin
//!
//! The `warden` command line: runs the HTTP access guard and offers
//! offline tools over the same configuration.
//!
//! ## Usage
//!
//! ```bash
//! # Run the access guard (default command)
//! warden -c /etc/warden/warden.yaml
//!
//! # Would a developer be allowed to create tasks?
//! warden check DEVELOPER tasks create
//!
//! # Which role does this email get, and from where?
//! warden resolve sarah.johnson@demo.com
//!
//! # Role table and configuration checks
//! warden roles --grants
//! warden validate --strict
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
