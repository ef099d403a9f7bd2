// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-config
//!
//! Configuration for warden: role table, static mappings, route guard
//! table, session timings, audit backend, HTTP settings and logging.
//!
//! ## Quick Start
//!
//! ```no_run
//! use warden_config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load("warden.yaml").unwrap();
//! let registry = config.build_registry().unwrap();
//! let identity = config.build_identity_service(registry.clone()).unwrap();
//! let guard = config.build_route_guard(registry);
//! ```
//!
//! An empty file is a valid configuration; every section has defaults.
//!
//! ```
//! use warden_config::{ConfigFormat, ConfigLoader};
//!
//! let config = ConfigLoader::new()
//!     .with_env_vars(false)
//!     .load_from_str("", ConfigFormat::Yaml)
//!     .unwrap();
//! assert_eq!(config.roles.default_role, "VIEWER");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader, ConfigLoaderBuilder, DEFAULT_ENV_PREFIX};
pub use schema::{
    default_route_rules, ApiSettings, AuditBackend, AuditConfig, IdentityConfig, LogFormat,
    LogLevel, LoggingConfig, RolesConfig, RoutesConfig, SessionStoreConfig, StaticMapping,
    WardenConfig,
};
