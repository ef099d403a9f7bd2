// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden Integration Tests
//!
//! Cross-crate integration tests for warden, with the shared fixtures and
//! mocks they use.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Emails, principals, configurations and bearer tokens
//!   - `mocks`: Scripted token refresher, override store and audit logger
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p warden-tests
//! cargo test -p warden-tests --test integration_permissions
//! cargo test -p warden-tests --test integration_identity
//! cargo test -p warden-tests --test integration_session
//! cargo test -p warden-tests --test integration_api
//! cargo test -p warden-tests --test integration_config
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, temp_test_dir};
}
