// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication module.
//!
//! This module provides:
//! - Bearer token claim decoding
//! - Ordered email claim extraction
//! - The per-request authentication context

mod claims;
mod context;
mod decoder;

pub use claims::{EmailClaim, TokenClaims, DEFAULT_EMAIL_CLAIMS};
pub use context::AuthContext;
pub use decoder::{ClaimsDecoder, TokenConfig};
