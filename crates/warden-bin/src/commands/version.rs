// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::error::BinResult;

/// Displays version information.
pub fn version() -> BinResult<()> {
    println!("warden - role-based access control and session guard");
    println!();
    println!("Version Information:");
    println!("  warden-bin:    {}", env!("CARGO_PKG_VERSION"));
    println!("  warden-core:   {}", warden_core::VERSION);
    println!("  warden-api:    {}", warden_api::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:        {}", std::env::consts::ARCH);
    println!("  OS:            {}", std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
