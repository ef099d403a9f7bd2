// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! warden - role-based access control and session guard.

use warden_bin::error::report_error_and_exit;
use warden_bin::{commands, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(error) = commands::execute(cli).await {
        report_error_and_exit(error);
    }
}
