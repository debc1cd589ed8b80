// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! davsync - two-way contact synchronization with `CardDAV` address books

use std::process::ExitCode;

use davsync_cli::run;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}
