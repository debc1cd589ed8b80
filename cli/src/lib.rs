// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line front end of davsync.

mod cli;
mod cmd_contact;
mod cmd_sync;
mod config;
mod contact_formatter;

pub use crate::cli::{Cli, Commands, run};
pub use crate::cmd_contact::{CmdAdd, CmdDelete, CmdList};
pub use crate::cmd_sync::CmdSync;
pub use crate::config::parse_config;
