// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `read`: Read one register
//! - `read-all`: Read every configured register
//! - `write`: Write an application value to a register
//! - `validate`: Validate the configuration file
//! - `version`: Show version information

mod read;
mod read_all;
mod validate;
mod version;
mod write;

pub use read::{read, read_one};
pub use read_all::{read_all, render_readings};
pub use validate::{render_validation, validate};
pub use version::version;
pub use write::{parse_value, write, write_one};

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.command.clone() {
        Commands::Read(args) => read::read(&cli, args).await,
        Commands::ReadAll(args) => read_all::read_all(&cli, args).await,
        Commands::Write(args) => write::write(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
    }
}
