// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # modreg-bin
//!
//! The `modreg` command-line tool.
//!
//! - CLI argument parsing with clap
//! - Logging initialization
//! - Device session setup from a configuration file
//! - Command implementations (read, read-all, write, validate, version)
//!
//! ## Usage
//!
//! ```bash
//! # Read one register
//! modreg read grid_voltage
//!
//! # Read every register as JSON
//! modreg -c /etc/modreg/inverter.yaml read-all --format json
//!
//! # Write a setpoint
//! modreg write power_limit 12.5
//!
//! # Check a configuration file without connecting
//! modreg validate --show-config
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{report_error_and_exit, BinError, BinResult};
pub use logging::init_logging;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
