// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # modreg-config
//!
//! Loads a device and its register declarations from YAML, TOML or JSON.
//!
//! ## Features
//!
//! - **Multi-Format Support**: `.yaml`/`.yml`, `.toml`, `.json`
//! - **Placeholders**: `${VAR}` and `${VAR:default}` resolved before parsing
//! - **Environment Overrides**: `MODREG_HOST`, `MODREG_PORT`, `MODREG_UNIT_ID`,
//!   `MODREG_CONNECT_RETRIES`
//! - **Validation**: device settings, register declarations, unique names
//!
//! ## Quick Start
//!
//! ```no_run
//! use modreg_config::load_config;
//!
//! let config = load_config("modreg.yaml").unwrap();
//! println!("Device: {}", config.device);
//! for register in &config.registers {
//!     println!("  {} @ {}", register.name, register.address);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader};
pub use schema::ModregConfig;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
