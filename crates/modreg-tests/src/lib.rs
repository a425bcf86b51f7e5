// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # modreg Integration Tests
//!
//! Integration tests for the modreg workspace, plus the shared fixtures and
//! harness they are built on.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p modreg-tests
//!
//! # Run specific test suite
//! cargo test -p modreg-tests --test integration_device
//! cargo test -p modreg-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! ### Device Tests (`integration_device.rs`)
//! - Connection lifecycle and bounded retry timing
//! - Probe-validated registration and rollback
//! - Value pipeline: scaling, casting, rounding, overflow
//! - Device-wide reads
//!
//! ### Config Tests (`integration_config.rs`)
//! - Parsing YAML, TOML and JSON files
//! - Placeholders and environment overrides
//! - Validation rules
//! - Building a device from a loaded configuration

pub mod common;
