// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built device configurations and register declarations modelled on a
//! small grid inverter.

use std::io::Write;
use std::time::Duration;

use modreg_modbus::{DeviceConfig, RegisterSpec, ValueType};
use tempfile::NamedTempFile;

// =============================================================================
// Device Fixtures
// =============================================================================

/// Fixture providing device configurations.
pub struct DeviceFixtures;

impl DeviceFixtures {
    /// Host used by every fixture.
    pub const HOST: &'static str = "192.168.178.107";

    /// Default settings: 10 attempts, 2s fixed backoff.
    pub fn inverter() -> DeviceConfig {
        DeviceConfig::builder()
            .host(Self::HOST)
            .build()
            .expect("fixture device config is valid")
    }

    /// Fixed backoff with a custom attempt bound.
    pub fn with_retries(retries: u32, backoff: Duration) -> DeviceConfig {
        DeviceConfig::builder()
            .host(Self::HOST)
            .connect_retries(retries)
            .retry_backoff(backoff)
            .build()
            .expect("fixture device config is valid")
    }
}

// =============================================================================
// Register Fixtures
// =============================================================================

/// Fixture providing register declarations.
pub struct RegisterFixtures;

impl RegisterFixtures {
    /// Unsigned 16-bit status word at address 0.
    pub fn status() -> RegisterSpec {
        RegisterSpec::new("status", 0)
    }

    /// Grid voltage in 0.1 V steps at address 66.
    pub fn grid_voltage() -> RegisterSpec {
        RegisterSpec::builder("grid_voltage", 66)
            .factor(0.1)
            .value_type(ValueType::Float)
            .unit("V")
            .build()
            .expect("fixture register is valid")
    }

    /// Signed 32-bit battery power in watts at address 100.
    pub fn battery_power() -> RegisterSpec {
        RegisterSpec::builder("battery_power", 100)
            .length(2)
            .signed(true)
            .unit("W")
            .build()
            .expect("fixture register is valid")
    }

    /// Relay state flag at address 200.
    pub fn relay() -> RegisterSpec {
        RegisterSpec::builder("relay", 200)
            .value_type(ValueType::Bool)
            .build()
            .expect("fixture register is valid")
    }

    /// Export limit setpoint in 0.1 kW steps at address 300.
    pub fn export_limit() -> RegisterSpec {
        RegisterSpec::builder("export_limit", 300)
            .factor(0.1)
            .value_type(ValueType::Float)
            .unit("kW")
            .build()
            .expect("fixture register is valid")
    }
}

// =============================================================================
// Config File Fixtures
// =============================================================================

/// Fixture providing configuration file contents.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// A complete YAML configuration.
    pub const YAML: &'static str = r#"
device:
  host: 192.168.178.107
  port: 502
  unit_id: 3
  connect_retries: 5
  retry_backoff: 500ms
registers:
  - name: grid_voltage
    address: 66
    factor: 0.1
    type: float
    unit: V
  - name: battery_power
    address: 100
    length: 2
    signed: true
    unit: W
  - name: relay
    address: 200
    type: bool
"#;

    /// The same configuration as TOML.
    pub const TOML: &'static str = r#"
[device]
host = "192.168.178.107"
port = 502
unit_id = 3
connect_retries = 5
retry_backoff = "500ms"

[[registers]]
name = "grid_voltage"
address = 66
factor = 0.1
type = "float"
unit = "V"

[[registers]]
name = "battery_power"
address = 100
length = 2
signed = true
unit = "W"

[[registers]]
name = "relay"
address = 200
type = "bool"
"#;

    /// The same configuration as JSON.
    pub const JSON: &'static str = r#"{
  "device": {
    "host": "192.168.178.107",
    "port": 502,
    "unit_id": 3,
    "connect_retries": 5,
    "retry_backoff": "500ms"
  },
  "registers": [
    { "name": "grid_voltage", "address": 66, "factor": 0.1, "type": "float", "unit": "V" },
    { "name": "battery_power", "address": 100, "length": 2, "signed": true, "unit": "W" },
    { "name": "relay", "address": 200, "type": "bool" }
  ]
}"#;

    /// Writes `content` to a temporary file with the given extension.
    pub fn write_temp(content: &str, extension: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("modreg-")
            .suffix(&format!(".{extension}"))
            .tempfile()
            .expect("Failed to create temp config file");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp config file");
        file
    }
}
