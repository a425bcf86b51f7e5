// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema: one device and its register declarations.
//!
//! ```yaml
//! device:
//!   host: 192.168.178.107
//!   port: 502
//!   unit_id: 1
//!   connect_retries: 10
//!   retry_backoff: 2s
//! registers:
//!   - name: grid_voltage
//!     address: 66
//!     factor: 0.1
//!     type: float
//!     unit: V
//! ```

use std::collections::HashSet;

use modreg_modbus::{DeviceConfig, RegisterSpec};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModregConfig {
    /// Connection settings.
    pub device: DeviceConfig,

    /// Registers to declare, in order.
    #[serde(default)]
    pub registers: Vec<RegisterSpec>,
}

impl ModregConfig {
    /// Creates a configuration without registers.
    pub fn new(device: DeviceConfig) -> Self {
        Self {
            device,
            registers: Vec::new(),
        }
    }

    /// Appends a register declaration.
    pub fn with_register(mut self, spec: RegisterSpec) -> Self {
        self.registers.push(spec);
        self
    }

    /// Looks up a register declaration by name.
    pub fn register(&self, name: &str) -> Option<&RegisterSpec> {
        self.registers.iter().find(|r| r.name == name)
    }

    /// Validates the device, every register and name uniqueness.
    pub fn validate(&self) -> ConfigResult<()> {
        self.device
            .validate()
            .map_err(|source| ConfigError::Device { source })?;

        let mut seen = HashSet::with_capacity(self.registers.len());
        for spec in &self.registers {
            spec.validate().map_err(|source| ConfigError::Register {
                name: spec.name.clone(),
                source,
            })?;

            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateRegister {
                    name: spec.name.clone(),
                });
            }
        }

        Ok(())
    }
}
